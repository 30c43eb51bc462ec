use std::sync::Arc;

use super::{GradingEngine, GradingPolicy};
use crate::errors::{ErrorKind, ExamSystemError};
use crate::models::grading::{
    entities::{AnswerBlock, AssignmentStatus, ComparisonStatus, GradingAssignment, Priority},
    requests::{
        AssignmentListQuery, AutoAssignRequest, CreateAssignmentRequest, CreateBlockRequest,
        SubmitResultRequest, UpdateResultRequest,
    },
};
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

const MATH: i64 = 1;
const HISTORY: i64 = 2;

async fn engine() -> GradingEngine {
    let storage = SeaOrmStorage::in_memory()
        .await
        .expect("in-memory storage should start");
    GradingEngine::new(Arc::new(storage), GradingPolicy::default())
}

async fn add_user(engine: &GradingEngine, username: &str, role: UserRole) -> User {
    engine
        .storage()
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password: "not-a-real-hash".to_string(),
            role,
            display_name: None,
        })
        .await
        .unwrap()
}

async fn add_examiner(engine: &GradingEngine, username: &str, subjects: &[i64]) -> User {
    let user = add_user(engine, username, UserRole::Examiner).await;
    for subject in subjects {
        engine
            .storage()
            .add_examiner_subject(user.id, *subject)
            .await
            .unwrap();
    }
    user
}

async fn add_block(engine: &GradingEngine, code: &str, subject_id: i64) -> AnswerBlock {
    engine
        .storage()
        .create_block(CreateBlockRequest {
            block_code: code.to_string(),
            subject_id,
            exam_id: 2026,
            question_number: 1,
            max_score: 10.0,
        })
        .await
        .unwrap()
}

async fn assign(
    engine: &GradingEngine,
    code: &str,
    examiner: &User,
    round: i32,
) -> Result<GradingAssignment, ExamSystemError> {
    engine
        .create_assignment(CreateAssignmentRequest {
            block_code: code.to_string(),
            examiner_id: examiner.id,
            round_number: round,
            priority: None,
        })
        .await
}

async fn submit(
    engine: &GradingEngine,
    assignment: &GradingAssignment,
    score: f64,
) -> Result<crate::models::grading::entities::GradingResult, ExamSystemError> {
    engine
        .submit_result(
            assignment.examiner_id,
            SubmitResultRequest {
                assignment_id: assignment.id,
                score,
                comments: None,
                criteria_scores: None,
            },
        )
        .await
}

/// 两名阅卷员完成第一、二轮
async fn graded_block(
    engine: &GradingEngine,
    code: &str,
    examiners: (&User, &User),
    scores: (f64, f64),
) {
    add_block(engine, code, MATH).await;
    let a1 = assign(engine, code, examiners.0, 1).await.unwrap();
    let a2 = assign(engine, code, examiners.1, 2).await.unwrap();
    submit(engine, &a1, scores.0).await.unwrap();
    submit(engine, &a2, scores.1).await.unwrap();
}

#[tokio::test]
async fn test_matched_block_is_approved_with_computed_score() {
    let engine = engine().await;
    let admin = add_user(&engine, "admin01", UserRole::Admin).await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    graded_block(&engine, "B1", (&e1, &e2), (8.0, 8.5)).await;

    let view = engine.comparison("B1").await.unwrap();
    assert_eq!(view.status, ComparisonStatus::Matched);
    assert_eq!(view.score_difference, Some(0.5));
    assert_eq!(view.final_score, Some(8.25));
    assert!(!view.approved);
    assert_eq!(view.results.len(), 2);
    assert_eq!(view.results[0].examiner_name.as_deref(), Some("examiner1"));

    let approval = engine.approve_score("B1", admin.id, None).await.unwrap();
    assert_eq!(approval.final_score, 8.25);
    assert_eq!(approval.resolution, ComparisonStatus::Matched);
    assert!(!approval.overridden);

    let results = engine.block_results("B1").await.unwrap();
    assert!(results.items.iter().all(|r| r.is_final));

    let view = engine.comparison("B1").await.unwrap();
    assert!(view.approved);
    assert_eq!(view.approved_score, Some(8.25));

    let err = engine.approve_score("B1", admin.id, None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::AlreadyApproved(_)));
}

#[tokio::test]
async fn test_third_round_escalation_and_resolution() {
    let engine = engine().await;
    let admin = add_user(&engine, "admin01", UserRole::Admin).await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    let e3 = add_examiner(&engine, "examiner3", &[MATH]).await;
    let e4 = add_examiner(&engine, "examiner4", &[MATH]).await;
    graded_block(&engine, "B1", (&e1, &e2), (8.0, 6.0)).await;

    // e3 已有一条未完成任务，应选择负载更低的 e4
    add_block(&engine, "B9", MATH).await;
    assign(&engine, "B9", &e3, 1).await.unwrap();

    let (_, _, outcome) = engine.outcome("B1").await.unwrap();
    assert_eq!(outcome.status, ComparisonStatus::NeedsThirdRound);
    assert_eq!(outcome.score_difference, Some(2.0));

    let err = engine.approve_score("B1", admin.id, None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotResolvable(_)));

    let third = engine.assign_third_round("B1", None).await.unwrap();
    assert_eq!(third.round_number, 3);
    assert_eq!(third.examiner_id, e4.id);
    assert_eq!(third.priority, Priority::High);

    let err = engine.assign_third_round("B1", None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::ThirdRoundAlreadyAssigned(_)));

    submit(&engine, &third, 7.8).await.unwrap();
    let (_, _, outcome) = engine.outcome("B1").await.unwrap();
    assert_eq!(outcome.status, ComparisonStatus::ResolvedByThird);
    assert_eq!(outcome.final_score, Some(7.9));

    let err = engine.assign_third_round("B1", None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotEligible(_)));

    let approval = engine.approve_score("B1", admin.id, None).await.unwrap();
    assert_eq!(approval.final_score, 7.9);
    assert_eq!(approval.resolution, ComparisonStatus::ResolvedByThird);
}

#[tokio::test]
async fn test_third_round_requires_needs_third_round() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_examiner(&engine, "examiner3", &[MATH]).await;

    add_block(&engine, "PENDING1", MATH).await;
    let err = engine.assign_third_round("PENDING1", None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotEligible(_)));
    assert_eq!(err.kind(), ErrorKind::State);

    graded_block(&engine, "MATCHED1", (&e1, &e2), (5.0, 5.5)).await;
    let err = engine.assign_third_round("MATCHED1", None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotEligible(_)));

    let err = engine.assign_third_round("MISSING", None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotFound(_)));
}

#[tokio::test]
async fn test_third_round_without_spare_examiner() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    // 不具备该科目资格
    add_examiner(&engine, "examiner3", &[HISTORY]).await;
    graded_block(&engine, "B1", (&e1, &e2), (9.0, 4.0)).await;

    let err = engine.assign_third_round("B1", None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NoEligibleExaminer(_)));
    assert!(
        engine
            .storage()
            .list_block_assignments("B1")
            .await
            .unwrap()
            .iter()
            .all(|a| a.round_number < 3)
    );
}

#[tokio::test]
async fn test_score_range_is_enforced() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();
    let a2 = assign(&engine, "B1", &e2, 2).await.unwrap();

    let err = submit(&engine, &a1, 10.01).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::OutOfRange(_)));
    let err = submit(&engine, &a1, -1.0).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::OutOfRange(_)));

    // 拒绝后分配仍可正常提交
    let result = submit(&engine, &a1, 10.0).await.unwrap();
    assert_eq!(result.score, 10.0);
    assert!(!result.is_final);
    submit(&engine, &a2, 0.0).await.unwrap();
}

#[tokio::test]
async fn test_submission_rules() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();

    // 非本人的分配
    let err = engine
        .submit_result(
            e2.id,
            SubmitResultRequest {
                assignment_id: a1.id,
                score: 5.0,
                comments: None,
                criteria_scores: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    submit(&engine, &a1, 5.0).await.unwrap();
    let stored = engine.storage().get_assignment(a1.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AssignmentStatus::Completed);

    let err = submit(&engine, &a1, 6.0).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::AlreadySubmitted(_)));

    let err = engine
        .submit_result(
            e1.id,
            SubmitResultRequest {
                assignment_id: 9999,
                score: 5.0,
                comments: None,
                criteria_scores: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExamSystemError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_submissions_store_one_result() {
    let engine = Arc::new(engine().await);
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();

    let (first, second) = tokio::join!(submit(&engine, &a1, 6.0), submit(&engine, &a1, 7.0));
    assert!(first.is_ok() != second.is_ok());

    let results = engine.block_results("B1").await.unwrap();
    assert_eq!(results.items.len(), 1);
}

#[tokio::test]
async fn test_concurrent_third_round_assigns_once() {
    let engine = Arc::new(engine().await);
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_examiner(&engine, "examiner3", &[MATH]).await;
    add_examiner(&engine, "examiner4", &[MATH]).await;
    graded_block(&engine, "B1", (&e1, &e2), (8.0, 5.0)).await;

    let (first, second) = tokio::join!(
        engine.assign_third_round("B1", None),
        engine.assign_third_round("B1", None)
    );
    assert!(first.is_ok() != second.is_ok());
    let err = first.err().or(second.err()).unwrap();
    assert!(matches!(err, ExamSystemError::ThirdRoundAlreadyAssigned(_)));

    let third_rounds = engine
        .storage()
        .list_block_assignments("B1")
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.round_number == 3)
        .count();
    assert_eq!(third_rounds, 1);
}

#[tokio::test]
async fn test_create_assignment_conflicts() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    let historian = add_examiner(&engine, "examiner3", &[HISTORY]).await;
    let admin = add_user(&engine, "admin01", UserRole::Admin).await;
    add_block(&engine, "B1", MATH).await;

    assign(&engine, "B1", &e1, 1).await.unwrap();

    let err = assign(&engine, "B1", &e1, 1).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::DuplicateAssignment(_)));

    let err = assign(&engine, "B1", &e2, 1).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::RoundOccupied(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = assign(&engine, "B1", &e1, 2).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::ExaminerAlreadyAssigned(_)));

    let err = assign(&engine, "B1", &e2, 4).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::InvalidRound(_)));

    let err = assign(&engine, "B1", &e2, 3).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::InvalidRound(_)));

    let err = assign(&engine, "B1", &historian, 2).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotQualified(_)));

    let err = assign(&engine, "B1", &admin, 2).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotQualified(_)));

    let err = assign(&engine, "NOPE", &e2, 2).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotFound(_)));

    let err = assign(&engine, "bad code!", &e2, 2).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assign(&engine, "B1", &e2, 2).await.unwrap();
}

#[tokio::test]
async fn test_delete_assignment() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();
    let a2 = assign(&engine, "B1", &e2, 2).await.unwrap();

    submit(&engine, &a1, 7.0).await.unwrap();
    let err = engine.delete_assignment(a1.id).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::CannotDeleteCompleted(_)));
    assert_eq!(err.kind(), ErrorKind::State);

    engine.delete_assignment(a2.id).await.unwrap();
    assert!(engine.storage().get_assignment(a2.id).await.unwrap().is_none());

    let err = engine.delete_assignment(a2.id).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::NotFound(_)));

    // 释放的轮次可以重新分配
    assign(&engine, "B1", &e2, 2).await.unwrap();
}

#[tokio::test]
async fn test_start_assignment_transitions() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();

    let err = engine.start_assignment(a1.id, e2.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let started = engine.start_assignment(a1.id, e1.id).await.unwrap();
    assert_eq!(started.status, AssignmentStatus::InProgress);
    // 重复开始不报错
    let again = engine.start_assignment(a1.id, e1.id).await.unwrap();
    assert_eq!(again.status, AssignmentStatus::InProgress);

    submit(&engine, &a1, 4.0).await.unwrap();
    let err = engine.start_assignment(a1.id, e1.id).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_auto_assign_reports_per_block_failures() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH, HISTORY]).await;
    add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B2", MATH).await;
    // 历史科目只有一名阅卷员，无法完成两轮分配
    add_block(&engine, "B3", HISTORY).await;

    let response = engine
        .auto_assign(AutoAssignRequest {
            block_codes: vec!["B2".into(), "B3".into(), "MISSING".into()],
            examiners_per_block: Some(2),
            priority: None,
        })
        .await
        .unwrap();

    assert_eq!(response.succeeded, 1);
    assert_eq!(response.failed, 2);

    let b2 = &response.results[0];
    assert!(b2.success);
    assert_eq!(b2.assignments.len(), 2);
    let rounds: Vec<i32> = b2.assignments.iter().map(|a| a.round_number).collect();
    assert_eq!(rounds, vec![1, 2]);
    assert_ne!(b2.assignments[0].examiner_id, b2.assignments[1].examiner_id);

    let b3 = &response.results[1];
    assert!(!b3.success);
    assert_eq!(b3.error_code.as_deref(), Some("E123"));
    assert!(
        engine
            .storage()
            .list_block_assignments("B3")
            .await
            .unwrap()
            .is_empty()
    );

    assert_eq!(response.results[2].error_code.as_deref(), Some("E008"));

    // 一轮已有人时只补齐缺失轮次，且不重复使用同一阅卷员
    add_block(&engine, "B4", MATH).await;
    assign(&engine, "B4", &e1, 1).await.unwrap();
    let response = engine
        .auto_assign(AutoAssignRequest {
            block_codes: vec!["B4".into()],
            examiners_per_block: None,
            priority: Some(Priority::Low),
        })
        .await
        .unwrap();
    let b4 = &response.results[0];
    assert!(b4.success);
    assert_eq!(b4.assignments.len(), 1);
    assert_eq!(b4.assignments[0].round_number, 2);
    assert_ne!(b4.assignments[0].examiner_id, e1.id);
    assert_eq!(b4.assignments[0].priority, Priority::Low);

    // 已分配满的答题块作为失败报告
    let response = engine
        .auto_assign(AutoAssignRequest {
            block_codes: vec!["B4".into()],
            examiners_per_block: None,
            priority: None,
        })
        .await
        .unwrap();
    assert!(!response.results[0].success);
}

#[tokio::test]
async fn test_auto_assign_balances_load_within_batch() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    let e3 = add_examiner(&engine, "examiner3", &[MATH]).await;
    for code in ["B1", "B2", "B3"] {
        add_block(&engine, code, MATH).await;
    }

    let response = engine
        .auto_assign(AutoAssignRequest {
            block_codes: vec!["B1".into(), "B2".into(), "B3".into()],
            examiners_per_block: Some(1),
            priority: None,
        })
        .await
        .unwrap();

    let chosen: Vec<i64> = response
        .results
        .iter()
        .map(|r| r.assignments[0].examiner_id)
        .collect();
    assert_eq!(chosen, vec![e1.id, e2.id, e3.id]);

    let loads = engine
        .storage()
        .examiner_loads(&[e1.id, e2.id, e3.id])
        .await
        .unwrap();
    assert!(loads.values().all(|load| *load == 1));
}

#[tokio::test]
async fn test_auto_assign_validates_request() {
    let engine = engine().await;
    let err = engine
        .auto_assign(AutoAssignRequest {
            block_codes: vec!["B1".into()],
            examiners_per_block: Some(3),
            priority: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ExamSystemError::Validation(_)));

    let err = engine
        .auto_assign(AutoAssignRequest {
            block_codes: vec![],
            examiners_per_block: None,
            priority: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ExamSystemError::Validation(_)));
}

#[tokio::test]
async fn test_update_result_keeps_score_immutable() {
    let engine = engine().await;
    let admin = add_user(&engine, "admin01", UserRole::Admin).await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();
    let a2 = assign(&engine, "B1", &e2, 2).await.unwrap();
    let r1 = submit(&engine, &a1, 6.5).await.unwrap();
    submit(&engine, &a2, 6.0).await.unwrap();

    let err = engine
        .update_result(
            e1.id,
            r1.id,
            UpdateResultRequest {
                score: Some(9.0),
                comments: None,
                criteria_scores: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExamSystemError::ResultImmutable(_)));

    let err = engine
        .update_result(
            e2.id,
            r1.id,
            UpdateResultRequest {
                score: None,
                comments: Some("hijack".into()),
                criteria_scores: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let updated = engine
        .update_result(
            e1.id,
            r1.id,
            UpdateResultRequest {
                score: Some(6.5),
                comments: Some("structure is clear".into()),
                criteria_scores: Some([("argument".to_string(), 4.0)].into_iter().collect()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.score, 6.5);
    assert_eq!(updated.comments.as_deref(), Some("structure is clear"));
    assert_eq!(
        updated.criteria_scores.as_ref().and_then(|c| c.get("argument")),
        Some(&4.0)
    );

    engine.approve_score("B1", admin.id, None).await.unwrap();
    let err = engine
        .update_result(
            e1.id,
            r1.id,
            UpdateResultRequest {
                score: None,
                comments: Some("late edit".into()),
                criteria_scores: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExamSystemError::AlreadyApproved(_)));
}

#[tokio::test]
async fn test_manual_review_requires_explicit_score() {
    let engine = engine().await;
    let admin = add_user(&engine, "admin01", UserRole::Admin).await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_examiner(&engine, "examiner3", &[MATH]).await;
    graded_block(&engine, "B1", (&e1, &e2), (2.0, 9.0)).await;

    let third = engine.assign_third_round("B1", None).await.unwrap();
    submit(&engine, &third, 5.5).await.unwrap();

    let view = engine.comparison("B1").await.unwrap();
    assert_eq!(view.status, ComparisonStatus::ResolvedByThird);
    assert!(view.needs_manual_review);
    assert_eq!(view.final_score, Some(5.5));

    let err = engine.approve_score("B1", admin.id, None).await.unwrap_err();
    assert!(matches!(err, ExamSystemError::ManualReviewRequired(_)));

    let err = engine
        .approve_score("B1", admin.id, Some(10.5))
        .await
        .unwrap_err();
    assert!(matches!(err, ExamSystemError::OutOfRange(_)));

    let approval = engine
        .approve_score("B1", admin.id, Some(6.0))
        .await
        .unwrap();
    assert_eq!(approval.final_score, 6.0);
    assert!(approval.overridden);
    assert_eq!(approval.approved_by, admin.id);
}

#[tokio::test]
async fn test_overdue_assignments_remain_workable() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    let a1 = assign(&engine, "B1", &e1, 1).await.unwrap();

    // 默认 72 小时内不会逾期
    assert_eq!(engine.sweep_overdue().await.unwrap(), 0);

    let future_cutoff = chrono::Utc::now().timestamp() + 60;
    let marked = engine
        .storage()
        .mark_overdue_assignments(future_cutoff)
        .await
        .unwrap();
    assert_eq!(marked, 1);

    let overdue = engine
        .my_assignments(e1.id, Some(AssignmentStatus::Overdue))
        .await
        .unwrap();
    assert_eq!(overdue.items.len(), 1);
    assert_eq!(overdue.items[0].max_score, Some(10.0));

    let loads = engine.storage().examiner_loads(&[e1.id]).await.unwrap();
    assert_eq!(loads.get(&e1.id), Some(&1));

    let started = engine.start_assignment(a1.id, e1.id).await.unwrap();
    assert_eq!(started.status, AssignmentStatus::InProgress);
    submit(&engine, &a1, 3.0).await.unwrap();
}

#[tokio::test]
async fn test_pending_blocks_and_listing() {
    let engine = engine().await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    add_block(&engine, "B1", MATH).await;
    add_block(&engine, "B2", MATH).await;
    assign(&engine, "B1", &e1, 1).await.unwrap();
    assign(&engine, "B1", &e2, 2).await.unwrap();
    assign(&engine, "B2", &e1, 1).await.unwrap();

    let pending = engine.pending_blocks().await.unwrap();
    assert_eq!(pending.items.len(), 1);
    assert_eq!(pending.items[0].block.block_code, "B2");
    assert_eq!(pending.items[0].assigned_count, 1);

    let listing = engine
        .storage()
        .list_assignments_with_pagination(AssignmentListQuery {
            examiner_id: Some(e1.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listing.pagination.total, 2);
    assert!(
        listing
            .items
            .iter()
            .all(|item| item.examiner_name.as_deref() == Some("examiner1"))
    );

    let round_two = engine
        .storage()
        .list_assignments_with_pagination(AssignmentListQuery {
            round_number: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(round_two.items.len(), 1);
    assert_eq!(round_two.items[0].assignment.examiner_id, e2.id);
}

#[tokio::test]
async fn test_stats_summarise_workflow() {
    let engine = engine().await;
    let admin = add_user(&engine, "admin01", UserRole::Admin).await;
    let e1 = add_examiner(&engine, "examiner1", &[MATH]).await;
    let e2 = add_examiner(&engine, "examiner2", &[MATH]).await;
    graded_block(&engine, "B1", (&e1, &e2), (7.0, 7.5)).await;
    graded_block(&engine, "B2", (&e1, &e2), (9.0, 3.0)).await;
    add_block(&engine, "B3", MATH).await;
    assign(&engine, "B3", &e1, 1).await.unwrap();
    engine.approve_score("B1", admin.id, None).await.unwrap();

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.assignments.completed, 4);
    assert_eq!(stats.assignments.assigned, 1);
    assert_eq!(stats.assignments.total, 5);
    assert_eq!(stats.total_results, 4);
    assert_eq!(stats.blocks.total, 3);
    assert_eq!(stats.blocks.matched, 1);
    assert_eq!(stats.blocks.needs_third_round, 1);
    assert_eq!(stats.blocks.pending, 1);
    assert_eq!(stats.blocks.approved, 1);
    assert_eq!(stats.blocks.manual_review, 0);
}

#[test]
fn test_policy_from_config_validates_grading_section() {
    let defaults = crate::config::AppConfig::load()
        .expect("defaults should deserialize")
        .grading;

    let policy = GradingPolicy::from_grading(&defaults).unwrap();
    assert_eq!(policy.tolerance, defaults.tolerance);

    let mut grading = defaults.clone();
    grading.third_round_priority = "medium".to_string();
    let policy = GradingPolicy::from_grading(&grading).unwrap();
    assert_eq!(policy.third_round_priority, Priority::Medium);

    grading.third_round_priority = "URGENT".to_string();
    let err = GradingPolicy::from_grading(&grading).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    for tolerance in [-0.5, f64::NAN, f64::INFINITY] {
        let mut grading = defaults.clone();
        grading.tolerance = tolerance;
        let err = GradingPolicy::from_grading(&grading).unwrap_err();
        assert!(matches!(err, ExamSystemError::Validation(_)));
    }

    for examiners in [0, 3] {
        let mut grading = defaults.clone();
        grading.default_examiners_per_block = examiners;
        let err = GradingPolicy::from_grading(&grading).unwrap_err();
        assert!(matches!(err, ExamSystemError::Validation(_)));
    }

    let mut grading = defaults;
    grading.tolerance = 0.0;
    grading.default_examiners_per_block = 1;
    assert!(GradingPolicy::from_grading(&grading).is_ok());
}
