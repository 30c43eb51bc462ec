//! 分配管理：手工分配、批量自动分配、删除、开始评分、查询

use std::collections::HashSet;

use tracing::{info, warn};

use super::GradingEngine;
use super::selection::pick_least_loaded;
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::{
    entities::{AssignmentStatus, ComparisonStatus, GradingAssignment, NewAssignment, Priority},
    requests::{AutoAssignRequest, CreateAssignmentRequest},
    responses::{
        AutoAssignBlockResult, AutoAssignResponse, MyAssignmentItem, MyAssignmentsResponse,
        PendingBlocksResponse,
    },
};

impl GradingEngine {
    /// 手工创建一条分配
    pub async fn create_assignment(
        &self,
        req: CreateAssignmentRequest,
    ) -> Result<GradingAssignment> {
        let round = req.round_number;
        if !(1..=3).contains(&round) {
            return Err(ExamSystemError::invalid_round(format!(
                "Round number must be 1, 2 or 3, got {round}"
            )));
        }

        let block = self.require_block(&req.block_code).await?;
        let _guard = self.locks.lock(&block.block_code).await;

        self.ensure_not_approved(&block.block_code).await?;

        let existing = self.storage.list_block_assignments(&block.block_code).await?;
        if existing
            .iter()
            .any(|a| a.round_number == round && a.examiner_id == req.examiner_id)
        {
            return Err(ExamSystemError::duplicate_assignment(format!(
                "Examiner {} already holds round {round} of block {}",
                req.examiner_id, block.block_code
            )));
        }
        if let Some(holder) = existing.iter().find(|a| a.round_number == round) {
            return Err(ExamSystemError::round_occupied(format!(
                "Round {round} of block {} is already assigned to examiner {}",
                block.block_code, holder.examiner_id
            )));
        }
        if let Some(other) = existing.iter().find(|a| a.examiner_id == req.examiner_id) {
            return Err(ExamSystemError::examiner_already_assigned(format!(
                "Examiner {} already holds round {} of block {}",
                req.examiner_id, other.round_number, block.block_code
            )));
        }

        if round == 3 {
            let results = self.storage.list_block_results(&block.block_code).await?;
            let outcome = self.outcome_of(&results);
            if outcome.status != ComparisonStatus::NeedsThirdRound {
                return Err(ExamSystemError::invalid_round(format!(
                    "Round 3 requires a NEEDS_THIRD_ROUND outcome, block {} is {}",
                    block.block_code, outcome.status
                )));
            }
        }

        let examiner = self
            .storage
            .get_user_by_id(req.examiner_id)
            .await?
            .ok_or_else(|| {
                ExamSystemError::not_found(format!("Examiner {} not found", req.examiner_id))
            })?;
        if !examiner.is_active_examiner()
            || !self
                .storage
                .is_examiner_qualified(examiner.id, block.subject_id)
                .await?
        {
            return Err(ExamSystemError::not_qualified(format!(
                "User {} is not an active examiner for subject {}",
                examiner.id, block.subject_id
            )));
        }

        let mut created = self
            .storage
            .create_assignments(vec![NewAssignment {
                block_code: block.block_code.clone(),
                examiner_id: examiner.id,
                round_number: round,
                priority: req.priority.unwrap_or(Priority::Medium),
            }])
            .await?;

        let assignment = created
            .pop()
            .ok_or_else(|| ExamSystemError::database_operation("Assignment was not created"))?;

        info!(
            "分配创建: block={} round={} examiner={}",
            assignment.block_code, assignment.round_number, assignment.examiner_id
        );
        Ok(assignment)
    }

    /// 批量自动分配
    ///
    /// 每个答题块独立成败，单个答题块的失败不影响其他答题块，
    /// 失败的答题块不会写入任何分配。
    pub async fn auto_assign(&self, req: AutoAssignRequest) -> Result<AutoAssignResponse> {
        let per_block = req
            .examiners_per_block
            .unwrap_or(self.policy.default_examiners_per_block);
        if !(1..=2).contains(&per_block) {
            return Err(ExamSystemError::validation(format!(
                "examiners_per_block must be 1 or 2, got {per_block}"
            )));
        }
        if req.block_codes.is_empty() {
            return Err(ExamSystemError::validation("block_codes must not be empty"));
        }
        let priority = req.priority.unwrap_or(Priority::Medium);

        // 批次之间串行，保证负载统计准确
        let _selection = self.selection.lock().await;

        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(req.block_codes.len());
        for block_code in req.block_codes {
            if !seen.insert(block_code.clone()) {
                continue;
            }

            match self
                .auto_assign_block(&block_code, per_block as i32, priority)
                .await
            {
                Ok(assignments) => results.push(AutoAssignBlockResult {
                    block_code,
                    success: true,
                    assignments,
                    error_code: None,
                    error: None,
                }),
                Err(e) => {
                    warn!("自动分配失败 block={}: {}", block_code, e);
                    results.push(AutoAssignBlockResult {
                        block_code,
                        success: false,
                        assignments: Vec::new(),
                        error_code: Some(e.code().to_string()),
                        error: Some(e.message().to_string()),
                    });
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        info!("自动分配完成: 成功 {} 个, 失败 {} 个", succeeded, failed);

        Ok(AutoAssignResponse {
            succeeded,
            failed,
            results,
        })
    }

    async fn auto_assign_block(
        &self,
        block_code: &str,
        per_block: i32,
        priority: Priority,
    ) -> Result<Vec<GradingAssignment>> {
        let block = self.require_block(block_code).await?;
        let _guard = self.locks.lock(block_code).await;

        self.ensure_not_approved(block_code).await?;

        let existing = self.storage.list_block_assignments(block_code).await?;
        let missing_rounds: Vec<i32> = (1..=per_block)
            .filter(|round| !existing.iter().any(|a| a.round_number == *round))
            .collect();
        if missing_rounds.is_empty() {
            return Err(ExamSystemError::conflict(format!(
                "Block {block_code} already has rounds 1..={per_block} assigned"
            )));
        }

        let on_block: HashSet<i64> = existing.iter().map(|a| a.examiner_id).collect();
        let candidates: Vec<i64> = self
            .storage
            .list_eligible_examiners(block.subject_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .filter(|id| !on_block.contains(id))
            .collect();

        if candidates.len() < missing_rounds.len() {
            return Err(ExamSystemError::no_eligible_examiner(format!(
                "Block {block_code} needs {} examiner(s) for subject {}, only {} available",
                missing_rounds.len(),
                block.subject_id,
                candidates.len()
            )));
        }

        let loads = self.storage.examiner_loads(&candidates).await?;
        let chosen = pick_least_loaded(&candidates, &loads, missing_rounds.len());

        let rows = missing_rounds
            .into_iter()
            .zip(chosen)
            .map(|(round_number, examiner_id)| NewAssignment {
                block_code: block_code.to_string(),
                examiner_id,
                round_number,
                priority,
            })
            .collect();

        self.storage.create_assignments(rows).await
    }

    /// 删除未完成的分配
    pub async fn delete_assignment(&self, id: i64) -> Result<()> {
        let assignment = self.require_assignment(id).await?;
        let _guard = self.locks.lock(&assignment.block_code).await;

        // 加锁后重新读取，避免与提交并发
        let assignment = self.require_assignment(id).await?;
        if assignment.status == AssignmentStatus::Completed {
            return Err(ExamSystemError::cannot_delete_completed(format!(
                "Assignment {id} is completed and cannot be deleted"
            )));
        }

        self.storage.delete_assignment(id).await?;
        info!("分配删除: id={} block={}", id, assignment.block_code);
        Ok(())
    }

    /// 阅卷员开始评分：ASSIGNED/OVERDUE -> IN_PROGRESS
    pub async fn start_assignment(&self, id: i64, examiner_id: i64) -> Result<GradingAssignment> {
        let assignment = self.require_assignment(id).await?;
        if assignment.examiner_id != examiner_id {
            return Err(ExamSystemError::authorization(format!(
                "Assignment {id} belongs to another examiner"
            )));
        }

        let _guard = self.locks.lock(&assignment.block_code).await;
        let assignment = self.require_assignment(id).await?;

        match assignment.status {
            AssignmentStatus::InProgress => Ok(assignment),
            AssignmentStatus::Completed => Err(ExamSystemError::invalid_transition(format!(
                "Assignment {id} is already completed"
            ))),
            AssignmentStatus::Assigned | AssignmentStatus::Overdue => self
                .storage
                .update_assignment_status(id, AssignmentStatus::InProgress)
                .await?
                .ok_or_else(|| ExamSystemError::not_found(format!("Assignment {id} not found"))),
        }
    }

    /// 第一、二轮分配不足两份的答题块
    pub async fn pending_blocks(&self) -> Result<PendingBlocksResponse> {
        let items = self.storage.list_pending_blocks().await?;
        Ok(PendingBlocksResponse { items })
    }

    /// 阅卷员自己的分配
    pub async fn my_assignments(
        &self,
        examiner_id: i64,
        status: Option<AssignmentStatus>,
    ) -> Result<MyAssignmentsResponse> {
        let items = self
            .storage
            .list_examiner_assignments(examiner_id, status)
            .await?
            .into_iter()
            .map(|(assignment, block)| MyAssignmentItem {
                assignment,
                max_score: block.as_ref().map(|b| b.max_score),
                subject_id: block.as_ref().map(|b| b.subject_id),
            })
            .collect();

        Ok(MyAssignmentsResponse { items })
    }

    pub(super) async fn require_assignment(&self, id: i64) -> Result<GradingAssignment> {
        self.storage
            .get_assignment(id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("Assignment {id} not found")))
    }
}
