//! 阅卷员科目资格管理
//!
//! 资格决定阅卷员能否被分配到某科目的答题块，只对 examiner 角色开放。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::UserService;
use crate::errors::{ExamSystemError, Result};
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::AddExaminerSubjectRequest;
use crate::models::users::responses::ExaminerSubjectsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::error_response;

async fn require_examiner(storage: &Arc<dyn Storage>, examiner_id: i64) -> Result<User> {
    let user = storage
        .get_user_by_id(examiner_id)
        .await?
        .ok_or_else(|| ExamSystemError::not_found(format!("User {examiner_id} not found")))?;
    if user.role != UserRole::Examiner {
        return Err(ExamSystemError::validation(format!(
            "User {examiner_id} is not an examiner"
        )));
    }
    Ok(user)
}

pub async fn list_subjects(
    service: &UserService,
    examiner_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(e) = require_examiner(&storage, examiner_id).await {
        return Ok(error_response(&e));
    }

    match storage.list_examiner_subjects(examiner_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ExaminerSubjectsResponse { examiner_id, items },
            "Examiner subjects retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn add_subject(
    service: &UserService,
    examiner_id: i64,
    body: AddExaminerSubjectRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if body.subject_id <= 0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "subject_id must be a positive integer",
        )));
    }

    let storage = service.get_storage(request)?;

    if let Err(e) = require_examiner(&storage, examiner_id).await {
        return Ok(error_response(&e));
    }

    match storage.add_examiner_subject(examiner_id, body.subject_id).await {
        Ok(subject) => {
            tracing::info!(
                "Examiner {} qualified for subject {}",
                examiner_id,
                body.subject_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(subject, "Examiner subject added successfully")))
        }
        Err(ExamSystemError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::Conflict, "Examiner already holds this subject"),
        )),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn remove_subject(
    service: &UserService,
    examiner_id: i64,
    subject_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.remove_examiner_subject(examiner_id, subject_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Examiner subject removed successfully",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Examiner subject not found",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
