use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradingService;
use crate::errors::ExamSystemError;
use crate::models::grading::requests::{BlockListQuery, CreateBlockRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;
use crate::utils::validate::{validate_block_code, validate_max_score};

pub async fn create_block(
    service: &GradingService,
    body: CreateBlockRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_block_code(&body.block_code) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BlockCodeInvalid, msg)));
    }
    if let Err(msg) = validate_max_score(body.max_score) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if body.subject_id <= 0 || body.exam_id <= 0 || body.question_number <= 0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "subject_id, exam_id and question_number must be positive",
        )));
    }

    let engine = service.get_engine(request)?;

    match engine.storage().create_block(body).await {
        Ok(block) => {
            info!("Answer block {} registered", block.block_code);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(block, "Answer block created successfully")))
        }
        Err(ExamSystemError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::BlockAlreadyExists, "Answer block already exists"),
        )),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_blocks(
    service: &GradingService,
    query: BlockListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.storage().list_blocks_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Answer blocks retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_block(
    service: &GradingService,
    block_code: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.storage().get_block(block_code).await {
        Ok(Some(block)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            block,
            "Answer block retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BlockNotFound,
            format!("Answer block {block_code} not found"),
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn block_results(
    service: &GradingService,
    block_code: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.block_results(block_code).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grading results retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn pending_blocks(
    service: &GradingService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.pending_blocks().await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Pending blocks retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
