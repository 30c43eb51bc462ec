use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradingService;
use crate::models::ApiResponse;
use crate::models::grading::requests::{SubmitResultRequest, UpdateResultRequest};
use crate::utils::error_response;

pub async fn submit_result(
    service: &GradingService,
    body: SubmitResultRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match GradingService::current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.submit_result(user.id, body).await {
        Ok(result) => {
            info!(
                "Examiner {} submitted {} for block {} round {}",
                user.id, result.score, result.block_code, result.round_number
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(result, "Result submitted successfully")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_result(
    service: &GradingService,
    id: i64,
    body: UpdateResultRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match GradingService::current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.update_result(user.id, id, body).await {
        Ok(result) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(result, "Result updated successfully"))),
        Err(e) => Ok(error_response(&e)),
    }
}
