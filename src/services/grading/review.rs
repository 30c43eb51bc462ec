//! 比对、第三轮仲裁与最终审核

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::GradingService;
use crate::models::ApiResponse;
use crate::models::grading::entities::Priority;
use crate::utils::error_response;

pub async fn compare(
    service: &GradingService,
    block_code: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.comparison(block_code).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Comparison computed successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn assign_third_round(
    service: &GradingService,
    block_code: &str,
    priority: Option<Priority>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.assign_third_round(block_code, priority).await {
        Ok(assignment) => {
            info!(
                "Third round of block {} assigned to examiner {}",
                block_code, assignment.examiner_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(assignment, "Third round assigned successfully")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn approve(
    service: &GradingService,
    block_code: &str,
    final_score: Option<f64>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match GradingService::current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.approve_score(block_code, user.id, final_score).await {
        Ok(approval) => {
            if approval.overridden {
                warn!(
                    "Block {} approved with overridden score {} by user {}",
                    block_code, approval.final_score, user.id
                );
            } else {
                info!("Block {} approved with score {}", block_code, approval.final_score);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(approval, "Score approved successfully")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
