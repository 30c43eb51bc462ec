use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::models::ApiResponse;
use crate::utils::error_response;

pub async fn stats(service: &GradingService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.stats().await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grading statistics retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
