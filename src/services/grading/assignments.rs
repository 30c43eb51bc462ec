use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradingService;
use crate::models::ApiResponse;
use crate::models::grading::requests::{
    AssignmentListQuery, AutoAssignRequest, CreateAssignmentRequest, MyAssignmentsQuery,
};
use crate::utils::error_response;

pub async fn create_assignment(
    service: &GradingService,
    body: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.create_assignment(body).await {
        Ok(assignment) => {
            info!(
                "Assignment {} created: block {} round {} -> examiner {}",
                assignment.id, assignment.block_code, assignment.round_number, assignment.examiner_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(assignment, "Assignment created successfully")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_assignments(
    service: &GradingService,
    query: AssignmentListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.storage().list_assignments_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn auto_assign(
    service: &GradingService,
    body: AutoAssignRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.auto_assign(body).await {
        Ok(response) => {
            info!(
                "Auto-assign finished: {} succeeded, {} failed",
                response.succeeded, response.failed
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Auto-assign completed")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn delete_assignment(
    service: &GradingService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.delete_assignment(id).await {
        Ok(()) => {
            info!("Assignment {} deleted", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Assignment deleted successfully")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn start_assignment(
    service: &GradingService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match GradingService::current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.start_assignment(id, user.id).await {
        Ok(assignment) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(assignment, "Assignment started"))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn my_assignments(
    service: &GradingService,
    query: MyAssignmentsQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match GradingService::current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.my_assignments(user.id, query.status).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
