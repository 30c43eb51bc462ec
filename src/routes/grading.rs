//! 阅卷流程路由
//!
//! 同一作用域下管理员与阅卷员接口混合，角色校验挂在各个资源上。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::grading::requests::{
    ApproveScoreRequest, AssignThirdRoundRequest, AssignmentListQuery, AutoAssignRequest,
    BlockListQuery, CreateAssignmentRequest, CreateBlockRequest, MyAssignmentsQuery,
    SubmitResultRequest, UpdateResultRequest,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::GradingService;
use crate::utils::{SafeBlockCode, SafeIDI64};

// 懒加载的全局 GradingService 实例
static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

/// 请求体可省略的接口：空请求体按默认值处理
fn optional_body<T: DeserializeOwned + Default>(body: &web::Bytes) -> Result<T, HttpResponse> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Invalid JSON payload: {e}"),
        ))
    })
}

fn admin_only() -> RequireRole {
    RequireRole::new_any(UserRole::admin_roles())
}

fn examiner_only() -> RequireRole {
    RequireRole::new_any(UserRole::examiner_roles())
}

// 答题块
pub async fn create_block(
    req: HttpRequest,
    body: web::Json<CreateBlockRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.create_block(body.into_inner(), &req).await
}

pub async fn list_blocks(
    req: HttpRequest,
    query: web::Query<BlockListQuery>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.list_blocks(query.into_inner(), &req).await
}

pub async fn get_block(req: HttpRequest, code: SafeBlockCode) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.get_block(&code.0, &req).await
}

pub async fn block_results(req: HttpRequest, code: SafeBlockCode) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.block_results(&code.0, &req).await
}

pub async fn pending_blocks(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.pending_blocks(&req).await
}

// 分配
pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListQuery>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.list_assignments(query.into_inner(), &req).await
}

pub async fn create_assignment(
    req: HttpRequest,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.create_assignment(body.into_inner(), &req).await
}

pub async fn auto_assign(
    req: HttpRequest,
    body: web::Json<AutoAssignRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.auto_assign(body.into_inner(), &req).await
}

pub async fn delete_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.delete_assignment(id.0, &req).await
}

pub async fn start_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.start_assignment(id.0, &req).await
}

pub async fn my_assignments(
    req: HttpRequest,
    query: web::Query<MyAssignmentsQuery>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.my_assignments(query.into_inner(), &req).await
}

// 评分结果
pub async fn submit_result(
    req: HttpRequest,
    body: web::Json<SubmitResultRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.submit_result(body.into_inner(), &req).await
}

pub async fn update_result(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateResultRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .update_result(id.0, body.into_inner(), &req)
        .await
}

// 比对、仲裁与审核
pub async fn compare(req: HttpRequest, code: SafeBlockCode) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.compare(&code.0, &req).await
}

pub async fn assign_third_round(
    req: HttpRequest,
    code: SafeBlockCode,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let body: AssignThirdRoundRequest = match optional_body(&body) {
        Ok(body) => body,
        Err(resp) => return Ok(resp),
    };
    GRADING_SERVICE
        .assign_third_round(&code.0, body.priority, &req)
        .await
}

pub async fn approve(
    req: HttpRequest,
    code: SafeBlockCode,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let body: ApproveScoreRequest = match optional_body(&body) {
        Ok(body) => body,
        Err(resp) => return Ok(resp),
    };
    GRADING_SERVICE.approve(&code.0, body.final_score, &req).await
}

pub async fn stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.stats(&req).await
}

// 配置路由
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading")
            .wrap(RequireJWT)
            .service(
                web::resource("/blocks")
                    .wrap(admin_only())
                    .route(web::get().to(list_blocks))
                    .route(web::post().to(create_block)),
            )
            .service(
                web::resource("/blocks/{block_code}")
                    .wrap(admin_only())
                    .route(web::get().to(get_block)),
            )
            .service(
                web::resource("/blocks/{block_code}/results")
                    .wrap(admin_only())
                    .route(web::get().to(block_results)),
            )
            .service(
                web::resource("/pending-blocks")
                    .wrap(admin_only())
                    .route(web::get().to(pending_blocks)),
            )
            .service(
                web::resource("/assignments")
                    .wrap(admin_only())
                    .route(web::get().to(list_assignments))
                    .route(web::post().to(create_assignment)),
            )
            // 必须在 /assignments/{id} 之前注册
            .service(
                web::resource("/assignments/auto-assign")
                    .wrap(admin_only())
                    .route(web::post().to(auto_assign)),
            )
            .service(
                web::resource("/assignments/{id}")
                    .wrap(admin_only())
                    .route(web::delete().to(delete_assignment)),
            )
            .service(
                web::resource("/assignments/{id}/start")
                    .wrap(examiner_only())
                    .route(web::post().to(start_assignment)),
            )
            .service(
                web::resource("/my-assignments")
                    .wrap(examiner_only())
                    .route(web::get().to(my_assignments)),
            )
            .service(
                web::resource("/results")
                    .wrap(examiner_only())
                    .route(web::post().to(submit_result)),
            )
            .service(
                web::resource("/results/{id}")
                    .wrap(examiner_only())
                    .route(web::put().to(update_result)),
            )
            .service(
                web::resource("/compare/{block_code}")
                    .wrap(admin_only())
                    .route(web::get().to(compare)),
            )
            .service(
                web::resource("/assign-third-round/{block_code}")
                    .wrap(admin_only())
                    .route(web::post().to(assign_third_round)),
            )
            .service(
                web::resource("/approve/{block_code}")
                    .wrap(admin_only())
                    .route(web::post().to(approve)),
            )
            .service(
                web::resource("/stats")
                    .wrap(admin_only())
                    .route(web::get().to(stats)),
            ),
    );
}
