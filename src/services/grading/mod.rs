//! 阅卷流程服务层
//!
//! 负责 HTTP 请求与 [`GradingEngine`] 之间的转换，业务规则全部在引擎内完成。

pub mod assignments;
pub mod blocks;
pub mod results;
pub mod review;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::grading::GradingEngine;
use crate::middlewares::RequireJWT;
use crate::models::grading::requests::{
    AssignmentListQuery, AutoAssignRequest, BlockListQuery, CreateAssignmentRequest,
    CreateBlockRequest, MyAssignmentsQuery, SubmitResultRequest, UpdateResultRequest,
};
use crate::models::grading::entities::Priority;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

pub struct GradingService {
    engine: Option<Arc<GradingEngine>>,
}

impl GradingService {
    pub fn new_lazy() -> Self {
        Self { engine: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> ActixResult<Arc<GradingEngine>> {
        if let Some(engine) = &self.engine {
            return Ok(engine.clone());
        }
        request
            .app_data::<actix_web::web::Data<Arc<GradingEngine>>>()
            .map(|data| data.get_ref().clone())
            .ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Grading engine not configured")
            })
    }

    /// 当前登录用户，未登录时返回 401 响应
    pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
        RequireJWT::extract_user_claims(request).ok_or_else(|| {
            HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "Not logged in"))
        })
    }

    // 答题块
    pub async fn create_block(
        &self,
        body: CreateBlockRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        blocks::create_block(self, body, request).await
    }

    pub async fn list_blocks(
        &self,
        query: BlockListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        blocks::list_blocks(self, query, request).await
    }

    pub async fn get_block(&self, block_code: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        blocks::get_block(self, block_code, request).await
    }

    pub async fn block_results(
        &self,
        block_code: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        blocks::block_results(self, block_code, request).await
    }

    pub async fn pending_blocks(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        blocks::pending_blocks(self, request).await
    }

    // 分配
    pub async fn create_assignment(
        &self,
        body: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::create_assignment(self, body, request).await
    }

    pub async fn list_assignments(
        &self,
        query: AssignmentListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::list_assignments(self, query, request).await
    }

    pub async fn auto_assign(
        &self,
        body: AutoAssignRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::auto_assign(self, body, request).await
    }

    pub async fn delete_assignment(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        assignments::delete_assignment(self, id, request).await
    }

    pub async fn start_assignment(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        assignments::start_assignment(self, id, request).await
    }

    pub async fn my_assignments(
        &self,
        query: MyAssignmentsQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::my_assignments(self, query, request).await
    }

    // 评分结果
    pub async fn submit_result(
        &self,
        body: SubmitResultRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        results::submit_result(self, body, request).await
    }

    pub async fn update_result(
        &self,
        id: i64,
        body: UpdateResultRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        results::update_result(self, id, body, request).await
    }

    // 比对、仲裁与审核
    pub async fn compare(&self, block_code: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        review::compare(self, block_code, request).await
    }

    pub async fn assign_third_round(
        &self,
        block_code: &str,
        priority: Option<Priority>,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::assign_third_round(self, block_code, priority, request).await
    }

    pub async fn approve(
        &self,
        block_code: &str,
        final_score: Option<f64>,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::approve(self, block_code, final_score, request).await
    }

    pub async fn stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        stats::stats(self, request).await
    }
}
