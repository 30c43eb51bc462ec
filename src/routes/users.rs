use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{AddExaminerSubjectRequest, CreateUserRequest, UserListParams};
use crate::services::UserService;
use crate::utils::{SafeIDI64, SafeSubjectIdI64};

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

// HTTP处理程序
pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn list_subjects(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_subjects(user_id.0, &req).await
}

pub async fn add_subject(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<AddExaminerSubjectRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .add_subject(user_id.0, body.into_inner(), &req)
        .await
}

pub async fn remove_subject(
    req: HttpRequest,
    user_id: SafeIDI64,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .remove_subject(user_id.0, subject_id.0, &req)
        .await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}/subjects", web::get().to(list_subjects))
            .route("/{id}/subjects", web::post().to(add_subject))
            .route("/{id}/subjects/{subject_id}", web::delete().to(remove_subject)),
    );
}
