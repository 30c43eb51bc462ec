pub mod create;
pub mod get;
pub mod list;
pub mod subjects;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::users::requests::{AddExaminerSubjectRequest, CreateUserRequest, UserListParams};
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        if let Some(storage) = &self.storage {
            return Ok(storage.clone());
        }
        request
            .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
            .map(|data| data.get_ref().clone())
            .ok_or_else(|| actix_web::error::ErrorInternalServerError("Storage not configured"))
    }

    // 获取用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建用户
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    // 根据ID获取用户
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 阅卷员科目资格
    pub async fn list_subjects(
        &self,
        examiner_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        subjects::list_subjects(self, examiner_id, request).await
    }

    pub async fn add_subject(
        &self,
        examiner_id: i64,
        body: AddExaminerSubjectRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        subjects::add_subject(self, examiner_id, body, request).await
    }

    pub async fn remove_subject(
        &self,
        examiner_id: i64,
        subject_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        subjects::remove_subject(self, examiner_id, subject_id, request).await
    }
}
