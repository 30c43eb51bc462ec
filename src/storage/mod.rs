use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    grading::{
        entities::{
            AnswerBlock, AssignmentStatus, FinalScore, GradingAssignment, GradingResult,
            NewAssignment, NewFinalScore, NewResult,
        },
        requests::{AssignmentListQuery, BlockListQuery, CreateBlockRequest},
        responses::{AssignmentListResponse, BlockListResponse, PendingBlock},
    },
    users::{
        entities::{ExaminerSubject, User},
        requests::{CreateUserRequest, UserListParams},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段须为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListParams) -> Result<UserListResponse>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 阅卷员科目资格
    async fn add_examiner_subject(&self, examiner_id: i64, subject_id: i64)
    -> Result<ExaminerSubject>;
    async fn list_examiner_subjects(&self, examiner_id: i64) -> Result<Vec<ExaminerSubject>>;
    async fn remove_examiner_subject(&self, examiner_id: i64, subject_id: i64) -> Result<bool>;
    async fn is_examiner_qualified(&self, examiner_id: i64, subject_id: i64) -> Result<bool>;
    // 某科目下所有在职阅卷员，按 ID 升序
    async fn list_eligible_examiners(&self, subject_id: i64) -> Result<Vec<User>>;

    /// 答题块
    async fn create_block(&self, block: CreateBlockRequest) -> Result<AnswerBlock>;
    async fn get_block(&self, block_code: &str) -> Result<Option<AnswerBlock>>;
    async fn list_blocks_with_pagination(&self, query: BlockListQuery)
    -> Result<BlockListResponse>;
    // 第一、二轮分配不足两份的答题块
    async fn list_pending_blocks(&self) -> Result<Vec<PendingBlock>>;
    async fn count_blocks(&self) -> Result<u64>;

    /// 阅卷分配
    // 在同一事务中创建多条分配，任一失败则全部回滚
    async fn create_assignments(&self, items: Vec<NewAssignment>)
    -> Result<Vec<GradingAssignment>>;
    async fn get_assignment(&self, id: i64) -> Result<Option<GradingAssignment>>;
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    async fn list_block_assignments(&self, block_code: &str) -> Result<Vec<GradingAssignment>>;
    async fn list_examiner_assignments(
        &self,
        examiner_id: i64,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<(GradingAssignment, Option<AnswerBlock>)>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;
    async fn update_assignment_status(
        &self,
        id: i64,
        status: AssignmentStatus,
    ) -> Result<Option<GradingAssignment>>;
    // 未完成分配数（ASSIGNED + IN_PROGRESS + OVERDUE）
    async fn examiner_loads(&self, examiner_ids: &[i64]) -> Result<HashMap<i64, u64>>;
    // 将 assigned_before 之前分配、此后无状态变更且未完成的任务标记为 OVERDUE
    async fn mark_overdue_assignments(&self, assigned_before: i64) -> Result<u64>;
    async fn count_assignments_by_status(&self) -> Result<HashMap<AssignmentStatus, u64>>;

    /// 评分结果
    // 写入结果并将对应分配置为 COMPLETED（同一事务）
    async fn create_result(&self, result: NewResult) -> Result<GradingResult>;
    async fn get_result(&self, id: i64) -> Result<Option<GradingResult>>;
    async fn get_result_by_assignment(&self, assignment_id: i64) -> Result<Option<GradingResult>>;
    // 按轮次升序
    async fn list_block_results(&self, block_code: &str) -> Result<Vec<GradingResult>>;
    // 所有结果，按答题块、轮次排序
    async fn list_all_results(&self) -> Result<Vec<GradingResult>>;
    async fn update_result_annotations(
        &self,
        id: i64,
        comments: Option<String>,
        criteria_scores: Option<HashMap<String, f64>>,
    ) -> Result<Option<GradingResult>>;

    /// 审核
    // 写入最终分数并将该答题块所有结果置为 is_final（同一事务）
    async fn approve_block(&self, approval: NewFinalScore) -> Result<FinalScore>;
    async fn get_final_score(&self, block_code: &str) -> Result<Option<FinalScore>>;
    async fn list_final_scores(&self) -> Result<Vec<FinalScore>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
