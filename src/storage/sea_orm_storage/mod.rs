//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod approvals;
mod assignments;
mod blocks;
mod examiner_subjects;
mod results;
mod users;

use crate::config::AppConfig;
use crate::errors::{ExamSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接指定数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 内存数据库（测试用）
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        Self::connect(":memory:", 1, 5).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ExamSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库每个连接互相独立，只能使用单连接且不能回收
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(timeout))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size)
                .min_connections(1)
                .test_before_acquire(true)
                .acquire_timeout(Duration::from_secs(timeout))
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .connect_with(opt)
            .await
            .map_err(|e| ExamSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ExamSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url == ":memory:" || url == "sqlite::memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ExamSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListParams) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 阅卷员科目资格
    async fn add_examiner_subject(
        &self,
        examiner_id: i64,
        subject_id: i64,
    ) -> Result<ExaminerSubject> {
        self.add_examiner_subject_impl(examiner_id, subject_id)
            .await
    }

    async fn list_examiner_subjects(&self, examiner_id: i64) -> Result<Vec<ExaminerSubject>> {
        self.list_examiner_subjects_impl(examiner_id).await
    }

    async fn remove_examiner_subject(&self, examiner_id: i64, subject_id: i64) -> Result<bool> {
        self.remove_examiner_subject_impl(examiner_id, subject_id)
            .await
    }

    async fn is_examiner_qualified(&self, examiner_id: i64, subject_id: i64) -> Result<bool> {
        self.is_examiner_qualified_impl(examiner_id, subject_id)
            .await
    }

    async fn list_eligible_examiners(&self, subject_id: i64) -> Result<Vec<User>> {
        self.list_eligible_examiners_impl(subject_id).await
    }

    // 答题块模块
    async fn create_block(&self, block: CreateBlockRequest) -> Result<AnswerBlock> {
        self.create_block_impl(block).await
    }

    async fn get_block(&self, block_code: &str) -> Result<Option<AnswerBlock>> {
        self.get_block_impl(block_code).await
    }

    async fn list_blocks_with_pagination(
        &self,
        query: BlockListQuery,
    ) -> Result<BlockListResponse> {
        self.list_blocks_with_pagination_impl(query).await
    }

    async fn list_pending_blocks(&self) -> Result<Vec<PendingBlock>> {
        self.list_pending_blocks_impl().await
    }

    async fn count_blocks(&self) -> Result<u64> {
        self.count_blocks_impl().await
    }

    // 分配模块
    async fn create_assignments(
        &self,
        items: Vec<NewAssignment>,
    ) -> Result<Vec<GradingAssignment>> {
        self.create_assignments_impl(items).await
    }

    async fn get_assignment(&self, id: i64) -> Result<Option<GradingAssignment>> {
        self.get_assignment_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn list_block_assignments(&self, block_code: &str) -> Result<Vec<GradingAssignment>> {
        self.list_block_assignments_impl(block_code).await
    }

    async fn list_examiner_assignments(
        &self,
        examiner_id: i64,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<(GradingAssignment, Option<AnswerBlock>)>> {
        self.list_examiner_assignments_impl(examiner_id, status)
            .await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    async fn update_assignment_status(
        &self,
        id: i64,
        status: AssignmentStatus,
    ) -> Result<Option<GradingAssignment>> {
        self.update_assignment_status_impl(id, status).await
    }

    async fn examiner_loads(&self, examiner_ids: &[i64]) -> Result<HashMap<i64, u64>> {
        self.examiner_loads_impl(examiner_ids).await
    }

    async fn mark_overdue_assignments(&self, assigned_before: i64) -> Result<u64> {
        self.mark_overdue_assignments_impl(assigned_before).await
    }

    async fn count_assignments_by_status(&self) -> Result<HashMap<AssignmentStatus, u64>> {
        self.count_assignments_by_status_impl().await
    }

    // 评分结果模块
    async fn create_result(&self, result: NewResult) -> Result<GradingResult> {
        self.create_result_impl(result).await
    }

    async fn get_result(&self, id: i64) -> Result<Option<GradingResult>> {
        self.get_result_impl(id).await
    }

    async fn get_result_by_assignment(&self, assignment_id: i64) -> Result<Option<GradingResult>> {
        self.get_result_by_assignment_impl(assignment_id).await
    }

    async fn list_block_results(&self, block_code: &str) -> Result<Vec<GradingResult>> {
        self.list_block_results_impl(block_code).await
    }

    async fn list_all_results(&self) -> Result<Vec<GradingResult>> {
        self.list_all_results_impl().await
    }

    async fn update_result_annotations(
        &self,
        id: i64,
        comments: Option<String>,
        criteria_scores: Option<HashMap<String, f64>>,
    ) -> Result<Option<GradingResult>> {
        self.update_result_annotations_impl(id, comments, criteria_scores)
            .await
    }

    // 审核模块
    async fn approve_block(&self, approval: NewFinalScore) -> Result<FinalScore> {
        self.approve_block_impl(approval).await
    }

    async fn get_final_score(&self, block_code: &str) -> Result<Option<FinalScore>> {
        self.get_final_score_impl(block_code).await
    }

    async fn list_final_scores(&self) -> Result<Vec<FinalScore>> {
        self.list_final_scores_impl().await
    }
}
