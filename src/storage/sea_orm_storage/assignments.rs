//! 阅卷分配存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::answer_blocks::Entity as AnswerBlocks;
use crate::entity::grading_assignments::{ActiveModel, Column, Entity as GradingAssignments};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationInfo,
    common::page_and_size,
    grading::{
        entities::{AnswerBlock, AssignmentStatus, GradingAssignment, NewAssignment},
        requests::AssignmentListQuery,
        responses::{AssignmentItem, AssignmentListResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 批量创建分配（单事务）
    pub async fn create_assignments_impl(
        &self,
        items: Vec<NewAssignment>,
    ) -> Result<Vec<GradingAssignment>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let model = ActiveModel {
                block_code: Set(item.block_code),
                examiner_id: Set(item.examiner_id),
                round_number: Set(item.round_number),
                priority: Set(item.priority.to_string()),
                status: Set(AssignmentStatus::Assigned.to_string()),
                assigned_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            // 唯一索引冲突转为 Conflict，事务随 txn 释放回滚
            created.push(model.insert(&txn).await?.into_assignment());
        }

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created)
    }

    /// 通过 ID 获取分配
    pub async fn get_assignment_impl(&self, id: i64) -> Result<Option<GradingAssignment>> {
        let result = GradingAssignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询分配失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分页列出分配
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let (page, size) = page_and_size(query.page, query.size);

        let mut select = GradingAssignments::find();

        if let Some(ref block_code) = query.block_code {
            select = select.filter(Column::BlockCode.eq(block_code.as_str()));
        }

        if let Some(examiner_id) = query.examiner_id {
            select = select.filter(Column::ExaminerId.eq(examiner_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(round_number) = query.round_number {
            select = select.filter(Column::RoundNumber.eq(round_number));
        }

        select = select
            .order_by_asc(Column::BlockCode)
            .order_by_asc(Column::RoundNumber);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询分配总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询分配页数失败: {e}")))?;

        let assignments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询分配列表失败: {e}")))?;

        // 补充阅卷员名称
        let mut examiner_ids: Vec<i64> = assignments.iter().map(|m| m.examiner_id).collect();
        examiner_ids.sort_unstable();
        examiner_ids.dedup();
        let names: HashMap<i64, String> = self
            .get_users_by_ids_impl(&examiner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name().to_string()))
            .collect();

        let items = assignments
            .into_iter()
            .map(|m| {
                let examiner_name = names.get(&m.examiner_id).cloned();
                AssignmentItem {
                    assignment: m.into_assignment(),
                    examiner_name,
                }
            })
            .collect();

        Ok(AssignmentListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 列出答题块的全部分配，按轮次升序
    pub async fn list_block_assignments_impl(
        &self,
        block_code: &str,
    ) -> Result<Vec<GradingAssignment>> {
        let result = GradingAssignments::find()
            .filter(Column::BlockCode.eq(block_code))
            .order_by_asc(Column::RoundNumber)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询分配失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 列出阅卷员的分配，高优先级在前，同优先级按分配时间先后
    pub async fn list_examiner_assignments_impl(
        &self,
        examiner_id: i64,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<(GradingAssignment, Option<AnswerBlock>)>> {
        let mut select = GradingAssignments::find().filter(Column::ExaminerId.eq(examiner_id));

        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let rows = select
            .order_by_asc(Column::AssignedAt)
            .order_by_asc(Column::Id)
            .find_also_related(AnswerBlocks)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询我的分配失败: {e}")))?;

        let mut items: Vec<(GradingAssignment, Option<AnswerBlock>)> = rows
            .into_iter()
            .map(|(assignment, block)| (assignment.into_assignment(), block.map(|b| b.into_block())))
            .collect();

        // 稳定排序，保留分配时间顺序
        items.sort_by_key(|(a, _)| std::cmp::Reverse(a.priority.rank()));

        Ok(items)
    }

    /// 删除分配
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = GradingAssignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除分配失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新分配状态
    pub async fn update_assignment_status_impl(
        &self,
        id: i64,
        status: AssignmentStatus,
    ) -> Result<Option<GradingAssignment>> {
        let now = chrono::Utc::now().timestamp();

        let result = GradingAssignments::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(status.to_string()),
            )
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新分配状态失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_assignment_impl(id).await
    }

    /// 统计阅卷员当前未完成的分配数，未出现的阅卷员视为 0
    pub async fn examiner_loads_impl(&self, examiner_ids: &[i64]) -> Result<HashMap<i64, u64>> {
        let mut loads: HashMap<i64, u64> = examiner_ids.iter().map(|id| (*id, 0)).collect();
        if examiner_ids.is_empty() {
            return Ok(loads);
        }

        let open: Vec<&'static str> = AssignmentStatus::open_statuses()
            .iter()
            .map(|s| s.as_str())
            .collect();

        let rows: Vec<(i64, i64)> = GradingAssignments::find()
            .select_only()
            .column(Column::ExaminerId)
            .column_as(Column::Id.count(), "load")
            .filter(Column::ExaminerId.is_in(examiner_ids.iter().copied()))
            .filter(Column::Status.is_in(open))
            .group_by(Column::ExaminerId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("统计阅卷员负载失败: {e}")))?;

        for (examiner_id, load) in rows {
            loads.insert(examiner_id, load.max(0) as u64);
        }

        Ok(loads)
    }

    /// 将超期未完成的分配标记为 OVERDUE
    ///
    /// 截止时间之后有过状态变更（例如逾期后重新开始）的分配不会被再次标记
    pub async fn mark_overdue_assignments_impl(&self, assigned_before: i64) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();

        let result = GradingAssignments::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(AssignmentStatus::Overdue.to_string()),
            )
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Status.is_in([
                AssignmentStatus::Assigned.as_str(),
                AssignmentStatus::InProgress.as_str(),
            ]))
            .filter(Column::AssignedAt.lt(assigned_before))
            .filter(Column::UpdatedAt.lt(assigned_before))
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("标记逾期分配失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 按状态统计分配数量
    pub async fn count_assignments_by_status_impl(
        &self,
    ) -> Result<HashMap<AssignmentStatus, u64>> {
        let rows: Vec<(String, i64)> = GradingAssignments::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "total")
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("统计分配状态失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(status, total)| {
                status
                    .parse::<AssignmentStatus>()
                    .ok()
                    .map(|s| (s, total.max(0) as u64))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::{entities::Priority, requests::CreateBlockRequest};
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::Storage;

    async fn storage_with_assignment() -> (SeaOrmStorage, GradingAssignment) {
        let storage = SeaOrmStorage::in_memory()
            .await
            .expect("in-memory storage should start");
        let examiner = storage
            .create_user(CreateUserRequest {
                username: "examiner1".to_string(),
                email: "examiner1@school.test".to_string(),
                password: "not-a-real-hash".to_string(),
                role: UserRole::Examiner,
                display_name: None,
            })
            .await
            .unwrap();
        storage
            .create_block(CreateBlockRequest {
                block_code: "B1".to_string(),
                subject_id: 1,
                exam_id: 2026,
                question_number: 1,
                max_score: 10.0,
            })
            .await
            .unwrap();
        let mut created = storage
            .create_assignments(vec![NewAssignment {
                block_code: "B1".to_string(),
                examiner_id: examiner.id,
                round_number: 1,
                priority: Priority::Medium,
            }])
            .await
            .unwrap();
        (storage, created.remove(0))
    }

    /// 把分配时间和更新时间回拨到 `seconds` 秒之前
    async fn backdate(storage: &SeaOrmStorage, id: i64, seconds: i64) {
        let then = chrono::Utc::now().timestamp() - seconds;
        GradingAssignments::update_many()
            .col_expr(Column::AssignedAt, sea_orm::sea_query::Expr::value(then))
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(then))
            .filter(Column::Id.eq(id))
            .exec(&storage.db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_overdue_skips_recently_restarted() {
        let (storage, assignment) = storage_with_assignment().await;
        backdate(&storage, assignment.id, 7200).await;

        let cutoff = chrono::Utc::now().timestamp() - 3600;
        assert_eq!(storage.mark_overdue_assignments(cutoff).await.unwrap(), 1);
        let overdue = storage.get_assignment(assignment.id).await.unwrap().unwrap();
        assert_eq!(overdue.status, AssignmentStatus::Overdue);

        // 逾期后重新开始，下一次扫描不应再标记
        storage
            .update_assignment_status(assignment.id, AssignmentStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(storage.mark_overdue_assignments(cutoff).await.unwrap(), 0);
        let restarted = storage.get_assignment(assignment.id).await.unwrap().unwrap();
        assert_eq!(restarted.status, AssignmentStatus::InProgress);
    }

    #[tokio::test]
    async fn test_mark_overdue_ignores_recent_and_completed() {
        let (storage, assignment) = storage_with_assignment().await;

        let cutoff = chrono::Utc::now().timestamp() - 3600;
        assert_eq!(storage.mark_overdue_assignments(cutoff).await.unwrap(), 0);

        backdate(&storage, assignment.id, 7200).await;
        GradingAssignments::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(AssignmentStatus::Completed.to_string()),
            )
            .filter(Column::Id.eq(assignment.id))
            .exec(&storage.db)
            .await
            .unwrap();
        assert_eq!(storage.mark_overdue_assignments(cutoff).await.unwrap(), 0);
    }
}
