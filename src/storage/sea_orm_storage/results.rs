//! 评分结果存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::grading_assignments::{
    Column as AssignmentColumn, Entity as GradingAssignments,
};
use crate::entity::grading_results::{ActiveModel, Column, Entity as GradingResults};
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::entities::{AssignmentStatus, GradingResult, NewResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入评分结果并完成对应分配（单事务）
    pub async fn create_result_impl(&self, req: NewResult) -> Result<GradingResult> {
        let now = chrono::Utc::now().timestamp();
        let criteria_scores = req
            .criteria_scores
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            assignment_id: Set(req.assignment_id),
            block_code: Set(req.block_code),
            round_number: Set(req.round_number),
            examiner_id: Set(req.examiner_id),
            score: Set(req.score),
            comments: Set(req.comments),
            criteria_scores: Set(criteria_scores),
            is_final: Set(false),
            submitted_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ExamSystemError::already_submitted(
                format!("Assignment {} already has a result", req.assignment_id),
            ),
            _ => ExamSystemError::database_operation(format!("写入评分结果失败: {e}")),
        })?;

        GradingAssignments::update_many()
            .col_expr(
                AssignmentColumn::Status,
                sea_orm::sea_query::Expr::value(AssignmentStatus::Completed.to_string()),
            )
            .col_expr(AssignmentColumn::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(AssignmentColumn::Id.eq(req.assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新分配状态失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(inserted.into_result())
    }

    /// 通过 ID 获取评分结果
    pub async fn get_result_impl(&self, id: i64) -> Result<Option<GradingResult>> {
        let result = GradingResults::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询评分结果失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 通过分配 ID 获取评分结果
    pub async fn get_result_by_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Option<GradingResult>> {
        let result = GradingResults::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询评分结果失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 答题块的全部评分结果，按轮次升序
    pub async fn list_block_results_impl(&self, block_code: &str) -> Result<Vec<GradingResult>> {
        let result = GradingResults::find()
            .filter(Column::BlockCode.eq(block_code))
            .order_by_asc(Column::RoundNumber)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询评分结果失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_result()).collect())
    }

    /// 全部评分结果，按答题块、轮次排序
    pub async fn list_all_results_impl(&self) -> Result<Vec<GradingResult>> {
        let result = GradingResults::find()
            .order_by_asc(Column::BlockCode)
            .order_by_asc(Column::RoundNumber)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询评分结果失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_result()).collect())
    }

    /// 更新评语与细则分，分数不变
    pub async fn update_result_annotations_impl(
        &self,
        id: i64,
        comments: Option<String>,
        criteria_scores: Option<HashMap<String, f64>>,
    ) -> Result<Option<GradingResult>> {
        if self.get_result_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(comments) = comments {
            model.comments = Set(Some(comments));
        }

        if let Some(criteria_scores) = criteria_scores {
            model.criteria_scores = Set(Some(serde_json::to_string(&criteria_scores)?));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新评分结果失败: {e}")))?;

        self.get_result_impl(id).await
    }
}
