//! 审核（最终分数）存储操作

use super::SeaOrmStorage;
use crate::entity::final_scores::{ActiveModel, Column, Entity as FinalScores};
use crate::entity::grading_results::{Column as ResultColumn, Entity as GradingResults};
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::entities::{FinalScore, NewFinalScore};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入最终分数，并将该答题块的全部结果标记为 is_final（单事务）
    pub async fn approve_block_impl(&self, req: NewFinalScore) -> Result<FinalScore> {
        let now = chrono::Utc::now().timestamp();
        let block_code = req.block_code.clone();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            block_code: Set(req.block_code),
            final_score: Set(req.final_score),
            resolution: Set(req.resolution.to_string()),
            overridden: Set(req.overridden),
            approved_by: Set(req.approved_by),
            approved_at: Set(now),
        };

        let inserted = model.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ExamSystemError::already_approved(format!("Block {block_code} is already approved"))
            }
            _ => ExamSystemError::database_operation(format!("写入最终分数失败: {e}")),
        })?;

        GradingResults::update_many()
            .col_expr(ResultColumn::IsFinal, sea_orm::sea_query::Expr::value(true))
            .col_expr(ResultColumn::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(ResultColumn::BlockCode.eq(block_code.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新评分结果失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(inserted.into_final_score())
    }

    /// 获取答题块的最终分数
    pub async fn get_final_score_impl(&self, block_code: &str) -> Result<Option<FinalScore>> {
        let result = FinalScores::find_by_id(block_code.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询最终分数失败: {e}")))?;

        Ok(result.map(|m| m.into_final_score()))
    }

    /// 全部最终分数
    pub async fn list_final_scores_impl(&self) -> Result<Vec<FinalScore>> {
        let result = FinalScores::find()
            .order_by_asc(Column::BlockCode)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询最终分数失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_final_score()).collect())
    }
}
