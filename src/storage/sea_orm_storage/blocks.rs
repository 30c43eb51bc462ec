//! 答题块存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::answer_blocks::{ActiveModel, Column, Entity as AnswerBlocks};
use crate::entity::grading_assignments::{
    Column as AssignmentColumn, Entity as GradingAssignments,
};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationInfo,
    common::page_and_size,
    grading::{
        entities::AnswerBlock,
        requests::{BlockListQuery, CreateBlockRequest},
        responses::{BlockListResponse, PendingBlock},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建答题块
    pub async fn create_block_impl(&self, req: CreateBlockRequest) -> Result<AnswerBlock> {
        let model = ActiveModel {
            block_code: Set(req.block_code),
            subject_id: Set(req.subject_id),
            exam_id: Set(req.exam_id),
            question_number: Set(req.question_number),
            max_score: Set(req.max_score),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model.insert(&self.db).await?;

        Ok(result.into_block())
    }

    /// 通过编码获取答题块
    pub async fn get_block_impl(&self, block_code: &str) -> Result<Option<AnswerBlock>> {
        let result = AnswerBlocks::find_by_id(block_code.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答题块失败: {e}")))?;

        Ok(result.map(|m| m.into_block()))
    }

    /// 分页列出答题块
    pub async fn list_blocks_with_pagination_impl(
        &self,
        query: BlockListQuery,
    ) -> Result<BlockListResponse> {
        let (page, size) = page_and_size(query.page, query.size);

        let mut select = AnswerBlocks::find();

        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        if let Some(exam_id) = query.exam_id {
            select = select.filter(Column::ExamId.eq(exam_id));
        }

        select = select.order_by_asc(Column::BlockCode);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答题块总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答题块页数失败: {e}")))?;

        let blocks = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答题块列表失败: {e}")))?;

        Ok(BlockListResponse {
            items: blocks.into_iter().map(|m| m.into_block()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 第一、二轮分配不足两份的答题块
    pub async fn list_pending_blocks_impl(&self) -> Result<Vec<PendingBlock>> {
        let counts: Vec<(String, i64)> = GradingAssignments::find()
            .select_only()
            .column(AssignmentColumn::BlockCode)
            .column_as(AssignmentColumn::Id.count(), "assigned_count")
            .filter(AssignmentColumn::RoundNumber.lte(2))
            .group_by(AssignmentColumn::BlockCode)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("统计答题块分配失败: {e}")))?;

        let counts: HashMap<String, i64> = counts.into_iter().collect();

        let blocks = AnswerBlocks::find()
            .order_by_asc(Column::BlockCode)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答题块失败: {e}")))?;

        Ok(blocks
            .into_iter()
            .filter_map(|m| {
                let assigned_count = counts.get(&m.block_code).copied().unwrap_or(0);
                (assigned_count < 2).then(|| PendingBlock {
                    block: m.into_block(),
                    assigned_count,
                })
            })
            .collect())
    }

    /// 统计答题块数量
    pub async fn count_blocks_impl(&self) -> Result<u64> {
        let count = AnswerBlocks::find()
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("统计答题块数量失败: {e}")))?;

        Ok(count)
    }
}
