//! 评分提交与结果查询

use std::collections::HashMap;

use tracing::info;

use super::GradingEngine;
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::{
    entities::{AssignmentStatus, GradingResult, NewResult},
    requests::{SubmitResultRequest, UpdateResultRequest},
    responses::BlockResultsResponse,
};
use crate::utils::validate::validate_score;

/// 分数比较容差
const SCORE_EPSILON: f64 = 1e-9;

impl GradingEngine {
    /// 提交评分，完成对应分配
    pub async fn submit_result(
        &self,
        examiner_id: i64,
        req: SubmitResultRequest,
    ) -> Result<GradingResult> {
        let assignment = self.require_assignment(req.assignment_id).await?;
        if assignment.examiner_id != examiner_id {
            return Err(ExamSystemError::authorization(format!(
                "Assignment {} belongs to another examiner",
                assignment.id
            )));
        }

        let block = self.require_block(&assignment.block_code).await?;
        validate_score(req.score, block.max_score).map_err(ExamSystemError::out_of_range)?;
        validate_criteria(req.criteria_scores.as_ref())?;

        let _guard = self.locks.lock(&block.block_code).await;

        let assignment = self.require_assignment(req.assignment_id).await?;
        if assignment.status == AssignmentStatus::Completed
            || self
                .storage
                .get_result_by_assignment(assignment.id)
                .await?
                .is_some()
        {
            return Err(ExamSystemError::already_submitted(format!(
                "Assignment {} already has a result",
                assignment.id
            )));
        }
        self.ensure_not_approved(&block.block_code).await?;

        let result = self
            .storage
            .create_result(NewResult {
                assignment_id: assignment.id,
                block_code: assignment.block_code.clone(),
                round_number: assignment.round_number,
                examiner_id,
                score: req.score,
                comments: req.comments,
                criteria_scores: req.criteria_scores,
            })
            .await?;

        info!(
            "评分提交: block={} round={} examiner={} score={}",
            result.block_code, result.round_number, result.examiner_id, result.score
        );
        Ok(result)
    }

    /// 更新评语与细则分，分数一经提交不可修改
    pub async fn update_result(
        &self,
        examiner_id: i64,
        result_id: i64,
        req: UpdateResultRequest,
    ) -> Result<GradingResult> {
        let existing = self.require_result(result_id).await?;
        if existing.examiner_id != examiner_id {
            return Err(ExamSystemError::authorization(format!(
                "Result {result_id} belongs to another examiner"
            )));
        }

        let _guard = self.locks.lock(&existing.block_code).await;
        self.ensure_not_approved(&existing.block_code).await?;

        if let Some(score) = req.score
            && (score - existing.score).abs() > SCORE_EPSILON
        {
            return Err(ExamSystemError::result_immutable(format!(
                "Score of result {result_id} cannot be changed after submission"
            )));
        }

        validate_criteria(req.criteria_scores.as_ref())?;

        self.storage
            .update_result_annotations(result_id, req.comments, req.criteria_scores)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("Result {result_id} not found")))
    }

    /// 答题块的评分结果，按轮次升序
    pub async fn block_results(&self, block_code: &str) -> Result<BlockResultsResponse> {
        let block = self.require_block(block_code).await?;
        let items = self.storage.list_block_results(&block.block_code).await?;
        Ok(BlockResultsResponse {
            block_code: block.block_code,
            items,
        })
    }

    async fn require_result(&self, id: i64) -> Result<GradingResult> {
        self.storage
            .get_result(id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("Result {id} not found")))
    }
}

/// 细则分须为非负有限数
fn validate_criteria(criteria_scores: Option<&HashMap<String, f64>>) -> Result<()> {
    if let Some(criteria) = criteria_scores
        && criteria.values().any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err(ExamSystemError::validation(
            "criteria_scores must be non-negative numbers",
        ));
    }
    Ok(())
}
