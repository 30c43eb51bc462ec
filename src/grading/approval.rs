//! 比对视图与最终审核

use std::collections::HashMap;

use tracing::info;

use super::GradingEngine;
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::{
    entities::{ComparisonOutcome, ComparisonStatus, FinalScore, NewFinalScore},
    responses::{ComparisonResponse, ComparisonRoundScore},
};
use crate::utils::validate::validate_score;

const SCORE_EPSILON: f64 = 1e-9;

impl GradingEngine {
    /// GET /grading/compare/{blockCode}
    pub async fn comparison(&self, block_code: &str) -> Result<ComparisonResponse> {
        let (block, results, outcome) = self.outcome(block_code).await?;
        let approval = self.storage.get_final_score(&block.block_code).await?;

        let examiner_ids: Vec<i64> = results.iter().map(|r| r.examiner_id).collect();
        let names: HashMap<i64, String> = self
            .storage
            .get_users_by_ids(&examiner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name().to_string()))
            .collect();

        let rounds = results
            .iter()
            .map(|r| ComparisonRoundScore {
                round_number: r.round_number,
                examiner_id: r.examiner_id,
                examiner_name: names.get(&r.examiner_id).cloned(),
                score: r.score,
            })
            .collect();

        Ok(ComparisonResponse {
            block_code: block.block_code,
            status: outcome.status,
            results: rounds,
            score_difference: outcome.score_difference,
            final_score: outcome.final_score,
            needs_manual_review: outcome.needs_manual_review,
            max_score: block.max_score,
            tolerance: self.policy.tolerance,
            message: self.describe(&outcome, results.len()),
            approved: approval.is_some(),
            approved_score: approval.map(|a| a.final_score),
        })
    }

    fn describe(&self, outcome: &ComparisonOutcome, result_count: usize) -> String {
        match outcome.status {
            ComparisonStatus::Pending => format!(
                "Waiting for {} more result(s) before comparison",
                2usize.saturating_sub(result_count)
            ),
            ComparisonStatus::Matched => format!(
                "Score difference {} is within tolerance {}",
                outcome.score_difference.unwrap_or_default(),
                self.policy.tolerance
            ),
            ComparisonStatus::NeedsThirdRound => format!(
                "Score difference {} exceeds tolerance {}, a third round is required",
                outcome.score_difference.unwrap_or_default(),
                self.policy.tolerance
            ),
            ComparisonStatus::ResolvedByThird if outcome.needs_manual_review => {
                "Resolved by third round, all scores disagree beyond tolerance and need manual review"
                    .to_string()
            }
            ComparisonStatus::ResolvedByThird => {
                "Resolved by third round using the closest pair of scores".to_string()
            }
        }
    }

    /// 审核答题块的最终分数
    ///
    /// `final_score` 为空时采用比对得出的分数；需要人工复核的答题块必须显式给出分数。
    pub async fn approve_score(
        &self,
        block_code: &str,
        approver_id: i64,
        final_score: Option<f64>,
    ) -> Result<FinalScore> {
        let block = self.require_block(block_code).await?;
        let _guard = self.locks.lock(&block.block_code).await;

        self.ensure_not_approved(&block.block_code).await?;

        let results = self.storage.list_block_results(&block.block_code).await?;
        let outcome = self.outcome_of(&results);
        if !outcome.status.is_resolvable() {
            return Err(ExamSystemError::not_resolvable(format!(
                "Block {} is {}, only MATCHED or RESOLVED_BY_THIRD blocks can be approved",
                block.block_code, outcome.status
            )));
        }

        let computed = outcome.final_score.ok_or_else(|| {
            ExamSystemError::not_resolvable(format!(
                "Block {} has no computed score",
                block.block_code
            ))
        })?;

        let (score, overridden) = match final_score {
            Some(score) => {
                validate_score(score, block.max_score).map_err(ExamSystemError::out_of_range)?;
                (score, (score - computed).abs() > SCORE_EPSILON)
            }
            None if outcome.needs_manual_review => {
                return Err(ExamSystemError::manual_review_required(format!(
                    "Block {} needs manual review, an explicit final_score is required",
                    block.block_code
                )));
            }
            None => (computed, false),
        };

        let approval = self
            .storage
            .approve_block(NewFinalScore {
                block_code: block.block_code.clone(),
                final_score: score,
                resolution: outcome.status,
                overridden,
                approved_by: approver_id,
            })
            .await?;

        info!(
            "最终分数审核: block={} score={} resolution={} overridden={} by={}",
            approval.block_code,
            approval.final_score,
            approval.resolution,
            approval.overridden,
            approver_id
        );
        Ok(approval)
    }
}
