//! 第三轮升级

use std::collections::HashSet;

use tracing::info;

use super::GradingEngine;
use super::selection::pick_least_loaded;
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::entities::{
    ComparisonStatus, GradingAssignment, NewAssignment, Priority,
};

impl GradingEngine {
    /// 为分差超限的答题块分配第三轮阅卷员
    ///
    /// 从具备科目资格、未参与该答题块的在职阅卷员中选择负载最低者。
    pub async fn assign_third_round(
        &self,
        block_code: &str,
        priority: Option<Priority>,
    ) -> Result<GradingAssignment> {
        let block = self.require_block(block_code).await?;

        // 选择锁在块锁之前获取，与自动分配保持同一顺序
        let _selection = self.selection.lock().await;
        let _guard = self.locks.lock(&block.block_code).await;

        let results = self.storage.list_block_results(&block.block_code).await?;
        let outcome = self.outcome_of(&results);
        if outcome.status != ComparisonStatus::NeedsThirdRound {
            return Err(ExamSystemError::not_eligible(format!(
                "Block {} is {}, only NEEDS_THIRD_ROUND blocks can be escalated",
                block.block_code, outcome.status
            )));
        }

        let existing = self.storage.list_block_assignments(&block.block_code).await?;
        if let Some(third) = existing.iter().find(|a| a.round_number == 3) {
            return Err(ExamSystemError::third_round_already_assigned(format!(
                "Block {} already has a third-round assignment (examiner {})",
                block.block_code, third.examiner_id
            )));
        }

        let on_block: HashSet<i64> = existing.iter().map(|a| a.examiner_id).collect();
        let candidates: Vec<i64> = self
            .storage
            .list_eligible_examiners(block.subject_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .filter(|id| !on_block.contains(id))
            .collect();

        let loads = self.storage.examiner_loads(&candidates).await?;
        let examiner_id = pick_least_loaded(&candidates, &loads, 1)
            .first()
            .copied()
            .ok_or_else(|| {
                ExamSystemError::no_eligible_examiner(format!(
                    "No qualified examiner outside block {} for subject {}",
                    block.block_code, block.subject_id
                ))
            })?;

        let mut created = self
            .storage
            .create_assignments(vec![NewAssignment {
                block_code: block.block_code.clone(),
                examiner_id,
                round_number: 3,
                priority: priority.unwrap_or(self.policy.third_round_priority),
            }])
            .await?;

        let assignment = created
            .pop()
            .ok_or_else(|| ExamSystemError::database_operation("Assignment was not created"))?;

        info!(
            "第三轮分配: block={} examiner={} difference={:?}",
            assignment.block_code, assignment.examiner_id, outcome.score_difference
        );
        Ok(assignment)
    }
}
