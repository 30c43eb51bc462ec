//! 阅卷进度统计

use std::collections::{HashMap, HashSet};

use super::GradingEngine;
use crate::errors::Result;
use crate::models::grading::{
    entities::{AssignmentStatus, ComparisonStatus},
    stats_responses::{AssignmentStatusCounts, BlockStatusCounts, GradingStatsResponse},
};

impl GradingEngine {
    pub async fn stats(&self) -> Result<GradingStatsResponse> {
        let by_status = self.storage.count_assignments_by_status().await?;
        let count = |status: AssignmentStatus| by_status.get(&status).copied().unwrap_or(0) as i64;
        let assignments = AssignmentStatusCounts {
            assigned: count(AssignmentStatus::Assigned),
            in_progress: count(AssignmentStatus::InProgress),
            completed: count(AssignmentStatus::Completed),
            overdue: count(AssignmentStatus::Overdue),
            total: by_status.values().sum::<u64>() as i64,
        };

        let results = self.storage.list_all_results().await?;
        let total_results = results.len() as i64;

        // 结果已按答题块、轮次排序
        let mut scores_by_block: HashMap<&str, Vec<f64>> = HashMap::new();
        for result in &results {
            scores_by_block
                .entry(result.block_code.as_str())
                .or_default()
                .push(result.score);
        }

        let approved: HashSet<String> = self
            .storage
            .list_final_scores()
            .await?
            .into_iter()
            .map(|f| f.block_code)
            .collect();

        let mut blocks = BlockStatusCounts {
            total: self.storage.count_blocks().await? as i64,
            approved: approved.len() as i64,
            ..Default::default()
        };

        for (block_code, scores) in &scores_by_block {
            let outcome = super::compare(scores, &self.policy);
            match outcome.status {
                ComparisonStatus::Pending => {}
                ComparisonStatus::Matched => blocks.matched += 1,
                ComparisonStatus::NeedsThirdRound => blocks.needs_third_round += 1,
                ComparisonStatus::ResolvedByThird => blocks.resolved_by_third += 1,
            }
            if outcome.needs_manual_review && !approved.contains(*block_code) {
                blocks.manual_review += 1;
            }
        }
        blocks.pending =
            blocks.total - blocks.matched - blocks.needs_third_round - blocks.resolved_by_third;

        Ok(GradingStatsResponse {
            assignments,
            total_results,
            blocks,
            generated_at: chrono::Utc::now(),
        })
    }
}
