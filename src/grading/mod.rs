//! 阅卷流程引擎
//!
//! 负责分配、评分提交、分差比对、第三轮升级与最终审核。
//! 同一答题块上的写操作通过 [`BlockLocks`] 串行化；
//! 依赖阅卷员负载的选择（自动分配、第三轮分配）通过全局选择锁串行化。

pub mod comparator;
pub mod locks;
pub mod selection;

mod approval;
mod assignment;
mod escalation;
mod result;
mod stats;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{AppConfig, GradingConfig};
use crate::errors::{ExamSystemError, Result};
use crate::models::grading::entities::{AnswerBlock, ComparisonOutcome, GradingResult, Priority};
use crate::storage::Storage;
use crate::utils::validate::validate_block_code;

pub use comparator::{compare, round2};
pub use locks::BlockLocks;

/// 阅卷策略参数
#[derive(Debug, Clone)]
pub struct GradingPolicy {
    /// 两轮分差允许的最大值
    pub tolerance: f64,
    pub default_examiners_per_block: u32,
    pub third_round_priority: Priority,
    /// 0 表示不做逾期标记
    pub assignment_due_hours: i64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            default_examiners_per_block: 2,
            third_round_priority: Priority::High,
            assignment_due_hours: 72,
        }
    }
}

impl GradingPolicy {
    /// 由配置构建策略，非法取值直接报错
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::from_grading(&config.grading)
    }

    fn from_grading(grading: &GradingConfig) -> Result<Self> {
        if !grading.tolerance.is_finite() || grading.tolerance < 0.0 {
            return Err(ExamSystemError::validation(format!(
                "grading.tolerance must be a non-negative number, got {}",
                grading.tolerance
            )));
        }
        if !(1..=2).contains(&grading.default_examiners_per_block) {
            return Err(ExamSystemError::validation(format!(
                "grading.default_examiners_per_block must be 1 or 2, got {}",
                grading.default_examiners_per_block
            )));
        }
        let third_round_priority = grading.third_round_priority.parse().map_err(|e| {
            ExamSystemError::validation(format!("grading.third_round_priority: {e}"))
        })?;

        Ok(Self {
            tolerance: grading.tolerance,
            default_examiners_per_block: grading.default_examiners_per_block,
            third_round_priority,
            assignment_due_hours: grading.assignment_due_hours,
        })
    }
}

/// 阅卷流程引擎
pub struct GradingEngine {
    storage: Arc<dyn Storage>,
    policy: GradingPolicy,
    locks: BlockLocks,
    selection: Mutex<()>,
}

impl GradingEngine {
    pub fn new(storage: Arc<dyn Storage>, policy: GradingPolicy) -> Self {
        Self {
            storage,
            policy,
            locks: BlockLocks::new(),
            selection: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &GradingPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// 获取答题块，不存在时返回 NotFound
    async fn require_block(&self, block_code: &str) -> Result<AnswerBlock> {
        validate_block_code(block_code)
            .map_err(|msg| ExamSystemError::validation(format!("{msg}: {block_code}")))?;
        self.storage
            .get_block(block_code)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("Answer block {block_code} not found")))
    }

    /// 已审核的答题块拒绝任何修改
    async fn ensure_not_approved(&self, block_code: &str) -> Result<()> {
        if self.storage.get_final_score(block_code).await?.is_some() {
            return Err(ExamSystemError::already_approved(format!(
                "Block {block_code} is already approved"
            )));
        }
        Ok(())
    }

    /// 当前比对结果（只读，不加锁）
    pub async fn outcome(
        &self,
        block_code: &str,
    ) -> Result<(AnswerBlock, Vec<GradingResult>, ComparisonOutcome)> {
        let block = self.require_block(block_code).await?;
        let results = self.storage.list_block_results(block_code).await?;
        let outcome = self.outcome_of(&results);
        Ok((block, results, outcome))
    }

    fn outcome_of(&self, results: &[GradingResult]) -> ComparisonOutcome {
        let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
        compare(&scores, &self.policy)
    }

    /// 标记逾期分配并回收空闲锁
    pub async fn sweep_overdue(&self) -> Result<u64> {
        let pruned = self.locks.prune();
        if self.policy.assignment_due_hours <= 0 {
            return Ok(0);
        }

        let cutoff = chrono::Utc::now().timestamp() - self.policy.assignment_due_hours * 3600;
        let marked = self.storage.mark_overdue_assignments(cutoff).await?;
        if marked > 0 || pruned > 0 {
            tracing::info!("逾期扫描: 标记 {} 条逾期分配, 回收 {} 个空闲锁", marked, pruned);
        }
        Ok(marked)
    }
}
