use serde::Serialize;
use ts_rs::TS;

/// 分配状态计数
#[derive(Debug, Default, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AssignmentStatusCounts {
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
    pub total: i64,
}

/// 答题块比对状态计数
#[derive(Debug, Default, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct BlockStatusCounts {
    pub total: i64,
    pub pending: i64,
    pub matched: i64,
    pub needs_third_round: i64,
    pub resolved_by_third: i64,
    pub approved: i64,
    pub manual_review: i64,
}

/// GET /grading/stats
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingStatsResponse {
    pub assignments: AssignmentStatusCounts,
    pub total_results: i64,
    pub blocks: BlockStatusCounts,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
