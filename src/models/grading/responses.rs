use serde::Serialize;
use ts_rs::TS;

use super::entities::{AnswerBlock, ComparisonStatus, GradingAssignment, GradingResult};
use crate::models::PaginationInfo;

/// 答题块列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct BlockListResponse {
    pub items: Vec<AnswerBlock>,
    pub pagination: PaginationInfo,
}

/// 待分配答题块
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct PendingBlock {
    #[serde(flatten)]
    #[ts(flatten)]
    pub block: AnswerBlock,
    /// 第一、二轮已有分配数
    pub assigned_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct PendingBlocksResponse {
    pub items: Vec<PendingBlock>,
}

/// 分配列表项（附带阅卷员名称）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AssignmentItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: GradingAssignment,
    pub examiner_name: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentItem>,
    pub pagination: PaginationInfo,
}

/// 我的分配（附带答题块信息）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct MyAssignmentItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: GradingAssignment,
    pub max_score: Option<f64>,
    pub subject_id: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct MyAssignmentsResponse {
    pub items: Vec<MyAssignmentItem>,
}

/// 单个答题块的自动分配结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AutoAssignBlockResult {
    pub block_code: String,
    pub success: bool,
    pub assignments: Vec<GradingAssignment>,
    pub error_code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AutoAssignResponse {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<AutoAssignBlockResult>,
}

/// 答题块评分结果列表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct BlockResultsResponse {
    pub block_code: String,
    pub items: Vec<GradingResult>,
}

/// 比对视图中的单轮分数
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ComparisonRoundScore {
    pub round_number: i32,
    pub examiner_id: i64,
    pub examiner_name: Option<String>,
    pub score: f64,
}

/// GET /grading/compare/{blockCode}
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ComparisonResponse {
    pub block_code: String,
    pub status: ComparisonStatus,
    pub results: Vec<ComparisonRoundScore>,
    pub score_difference: Option<f64>,
    pub final_score: Option<f64>,
    pub needs_manual_review: bool,
    pub max_score: f64,
    pub tolerance: f64,
    pub message: String,
    pub approved: bool,
    pub approved_score: Option<f64>,
}
