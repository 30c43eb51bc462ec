use serde::Deserialize;
use std::collections::HashMap;
use ts_rs::TS;

use super::entities::{AssignmentStatus, Priority};

/// 创建答题块请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct CreateBlockRequest {
    pub block_code: String,
    pub subject_id: i64,
    pub exam_id: i64,
    pub question_number: i32,
    pub max_score: f64,
}

/// 答题块列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct BlockListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub subject_id: Option<i64>,
    pub exam_id: Option<i64>,
}

/// 创建单条分配请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct CreateAssignmentRequest {
    pub block_code: String,
    pub examiner_id: i64,
    pub round_number: i32,
    pub priority: Option<Priority>,
}

/// 批量自动分配请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AutoAssignRequest {
    pub block_codes: Vec<String>,
    pub examiners_per_block: Option<u32>,
    pub priority: Option<Priority>,
}

/// 分配列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AssignmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub block_code: Option<String>,
    pub examiner_id: Option<i64>,
    pub status: Option<AssignmentStatus>,
    pub round_number: Option<i32>,
}

/// 我的分配查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct MyAssignmentsQuery {
    pub status: Option<AssignmentStatus>,
}

/// 提交评分请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct SubmitResultRequest {
    pub assignment_id: i64,
    pub score: f64,
    pub comments: Option<String>,
    pub criteria_scores: Option<HashMap<String, f64>>,
}

/// 更新评分请求（分数提交后不可修改，仅可更新评语与细则分）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct UpdateResultRequest {
    pub score: Option<f64>,
    pub comments: Option<String>,
    pub criteria_scores: Option<HashMap<String, f64>>,
}

/// 第三轮分配请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AssignThirdRoundRequest {
    pub priority: Option<Priority>,
}

/// 审核请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ApproveScoreRequest {
    pub final_score: Option<f64>,
}
