use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

/// 为 SCREAMING_SNAKE_CASE 枚举生成 Display / FromStr / Deserialize
macro_rules! impl_screaming_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $text:literal),* $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)*
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Ok($ty::$variant),)*
                    _ => Err(format!(
                        "无效的{}: '{s}'. 支持: {}",
                        $label,
                        [$($text),*].join(", ")
                    )),
                }
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// 分配优先级
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl_screaming_enum!(Priority, "优先级", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});

impl Priority {
    /// 排序权重，越大越先处理
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

/// 分配状态：ASSIGNED -> IN_PROGRESS -> COMPLETED，或 OVERDUE
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
    Overdue,
}

impl_screaming_enum!(AssignmentStatus, "分配状态", {
    Assigned => "ASSIGNED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Overdue => "OVERDUE",
});

impl AssignmentStatus {
    /// 计入阅卷员负载的状态
    pub fn open_statuses() -> [AssignmentStatus; 3] {
        [
            AssignmentStatus::Assigned,
            AssignmentStatus::InProgress,
            AssignmentStatus::Overdue,
        ]
    }
}

/// 比对状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum ComparisonStatus {
    Pending,
    Matched,
    NeedsThirdRound,
    ResolvedByThird,
}

impl_screaming_enum!(ComparisonStatus, "比对状态", {
    Pending => "PENDING",
    Matched => "MATCHED",
    NeedsThirdRound => "NEEDS_THIRD_ROUND",
    ResolvedByThird => "RESOLVED_BY_THIRD",
});

impl ComparisonStatus {
    /// 是否可以审核
    pub fn is_resolvable(&self) -> bool {
        matches!(
            self,
            ComparisonStatus::Matched | ComparisonStatus::ResolvedByThird
        )
    }
}

/// 答题块
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct AnswerBlock {
    pub block_code: String,
    pub subject_id: i64,
    pub exam_id: i64,
    pub question_number: i32,
    pub max_score: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 阅卷分配：一个阅卷员在某一轮负责某个答题块
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingAssignment {
    pub id: i64,
    pub block_code: String,
    pub examiner_id: i64,
    pub round_number: i32,
    pub priority: Priority,
    pub status: AssignmentStatus,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 评分结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingResult {
    pub id: i64,
    pub assignment_id: i64,
    pub block_code: String,
    pub round_number: i32,
    pub examiner_id: i64,
    pub score: f64,
    pub comments: Option<String>,
    pub criteria_scores: Option<HashMap<String, f64>>,
    pub is_final: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 审核通过后的最终分数
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct FinalScore {
    pub block_code: String,
    pub final_score: f64,
    /// 审核时的比对状态
    pub resolution: ComparisonStatus,
    /// 管理员给出的分数与计算结果不同
    pub overridden: bool,
    pub approved_by: i64,
    pub approved_at: chrono::DateTime<chrono::Utc>,
}

/// 比对结果（按需计算，不落库）
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct ComparisonOutcome {
    pub status: ComparisonStatus,
    pub score_difference: Option<f64>,
    pub final_score: Option<f64>,
    /// 三个分数两两超出容差，需要人工复核
    pub needs_manual_review: bool,
}

// 以下为存储层内部使用的写入参数

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub block_code: String,
    pub examiner_id: i64,
    pub round_number: i32,
    pub priority: Priority,
}

#[derive(Debug, Clone)]
pub struct NewResult {
    pub assignment_id: i64,
    pub block_code: String,
    pub round_number: i32,
    pub examiner_id: i64,
    pub score: f64,
    pub comments: Option<String>,
    pub criteria_scores: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone)]
pub struct NewFinalScore {
    pub block_code: String,
    pub final_score: f64,
    pub resolution: ComparisonStatus,
    pub overridden: bool,
    pub approved_by: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(AssignmentStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(
            "needs_third_round".parse::<ComparisonStatus>(),
            Ok(ComparisonStatus::NeedsThirdRound)
        );
        assert_eq!(
            serde_json::to_string(&ComparisonStatus::ResolvedByThird).unwrap(),
            "\"RESOLVED_BY_THIRD\""
        );
    }

    #[test]
    fn test_priority_deserialize() {
        let p: Priority = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(p, Priority::High);
        let err = serde_json::from_str::<Priority>("\"URGENT\"").unwrap_err();
        assert!(err.to_string().contains("LOW, MEDIUM, HIGH"));
    }

    #[test]
    fn test_resolvable() {
        assert!(ComparisonStatus::Matched.is_resolvable());
        assert!(ComparisonStatus::ResolvedByThird.is_resolvable());
        assert!(!ComparisonStatus::Pending.is_resolvable());
        assert!(!ComparisonStatus::NeedsThirdRound.is_resolvable());
    }
}
