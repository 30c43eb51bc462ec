//! 评分结果实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub assignment_id: i64,
    pub block_code: String,
    pub round_number: i32,
    pub examiner_id: i64,
    pub score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,
    /// JSON 对象：细则名称 -> 分数
    #[sea_orm(column_type = "Text", nullable)]
    pub criteria_scores: Option<String>,
    pub is_final: bool,
    pub submitted_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grading_assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::grading_assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::answer_blocks::Entity",
        from = "Column::BlockCode",
        to = "super::answer_blocks::Column::BlockCode"
    )]
    Block,
}

impl Related<super::grading_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::answer_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_result(self) -> crate::models::grading::entities::GradingResult {
        use chrono::{DateTime, Utc};

        crate::models::grading::entities::GradingResult {
            id: self.id,
            assignment_id: self.assignment_id,
            block_code: self.block_code,
            round_number: self.round_number,
            examiner_id: self.examiner_id,
            score: self.score,
            comments: self.comments,
            criteria_scores: self
                .criteria_scores
                .and_then(|json| serde_json::from_str(&json).ok()),
            is_final: self.is_final,
            submitted_at: DateTime::<Utc>::from_timestamp(self.submitted_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
