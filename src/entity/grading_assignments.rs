//! 阅卷分配实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub block_code: String,
    pub examiner_id: i64,
    pub round_number: i32,
    pub priority: String,
    pub status: String,
    pub assigned_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::answer_blocks::Entity",
        from = "Column::BlockCode",
        to = "super::answer_blocks::Column::BlockCode"
    )]
    Block,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ExaminerId",
        to = "super::users::Column::Id"
    )]
    Examiner,
    #[sea_orm(has_one = "super::grading_results::Entity")]
    Result,
}

impl Related<super::answer_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Examiner.def()
    }
}

impl Related<super::grading_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Result.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assignment(self) -> crate::models::grading::entities::GradingAssignment {
        use crate::models::grading::entities::{AssignmentStatus, GradingAssignment, Priority};
        use chrono::{DateTime, Utc};

        GradingAssignment {
            id: self.id,
            block_code: self.block_code,
            examiner_id: self.examiner_id,
            round_number: self.round_number,
            priority: self.priority.parse().unwrap_or(Priority::Medium),
            status: self.status.parse().unwrap_or(AssignmentStatus::Assigned),
            assigned_at: DateTime::<Utc>::from_timestamp(self.assigned_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
