//! 最终分数实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "final_scores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub block_code: String,
    pub final_score: f64,
    pub resolution: String,
    pub overridden: bool,
    pub approved_by: i64,
    pub approved_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::answer_blocks::Entity",
        from = "Column::BlockCode",
        to = "super::answer_blocks::Column::BlockCode"
    )]
    Block,
}

impl Related<super::answer_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_final_score(self) -> crate::models::grading::entities::FinalScore {
        use crate::models::grading::entities::{ComparisonStatus, FinalScore};

        FinalScore {
            block_code: self.block_code,
            final_score: self.final_score,
            resolution: self
                .resolution
                .parse()
                .unwrap_or(ComparisonStatus::Matched),
            overridden: self.overridden,
            approved_by: self.approved_by,
            approved_at: chrono::DateTime::<chrono::Utc>::from_timestamp(self.approved_at, 0)
                .unwrap_or_default(),
        }
    }
}
