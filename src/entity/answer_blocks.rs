//! 答题块实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "answer_blocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub block_code: String,
    pub subject_id: i64,
    pub exam_id: i64,
    pub question_number: i32,
    pub max_score: f64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grading_assignments::Entity")]
    GradingAssignments,
    #[sea_orm(has_many = "super::grading_results::Entity")]
    GradingResults,
    #[sea_orm(has_one = "super::final_scores::Entity")]
    FinalScore,
}

impl Related<super::grading_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradingAssignments.def()
    }
}

impl Related<super::grading_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradingResults.def()
    }
}

impl Related<super::final_scores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinalScore.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_block(self) -> crate::models::grading::entities::AnswerBlock {
        crate::models::grading::entities::AnswerBlock {
            block_code: self.block_code,
            subject_id: self.subject_id,
            exam_id: self.exam_id,
            question_number: self.question_number,
            max_score: self.max_score,
            created_at: chrono::DateTime::<chrono::Utc>::from_timestamp(self.created_at, 0)
                .unwrap_or_default(),
        }
    }
}
