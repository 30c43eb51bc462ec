//! 阅卷员科目资格实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "examiner_subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub examiner_id: i64,
    pub subject_id: i64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ExaminerId",
        to = "super::users::Column::Id"
    )]
    Examiner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Examiner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_examiner_subject(self) -> crate::models::users::entities::ExaminerSubject {
        crate::models::users::entities::ExaminerSubject {
            examiner_id: self.examiner_id,
            subject_id: self.subject_id,
            created_at: chrono::DateTime::<chrono::Utc>::from_timestamp(self.created_at, 0)
                .unwrap_or_default(),
        }
    }
}
