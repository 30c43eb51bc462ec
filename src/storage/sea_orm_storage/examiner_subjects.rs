//! 阅卷员科目资格存储操作

use super::SeaOrmStorage;
use crate::entity::examiner_subjects::{ActiveModel, Column, Entity as ExaminerSubjects};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{ExamSystemError, Result};
use crate::models::users::entities::{ExaminerSubject, User, UserRole, UserStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 添加科目资格
    pub async fn add_examiner_subject_impl(
        &self,
        examiner_id: i64,
        subject_id: i64,
    ) -> Result<ExaminerSubject> {
        let model = ActiveModel {
            examiner_id: Set(examiner_id),
            subject_id: Set(subject_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await?;

        Ok(result.into_examiner_subject())
    }

    /// 列出阅卷员的科目资格
    pub async fn list_examiner_subjects_impl(
        &self,
        examiner_id: i64,
    ) -> Result<Vec<ExaminerSubject>> {
        let result = ExaminerSubjects::find()
            .filter(Column::ExaminerId.eq(examiner_id))
            .order_by_asc(Column::SubjectId)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询科目资格失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_examiner_subject())
            .collect())
    }

    /// 移除科目资格
    pub async fn remove_examiner_subject_impl(
        &self,
        examiner_id: i64,
        subject_id: i64,
    ) -> Result<bool> {
        let result = ExaminerSubjects::delete_many()
            .filter(
                Condition::all()
                    .add(Column::ExaminerId.eq(examiner_id))
                    .add(Column::SubjectId.eq(subject_id)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("移除科目资格失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 阅卷员是否具备该科目资格
    pub async fn is_examiner_qualified_impl(&self, examiner_id: i64, subject_id: i64) -> Result<bool> {
        let count = ExaminerSubjects::find()
            .filter(Column::ExaminerId.eq(examiner_id))
            .filter(Column::SubjectId.eq(subject_id))
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询科目资格失败: {e}")))?;

        Ok(count > 0)
    }

    /// 某科目下所有在职阅卷员
    pub async fn list_eligible_examiners_impl(&self, subject_id: i64) -> Result<Vec<User>> {
        let result = Users::find()
            .inner_join(ExaminerSubjects)
            .filter(Column::SubjectId.eq(subject_id))
            .filter(UserColumn::Role.eq(UserRole::EXAMINER))
            .filter(UserColumn::Status.eq(UserStatus::Active.to_string()))
            .order_by_asc(UserColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询可用阅卷员失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }
}
