use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建答题块表
        manager
            .create_table(
                Table::create()
                    .table(AnswerBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnswerBlocks::BlockCode)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnswerBlocks::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnswerBlocks::ExamId).big_integer().not_null())
                    .col(
                        ColumnDef::new(AnswerBlocks::QuestionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnswerBlocks::MaxScore).double().not_null())
                    .col(
                        ColumnDef::new(AnswerBlocks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建阅卷分配表
        manager
            .create_table(
                Table::create()
                    .table(GradingAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradingAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradingAssignments::BlockCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingAssignments::ExaminerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingAssignments::RoundNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingAssignments::Priority).string().not_null())
                    .col(ColumnDef::new(GradingAssignments::Status).string().not_null())
                    .col(
                        ColumnDef::new(GradingAssignments::AssignedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingAssignments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingAssignments::Table, GradingAssignments::BlockCode)
                            .to(AnswerBlocks::Table, AnswerBlocks::BlockCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingAssignments::Table, GradingAssignments::ExaminerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分结果表
        manager
            .create_table(
                Table::create()
                    .table(GradingResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradingResults::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::AssignmentId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::BlockCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::RoundNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::ExaminerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingResults::Score).double().not_null())
                    .col(ColumnDef::new(GradingResults::Comments).text().null())
                    .col(ColumnDef::new(GradingResults::CriteriaScores).text().null())
                    .col(
                        ColumnDef::new(GradingResults::IsFinal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GradingResults::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingResults::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingResults::Table, GradingResults::AssignmentId)
                            .to(GradingAssignments::Table, GradingAssignments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingResults::Table, GradingResults::BlockCode)
                            .to(AnswerBlocks::Table, AnswerBlocks::BlockCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建最终分数表（存在即表示已审核通过）
        manager
            .create_table(
                Table::create()
                    .table(FinalScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinalScores::BlockCode)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinalScores::FinalScore).double().not_null())
                    .col(ColumnDef::new(FinalScores::Resolution).string().not_null())
                    .col(
                        ColumnDef::new(FinalScores::Overridden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FinalScores::ApprovedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinalScores::ApprovedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FinalScores::Table, FinalScores::BlockCode)
                            .to(AnswerBlocks::Table, AnswerBlocks::BlockCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_answer_blocks_subject_id")
                    .table(AnswerBlocks::Table)
                    .col(AnswerBlocks::SubjectId)
                    .to_owned(),
            )
            .await?;

        // 同一答题块同一轮次同一阅卷员只能有一条分配
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_assignments_unique")
                    .table(GradingAssignments::Table)
                    .col(GradingAssignments::BlockCode)
                    .col(GradingAssignments::RoundNumber)
                    .col(GradingAssignments::ExaminerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每个轮次只有一名阅卷员
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_assignments_block_round")
                    .table(GradingAssignments::Table)
                    .col(GradingAssignments::BlockCode)
                    .col(GradingAssignments::RoundNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 阅卷员在同一答题块上只承担一个轮次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_assignments_block_examiner")
                    .table(GradingAssignments::Table)
                    .col(GradingAssignments::BlockCode)
                    .col(GradingAssignments::ExaminerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_assignments_examiner_status")
                    .table(GradingAssignments::Table)
                    .col(GradingAssignments::ExaminerId)
                    .col(GradingAssignments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_results_block_round")
                    .table(GradingResults::Table)
                    .col(GradingResults::BlockCode)
                    .col(GradingResults::RoundNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinalScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradingResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradingAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnswerBlocks::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AnswerBlocks {
    #[sea_orm(iden = "answer_blocks")]
    Table,
    BlockCode,
    SubjectId,
    ExamId,
    QuestionNumber,
    MaxScore,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GradingAssignments {
    #[sea_orm(iden = "grading_assignments")]
    Table,
    Id,
    BlockCode,
    ExaminerId,
    RoundNumber,
    Priority,
    Status,
    AssignedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradingResults {
    #[sea_orm(iden = "grading_results")]
    Table,
    Id,
    AssignmentId,
    BlockCode,
    RoundNumber,
    ExaminerId,
    Score,
    Comments,
    CriteriaScores,
    IsFinal,
    SubmittedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FinalScores {
    #[sea_orm(iden = "final_scores")]
    Table,
    BlockCode,
    FinalScore,
    Resolution,
    Overridden,
    ApprovedBy,
    ApprovedAt,
}
