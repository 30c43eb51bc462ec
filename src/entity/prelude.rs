//! 预导入模块，方便使用

pub use super::answer_blocks::{
    ActiveModel as AnswerBlockActiveModel, Entity as AnswerBlocks, Model as AnswerBlockModel,
};
pub use super::examiner_subjects::{
    ActiveModel as ExaminerSubjectActiveModel, Entity as ExaminerSubjects,
    Model as ExaminerSubjectModel,
};
pub use super::final_scores::{
    ActiveModel as FinalScoreActiveModel, Entity as FinalScores, Model as FinalScoreModel,
};
pub use super::grading_assignments::{
    ActiveModel as GradingAssignmentActiveModel, Entity as GradingAssignments,
    Model as GradingAssignmentModel,
};
pub use super::grading_results::{
    ActiveModel as GradingResultActiveModel, Entity as GradingResults,
    Model as GradingResultModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
