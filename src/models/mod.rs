pub mod auth;
pub mod common;
pub mod grading;
pub mod users;

pub use common::{ApiResponse, PaginationInfo};

/// 业务错误码（写入响应信封的 code 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,

    // 认证
    AuthFailed = 1100,

    // 用户
    UserNotFound = 2001,
    UserAlreadyExists = 2002,
    UserNameInvalid = 2003,
    UserEmailInvalid = 2004,
    UserPasswordInvalid = 2005,
    UserCreationFailed = 2006,

    // 答题块
    BlockNotFound = 3001,
    BlockAlreadyExists = 3002,
    BlockCodeInvalid = 3003,
    BlockAlreadyApproved = 3004,

    // 阅卷分配
    AssignmentDuplicate = 3102,
    AssignmentInvalidRound = 3103,
    AssignmentCannotDelete = 3104,
    AssignmentRoundOccupied = 3105,
    ExaminerAlreadyAssigned = 3106,
    ExaminerNotQualified = 3107,
    NoEligibleExaminer = 3108,
    AssignmentInvalidTransition = 3109,

    // 评分结果
    ResultAlreadySubmitted = 3202,
    ScoreOutOfRange = 3203,
    ResultImmutable = 3204,

    // 比对、仲裁与审核
    ThirdRoundNotEligible = 3301,
    ThirdRoundAlreadyAssigned = 3302,
    BlockNotResolvable = 3303,
    ManualReviewRequired = 3304,
}
