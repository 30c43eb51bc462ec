//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称和错误类别。
//! 错误类别决定返回给调用方的 HTTP 状态码。

use std::fmt;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 参数或数据不合法
    Validation,
    /// 资源不存在
    NotFound,
    /// 与已有数据冲突（重复分配、重复提交、重复审核）
    Conflict,
    /// 当前比对状态不允许该操作
    State,
    /// 无权操作
    Forbidden,
    /// 基础设施错误
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Conflict => "ConflictError",
            ErrorKind::State => "StateError",
            ErrorKind::Forbidden => "ForbiddenError",
            ErrorKind::Internal => "InternalError",
        }
    }
}

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - kind() 方法 - 返回错误类别
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_exam_system_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $kind:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum ExamSystemError {
            $($variant(String),)*
        }

        impl ExamSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ExamSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ExamSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误类别
            pub fn kind(&self) -> ErrorKind {
                match self {
                    $(ExamSystemError::$variant(_) => ErrorKind::$kind,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ExamSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ExamSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ExamSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_exam_system_errors! {
    CacheConnection("E001", "Cache Connection Error", Internal),
    CachePluginNotFound("E002", "Cache Plugin Not Found", Internal),
    DatabaseConfig("E003", "Database Configuration Error", Internal),
    DatabaseConnection("E004", "Database Connection Error", Internal),
    DatabaseOperation("E005", "Database Operation Error", Internal),
    Validation("E007", "Validation Error", Validation),
    NotFound("E008", "Resource Not Found", NotFound),
    Serialization("E009", "Serialization Error", Internal),
    Authorization("E013", "Authorization Error", Forbidden),
    Conflict("E014", "Conflict", Conflict),
    // 阅卷流程
    InvalidRound("E100", "Invalid Round", Validation),
    OutOfRange("E101", "Score Out Of Range", Validation),
    NotQualified("E102", "Examiner Not Qualified", Validation),
    ManualReviewRequired("E103", "Manual Review Required", Validation),
    DuplicateAssignment("E110", "Duplicate Assignment", Conflict),
    RoundOccupied("E111", "Round Already Assigned", Conflict),
    ExaminerAlreadyAssigned("E112", "Examiner Already Assigned", Conflict),
    AlreadySubmitted("E113", "Result Already Submitted", Conflict),
    AlreadyApproved("E114", "Block Already Approved", Conflict),
    ThirdRoundAlreadyAssigned("E115", "Third Round Already Assigned", Conflict),
    CannotDeleteCompleted("E120", "Cannot Delete Completed Assignment", State),
    NotEligible("E121", "Not Eligible For Third Round", State),
    NotResolvable("E122", "Block Not Resolvable", State),
    NoEligibleExaminer("E123", "No Eligible Examiner", State),
    ResultImmutable("E124", "Result Score Immutable", State),
    InvalidTransition("E125", "Invalid Assignment Transition", State),
}

impl ExamSystemError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ExamSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ExamSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ExamSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        // 唯一约束冲突视为业务冲突，其余均为数据库错误
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                ExamSystemError::Conflict(detail)
            }
            _ => ExamSystemError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExamSystemError {
    fn from(err: serde_json::Error) -> Self {
        ExamSystemError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExamSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExamSystemError::cache_connection("test").code(), "E001");
        assert_eq!(ExamSystemError::validation("test").code(), "E007");
        assert_eq!(ExamSystemError::out_of_range("test").code(), "E101");
        assert_eq!(ExamSystemError::already_approved("test").code(), "E114");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ExamSystemError::out_of_range("x").kind(),
            ErrorKind::Validation
        );
        assert_eq!(ExamSystemError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            ExamSystemError::duplicate_assignment("x").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ExamSystemError::already_submitted("x").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(ExamSystemError::not_eligible("x").kind(), ErrorKind::State);
        assert_eq!(
            ExamSystemError::not_resolvable("x").kind(),
            ErrorKind::State
        );
        assert_eq!(
            ExamSystemError::database_operation("x").kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ExamSystemError::cannot_delete_completed("test").error_type(),
            "Cannot Delete Completed Assignment"
        );
        assert_eq!(ExamSystemError::validation("test").kind().as_str(), "ValidationError");
    }

    #[test]
    fn test_format_simple() {
        let err = ExamSystemError::out_of_range("score 10.01 exceeds max 10");
        let formatted = err.format_simple();
        assert!(formatted.contains("Score Out Of Range"));
        assert!(formatted.contains("10.01"));
    }
}
