//! 业务错误到 HTTP 响应的映射

use actix_web::{HttpResponse, http::StatusCode};
use tracing::error;

use crate::errors::{ErrorKind, ExamSystemError};
use crate::models::{ApiResponse, ErrorCode};

/// 错误对应的信封业务码
pub fn error_code_for(err: &ExamSystemError) -> ErrorCode {
    use ExamSystemError as E;

    match err {
        E::Validation(_) | E::Serialization(_) => ErrorCode::BadRequest,
        E::NotFound(_) => ErrorCode::NotFound,
        E::Authorization(_) => ErrorCode::Forbidden,
        E::Conflict(_) => ErrorCode::Conflict,
        E::InvalidRound(_) => ErrorCode::AssignmentInvalidRound,
        E::OutOfRange(_) => ErrorCode::ScoreOutOfRange,
        E::NotQualified(_) => ErrorCode::ExaminerNotQualified,
        E::ManualReviewRequired(_) => ErrorCode::ManualReviewRequired,
        E::DuplicateAssignment(_) => ErrorCode::AssignmentDuplicate,
        E::RoundOccupied(_) => ErrorCode::AssignmentRoundOccupied,
        E::ExaminerAlreadyAssigned(_) => ErrorCode::ExaminerAlreadyAssigned,
        E::AlreadySubmitted(_) => ErrorCode::ResultAlreadySubmitted,
        E::AlreadyApproved(_) => ErrorCode::BlockAlreadyApproved,
        E::ThirdRoundAlreadyAssigned(_) => ErrorCode::ThirdRoundAlreadyAssigned,
        E::CannotDeleteCompleted(_) => ErrorCode::AssignmentCannotDelete,
        E::NotEligible(_) => ErrorCode::ThirdRoundNotEligible,
        E::NotResolvable(_) => ErrorCode::BlockNotResolvable,
        E::NoEligibleExaminer(_) => ErrorCode::NoEligibleExaminer,
        E::ResultImmutable(_) => ErrorCode::ResultImmutable,
        E::InvalidTransition(_) => ErrorCode::AssignmentInvalidTransition,
        E::CacheConnection(_)
        | E::CachePluginNotFound(_)
        | E::DatabaseConfig(_)
        | E::DatabaseConnection(_)
        | E::DatabaseOperation(_) => ErrorCode::InternalServerError,
    }
}

/// 错误类别对应的 HTTP 状态码
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::State => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将业务错误转换为统一信封响应，内部错误不向调用方暴露细节
pub fn error_response(err: &ExamSystemError) -> HttpResponse {
    let status = status_for(err.kind());
    let message = if err.kind() == ErrorKind::Internal {
        error!("{}", err.format_simple());
        "Internal server error".to_string()
    } else {
        err.message().to_string()
    };

    HttpResponse::build(status).json(ApiResponse::error_empty(error_code_for(err), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            error_response(&ExamSystemError::out_of_range("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&ExamSystemError::not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&ExamSystemError::already_approved("x")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_response(&ExamSystemError::not_eligible("x")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_response(&ExamSystemError::database_operation("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code_for(&ExamSystemError::cannot_delete_completed("x")),
            ErrorCode::AssignmentCannotDelete
        );
        assert_eq!(
            error_code_for(&ExamSystemError::no_eligible_examiner("x")),
            ErrorCode::NoEligibleExaminer
        );
    }
}
