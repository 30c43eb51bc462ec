pub mod error_response;
pub mod extractor;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod sql;
pub mod validate;

pub use error_response::{error_code_for, error_response};
pub use extractor::{SafeBlockCode, SafeIDI64, SafeSubjectIdI64};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
