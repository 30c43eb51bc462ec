pub mod auth;
pub mod grading;
pub mod users;

pub use auth::AuthService;
pub use grading::GradingService;
pub use users::UserService;
