pub mod auth;

pub mod users;

pub mod grading;

pub use auth::configure_auth_routes;
pub use grading::configure_grading_routes;
pub use users::configure_user_routes;

#[cfg(test)]
mod tests;
