pub mod pagination;
pub mod response;

pub use pagination::{PaginationInfo, page_and_size};
pub use response::ApiResponse;
