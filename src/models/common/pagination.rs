use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// 最大每页条数
pub const MAX_PAGE_SIZE: i64 = 100;

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// 规范化分页参数，返回 (page, size)，page 从 1 开始
pub fn page_and_size(page: Option<i64>, size: Option<i64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1) as u64;
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as u64;
    (page, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_and_size() {
        assert_eq!(page_and_size(None, None), (1, 20));
        assert_eq!(page_and_size(Some(0), Some(1000)), (1, 100));
        assert_eq!(page_and_size(Some(3), Some(0)), (3, 1));
    }
}
