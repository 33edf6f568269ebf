//! Shared response and query types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use response::{Notice, NoticeLevel, Page};
