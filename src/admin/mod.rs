pub mod bulk_message;
pub mod client;
pub mod config;
pub mod csv_codec;
pub mod error;
pub mod form;
pub mod grade;
pub mod listener;
pub mod page;
pub mod pagination;
pub mod resource;
pub mod selection;
pub mod student;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use client::{AdminClient, ClientConfig};
pub use error::{AdminError, FieldError, FormErrors, Result};
pub use listener::{EmptyNoticeListener, Notice, NoticeLevel, NoticeListener};
pub use page::ResourcePage;
pub use pagination::{FetchTicket, OverflowPolicy, PaginationController, PaginationState};
pub use resource::{Resource, ResourceClient, RestResource};
