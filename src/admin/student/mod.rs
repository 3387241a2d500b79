//! 学生模块
//!
//! 学生的增删改查、CSV 导入导出和群发消息接口

pub mod api;
pub mod models;
pub mod page;
pub mod types;

// 重新导出主要类型
pub use api::{StudentApi, StudentClient};
pub use models::{Student, StudentDraft, StudentForm, StudentPatch, Students};
pub use page::StudentPage;
pub use types::{BulkMessageResult, ImportRecord, ImportResult};
