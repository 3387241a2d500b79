//! 机器人配置模块
//!
//! 配置是单个文档，只有读取和整体替换两种操作

pub mod api;
pub mod models;
pub mod page;

pub use api::{ConfigApi, ConfigClient};
pub use models::{admins_from_text, admins_to_text, BotConfig, CacheConfig, DatabaseConfig, LlmConfig};
pub use page::ConfigPage;
