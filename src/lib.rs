pub mod admin;

// 重新导出常用类型，方便外部使用
pub use admin::{
    client::{AdminClient, ClientConfig},
    config::{BotConfig, ConfigPage},
    error::{AdminError, Result},
    grade::{Grade, GradePage},
    listener::{Notice, NoticeListener},
    student::{Student, StudentPage},
};
