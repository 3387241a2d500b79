//! 操作结果提示回调接口

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// 一条一次性的用户提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// 页面提示监听器（由界面层实现，负责展示提示）
#[async_trait]
pub trait NoticeListener: Send + Sync {
    async fn on_notice(&self, notice: Notice);
}

/// 默认空实现（无操作）
pub struct EmptyNoticeListener;

#[async_trait]
impl NoticeListener for EmptyNoticeListener {
    async fn on_notice(&self, _notice: Notice) {
        // 默认不做任何处理
    }
}
