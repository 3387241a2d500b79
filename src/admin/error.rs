//! 管理端错误类型

use std::fmt;

/// 单个表单字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// 本地表单校验失败时收集到的全部字段错误
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// 没有错误时返回 `Ok(value)`
    pub fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(AdminError::Form(self))
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", joined.join("; "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// 连接失败、超时或服务端 5xx
    #[error("网络错误: {0}")]
    Network(String),

    /// 服务端拒绝了请求内容（4xx）
    #[error("请求被拒绝 ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("反序列化响应失败: {0}")]
    Decode(String),

    #[error("表单校验失败: {0}")]
    Form(FormErrors),

    /// 同一操作仍在进行中
    #[error("{0}正在进行中")]
    Busy(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

impl AdminError {
    pub fn is_network(&self) -> bool {
        matches!(self, AdminError::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AdminError::Validation { .. })
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(e: reqwest::Error) -> Self {
        AdminError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
