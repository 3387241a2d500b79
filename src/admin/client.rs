//! 管理端客户端入口
//!
//! 根据 `ClientConfig` 创建共享的 HTTP 客户端，并组装各实体的 API 和页面。

use crate::admin::bulk_message::BulkMessagePage;
use crate::admin::config::api::ConfigApi;
use crate::admin::config::page::ConfigPage;
use crate::admin::error::{AdminError, Result};
use crate::admin::grade::api::GradeApi;
use crate::admin::grade::page::GradePage;
use crate::admin::listener::NoticeListener;
use crate::admin::pagination::PaginationController;
use crate::admin::student::api::StudentApi;
use crate::admin::student::page::StudentPage;
use crate::admin::types::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_BASE_URL: &str = "QQBOT_ADMIN_API";
pub const ENV_TIMEOUT_SECS: &str = "QQBOT_ADMIN_TIMEOUT_SECS";

/// 客户端配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// 管理后台 REST 接口基础地址
    pub api_base_url: String,
    /// 单个请求的超时时间
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 从环境变量读取，未设置的项使用默认值
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => warn!("[Client] 忽略无效的 {}: {}", ENV_TIMEOUT_SECS, secs),
            }
        }
        config
    }
}

/// 管理后台客户端，持有各实体共享同一个连接池的 API
#[derive(Clone)]
pub struct AdminClient {
    config: ClientConfig,
    students: Arc<StudentApi>,
    grades: Arc<GradeApi>,
    bot_config: Arc<ConfigApi>,
}

impl AdminClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdminError::Network(format!("创建 HTTP 客户端失败: {}", e)))?;
        let transport = HttpTransport::new(http_client, config.api_base_url.clone());

        info!(
            "[Client] 创建管理端客户端，API: {}, 超时: {:?}",
            config.api_base_url, config.timeout
        );

        Ok(Self {
            students: Arc::new(StudentApi::new(transport.clone())),
            grades: Arc::new(GradeApi::new(transport.clone())),
            bot_config: Arc::new(ConfigApi::new(transport)),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn students(&self) -> &Arc<StudentApi> {
        &self.students
    }

    pub fn grades(&self) -> &Arc<GradeApi> {
        &self.grades
    }

    pub fn bot_config(&self) -> &Arc<ConfigApi> {
        &self.bot_config
    }

    pub fn student_page(&self, listener: Arc<dyn NoticeListener>) -> StudentPage {
        StudentPage::with_listener(
            self.students.clone(),
            PaginationController::default(),
            listener,
        )
    }

    pub fn grade_page(&self, listener: Arc<dyn NoticeListener>) -> GradePage {
        GradePage::with_listener(
            self.grades.clone(),
            self.students.clone(),
            PaginationController::default(),
            listener,
        )
    }

    pub fn config_page(&self, listener: Arc<dyn NoticeListener>) -> ConfigPage {
        ConfigPage::with_listener(self.bot_config.clone(), listener)
    }

    pub fn bulk_message_page(&self, listener: Arc<dyn NoticeListener>) -> BulkMessagePage {
        BulkMessagePage::with_listener(self.students.clone(), listener)
    }
}
