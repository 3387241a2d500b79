//! 配置 HTTP API 客户端

use crate::admin::config::models::BotConfig;
use crate::admin::error::Result;
use crate::admin::types::HttpTransport;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait ConfigClient: Send + Sync {
    async fn get(&self) -> Result<BotConfig>;

    /// 整体替换配置，返回服务端的状态信息
    async fn update(&self, config: &BotConfig) -> Result<String>;
}

#[derive(Clone)]
pub struct ConfigApi {
    transport: HttpTransport,
}

impl ConfigApi {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ConfigClient for ConfigApi {
    async fn get(&self) -> Result<BotConfig> {
        info!("[ConfigAPI] 📡 获取配置");
        self.transport.get_json("config", "获取配置").await
    }

    async fn update(&self, config: &BotConfig) -> Result<String> {
        info!("[ConfigAPI] 📡 更新配置");
        let status: String = self
            .transport
            .send_json(reqwest::Method::PUT, "config", config, "更新配置")
            .await?;
        info!("[ConfigAPI] ✅ {}", status);
        Ok(status)
    }
}
