//! 配置管理页面

use crate::admin::config::api::ConfigClient;
use crate::admin::config::models::BotConfig;
use crate::admin::error::Result;
use crate::admin::listener::{EmptyNoticeListener, Notice, NoticeListener};
use crate::admin::page::BusyFlag;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub struct ConfigPage {
    client: Arc<dyn ConfigClient>,
    listener: Arc<dyn NoticeListener>,
    current: Mutex<Option<BotConfig>>,
    loading: BusyFlag,
    saving: BusyFlag,
}

impl ConfigPage {
    pub fn new<C: ConfigClient + 'static>(client: Arc<C>) -> Self {
        Self::with_listener(client, Arc::new(EmptyNoticeListener))
    }

    pub fn with_listener<C: ConfigClient + 'static>(
        client: Arc<C>,
        listener: Arc<dyn NoticeListener>,
    ) -> Self {
        Self {
            client,
            listener,
            current: Mutex::new(None),
            loading: BusyFlag::default(),
            saving: BusyFlag::default(),
        }
    }

    /// 最近一次加载或保存成功的配置
    pub async fn current(&self) -> Option<BotConfig> {
        self.current.lock().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_set()
    }

    pub async fn load(&self) -> Result<BotConfig> {
        let _guard = self.loading.try_acquire("加载配置")?;
        match self.client.get().await {
            Ok(config) => {
                *self.current.lock().await = Some(config.clone());
                Ok(config)
            }
            Err(e) => {
                error!("[ConfigPage] 获取配置失败: {}", e);
                self.listener.on_notice(Notice::error("获取配置失败")).await;
                Err(e)
            }
        }
    }

    /// 校验后整体替换配置，返回服务端状态信息
    pub async fn save(&self, config: BotConfig) -> Result<String> {
        config.validate()?;
        let _guard = self.saving.try_acquire("保存配置")?;

        match self.client.update(&config).await {
            Ok(status) => {
                info!("[ConfigPage] 配置已保存: {}", status);
                *self.current.lock().await = Some(config);
                self.listener.on_notice(Notice::success("配置更新成功")).await;
                Ok(status)
            }
            Err(e) => {
                error!("[ConfigPage] 配置更新失败: {}", e);
                self.listener.on_notice(Notice::error("配置更新失败")).await;
                Err(e)
            }
        }
    }
}
