//! 群发消息页面

use crate::admin::error::{AdminError, FormErrors, Result};
use crate::admin::grade::page::ROSTER_LIMIT;
use crate::admin::listener::{EmptyNoticeListener, Notice, NoticeListener};
use crate::admin::page::BusyFlag;
use crate::admin::selection::SelectionController;
use crate::admin::student::api::StudentClient;
use crate::admin::student::models::Student;
use crate::admin::student::types::BulkMessageResult;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub struct BulkMessagePage {
    client: Arc<dyn StudentClient>,
    listener: Arc<dyn NoticeListener>,
    roster: Mutex<Vec<Student>>,
    selection: Mutex<SelectionController>,
    sending: BusyFlag,
}

impl BulkMessagePage {
    pub fn new<C: StudentClient + 'static>(client: Arc<C>) -> Self {
        Self::with_listener(client, Arc::new(EmptyNoticeListener))
    }

    pub fn with_listener<C: StudentClient + 'static>(
        client: Arc<C>,
        listener: Arc<dyn NoticeListener>,
    ) -> Self {
        Self {
            client,
            listener,
            roster: Mutex::new(Vec::new()),
            selection: Mutex::new(SelectionController::new()),
            sending: BusyFlag::default(),
        }
    }

    pub async fn load_roster(&self) -> Result<()> {
        match self.client.list(1, ROSTER_LIMIT).await {
            Ok(page) => {
                *self.roster.lock().await = page.items;
                Ok(())
            }
            Err(e) => {
                error!("[BulkMessage] 获取学生名单失败: {}", e);
                self.listener.on_notice(Notice::error("获取学生列表失败")).await;
                Err(e)
            }
        }
    }

    pub async fn roster(&self) -> Vec<Student> {
        self.roster.lock().await.clone()
    }

    /// 文本框输入，返回重新渲染后的文本
    pub async fn set_text(&self, text: &str) -> String {
        let mut selection = self.selection.lock().await;
        selection.from_text(text);
        selection.text()
    }

    /// 多选框输入，返回重新渲染后的文本
    pub async fn set_selected(&self, ids: Vec<i64>) -> String {
        let mut selection = self.selection.lock().await;
        selection.from_select(ids);
        selection.text()
    }

    pub async fn remove(&self, id: i64) -> String {
        let mut selection = self.selection.lock().await;
        selection.remove_one(id);
        selection.text()
    }

    pub async fn selection(&self) -> SelectionController {
        self.selection.lock().await.clone()
    }

    /// 已选学生的标签（仅名单中存在的学号）
    pub async fn labels(&self) -> Vec<String> {
        let roster = self.roster.lock().await;
        self.selection.lock().await.labels(&roster)
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_set()
    }

    /// 发送给当前选择；选择为空或消息为空时只给出警告，不发请求
    pub async fn send(&self, message: &str) -> Result<BulkMessageResult> {
        let ids = self.selection.lock().await.to_vec();

        let mut errors = FormErrors::default();
        if ids.is_empty() {
            errors.push("student_ids", "请选择要发送消息的学生");
        } else if message.trim().is_empty() {
            errors.push("message", "请输入要发送的消息");
        }
        if let Some(first) = errors.0.first() {
            self.listener.on_notice(Notice::warning(first.message.clone())).await;
            return Err(AdminError::Form(errors));
        }

        let _guard = self.sending.try_acquire("发送消息")?;
        match self.client.bulk_message(&ids, message).await {
            Ok(result) => {
                info!("[BulkMessage] 已发送给 {} 个学生", ids.len());
                // 发送期间改过的选择保留
                let mut selection = self.selection.lock().await;
                if selection.to_vec() == ids {
                    selection.clear();
                }
                drop(selection);
                self.listener
                    .on_notice(Notice::success(format!(
                        "消息发送成功！共发送给 {} 个学生",
                        ids.len()
                    )))
                    .await;
                Ok(result)
            }
            Err(e) => {
                error!("[BulkMessage] 消息发送失败: {}", e);
                self.listener.on_notice(Notice::error("消息发送失败")).await;
                Err(e)
            }
        }
    }
}
