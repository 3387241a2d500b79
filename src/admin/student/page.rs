//! 学生管理页面：分页列表之外的导入和导出

use crate::admin::csv_codec::{CsvCodec, ParseMode};
use crate::admin::error::Result;
use crate::admin::listener::{EmptyNoticeListener, Notice, NoticeListener};
use crate::admin::page::{BusyFlag, ResourcePage};
use crate::admin::pagination::PaginationController;
use crate::admin::student::api::StudentClient;
use crate::admin::student::models::Students;
use crate::admin::student::types::ImportResult;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct StudentPage {
    page: ResourcePage<Students>,
    client: Arc<dyn StudentClient>,
    listener: Arc<dyn NoticeListener>,
    codec: CsvCodec,
    importing: BusyFlag,
    exporting: BusyFlag,
}

impl StudentPage {
    pub fn new<C: StudentClient + 'static>(client: Arc<C>) -> Self {
        Self::with_listener(
            client,
            PaginationController::default(),
            Arc::new(EmptyNoticeListener),
        )
    }

    pub fn with_listener<C: StudentClient + 'static>(
        client: Arc<C>,
        pagination: PaginationController,
        listener: Arc<dyn NoticeListener>,
    ) -> Self {
        Self {
            page: ResourcePage::<Students>::with_listener(client.clone(), pagination, listener.clone()),
            client,
            listener,
            codec: CsvCodec::default(),
            importing: BusyFlag::default(),
            exporting: BusyFlag::default(),
        }
    }

    /// 导入时对数值字段的解析策略，默认尽力解析
    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.codec = CsvCodec::new(mode);
        self
    }

    /// 分页列表和添加/编辑表单
    pub fn list(&self) -> &ResourcePage<Students> {
        &self.page
    }

    pub fn is_importing(&self) -> bool {
        self.importing.is_set()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_set()
    }

    /// 解析 CSV 文本并整体导入，成功后刷新当前页
    ///
    /// 整批只给出一条提示，服务端逐行的失败原因只记录日志。
    pub async fn import_csv(&self, text: &str) -> Result<ImportResult> {
        let _guard = self.importing.try_acquire("导入")?;

        let outcome = match self.codec.decode(text) {
            Ok(records) => {
                info!("[StudentPage] 从 CSV 解析出 {} 条记录", records.len());
                self.client.import(&records).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                if !result.errors.is_empty() {
                    warn!(
                        "[StudentPage] 导入部分失败: {}/{} 成功",
                        result.success_count, result.total_count
                    );
                }
                self.listener.on_notice(Notice::success("导入成功")).await;
                let _ = self.page.refresh().await;
                Ok(result)
            }
            Err(e) => {
                error!("[StudentPage] 导入失败: {}", e);
                self.listener.on_notice(Notice::error("导入失败")).await;
                Err(e)
            }
        }
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportResult> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                error!("[StudentPage] 读取 {} 失败: {}", path.display(), e);
                self.listener.on_notice(Notice::error("导入失败")).await;
                return Err(e.into());
            }
        };
        self.import_csv(&text).await
    }

    /// 下载服务端生成的 CSV 并保存到 `dest`，返回写入的字节数
    pub async fn export_to(&self, dest: &Path) -> Result<usize> {
        let _guard = self.exporting.try_acquire("导出")?;

        let outcome: Result<usize> = match self.client.export().await {
            Ok(bytes) => tokio::fs::write(dest, &bytes)
                .await
                .map(|_| bytes.len())
                .map_err(Into::into),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(len) => {
                info!("[StudentPage] 已导出到 {}，{} 字节", dest.display(), len);
                Ok(len)
            }
            Err(e) => {
                error!("[StudentPage] 导出失败: {}", e);
                self.listener.on_notice(Notice::error("导出失败")).await;
                Err(e)
            }
        }
    }
}
