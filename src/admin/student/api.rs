//! 学生 HTTP API 客户端
//!
//! 负责所有学生相关的 HTTP 请求，包括导入、导出和群发消息

use crate::admin::error::Result;
use crate::admin::resource::{ResourceClient, RestResource};
use crate::admin::student::models::{Student, StudentDraft, StudentPatch, Students};
use crate::admin::student::types::{
    BulkMessageRequest, BulkMessageResult, ImportRecord, ImportResult, ImportStudentsRequest,
};
use crate::admin::types::{HttpTransport, PaginatedResult};
use async_trait::async_trait;
use tracing::{info, warn};

/// 学生专有操作
#[async_trait]
pub trait StudentClient: ResourceClient<Students> {
    /// 批量导入，服务端逐行创建
    async fn import(&self, records: &[ImportRecord]) -> Result<ImportResult>;

    /// 导出为服务端生成的 CSV 字节流
    async fn export(&self) -> Result<Vec<u8>>;

    /// 向一组学号群发消息
    async fn bulk_message(&self, student_ids: &[i64], message: &str) -> Result<BulkMessageResult>;
}

/// 学生相关的 HTTP API 客户端
#[derive(Clone)]
pub struct StudentApi {
    rest: RestResource<Students>,
}

impl StudentApi {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            rest: RestResource::new(transport),
        }
    }

    fn transport(&self) -> &HttpTransport {
        self.rest.transport()
    }
}

#[async_trait]
impl ResourceClient<Students> for StudentApi {
    async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResult<Student>> {
        self.rest.list(page, limit).await
    }

    async fn get(&self, id: i64) -> Result<Student> {
        self.rest.get(id).await
    }

    async fn create(&self, draft: &StudentDraft) -> Result<Student> {
        self.rest.create(draft).await
    }

    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Student> {
        self.rest.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.rest.delete(id).await
    }
}

#[async_trait]
impl StudentClient for StudentApi {
    async fn import(&self, records: &[ImportRecord]) -> Result<ImportResult> {
        info!("[StudentAPI] 📡 批量导入学生，条目数: {}", records.len());
        let result: ImportResult = self
            .transport()
            .send_json(
                reqwest::Method::POST,
                "students/import",
                &ImportStudentsRequest { students: records },
                "导入学生",
            )
            .await?;
        info!(
            "[StudentAPI] ✅ 导入完成，成功 {}/{}",
            result.success_count, result.total_count
        );
        for e in &result.errors {
            warn!("[StudentAPI]   导入失败行: {}", e);
        }
        Ok(result)
    }

    async fn export(&self) -> Result<Vec<u8>> {
        info!("[StudentAPI] 📡 导出学生 CSV");
        let bytes = self.transport().get_bytes("students/export", "导出学生").await?;
        info!("[StudentAPI] ✅ 导出完成，大小: {} 字节", bytes.len());
        Ok(bytes)
    }

    async fn bulk_message(&self, student_ids: &[i64], message: &str) -> Result<BulkMessageResult> {
        info!("[StudentAPI] 📡 群发消息，目标人数: {}", student_ids.len());
        let result: BulkMessageResult = self
            .transport()
            .send_json(
                reqwest::Method::POST,
                "students/bulk-message",
                &BulkMessageRequest {
                    student_ids,
                    message,
                },
                "群发消息",
            )
            .await?;
        info!(
            "[StudentAPI] ✅ 群发完成，成功: {}, 服务端信息: {}",
            result.success_count, result.message
        );
        Ok(result)
    }
}
