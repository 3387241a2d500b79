//! 成绩 HTTP API 客户端

use crate::admin::error::Result;
use crate::admin::grade::models::{Grade, GradeDraft, GradePatch, Grades};
use crate::admin::resource::{ResourceClient, RestResource};
use crate::admin::types::{HttpTransport, PaginatedResult};
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait GradeClient: ResourceClient<Grades> {
    /// 查询某个学号的全部成绩
    async fn by_student(&self, student_id: i64) -> Result<Vec<Grade>>;
}

#[derive(Clone)]
pub struct GradeApi {
    rest: RestResource<Grades>,
}

impl GradeApi {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            rest: RestResource::new(transport),
        }
    }
}

#[async_trait]
impl ResourceClient<Grades> for GradeApi {
    async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResult<Grade>> {
        self.rest.list(page, limit).await
    }

    async fn get(&self, id: i64) -> Result<Grade> {
        self.rest.get(id).await
    }

    async fn create(&self, draft: &GradeDraft) -> Result<Grade> {
        self.rest.create(draft).await
    }

    async fn update(&self, id: i64, patch: &GradePatch) -> Result<Grade> {
        self.rest.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.rest.delete(id).await
    }
}

#[async_trait]
impl GradeClient for GradeApi {
    async fn by_student(&self, student_id: i64) -> Result<Vec<Grade>> {
        let path = format!("grades/student/{}", student_id);
        let grades: Vec<Grade> = self
            .rest
            .transport()
            .get_json(&path, "按学号查询成绩")
            .await?;
        info!(
            "[GradeAPI] ✅ 学号 {} 的成绩条目数: {}",
            student_id,
            grades.len()
        );
        Ok(grades)
    }
}
