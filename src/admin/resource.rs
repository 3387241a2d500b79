//! 通用资源接口
//!
//! 每种实体（学生、成绩）都提供相同的分页增删改查能力；
//! `Resource` 描述实体本身，`ResourceClient` 描述访问它的方式。

use crate::admin::error::Result;
use crate::admin::types::{HttpTransport, PaginatedResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::info;

/// 一种可分页管理的实体
pub trait Resource: Send + Sync + 'static {
    /// 展示用名称，用于提示文本（如 "学生"）
    const DISPLAY_NAME: &'static str;
    /// REST 路径段（如 "students"）
    const PATH: &'static str;

    /// 服务端返回的完整实体
    type Entity: Debug + Clone + Serialize + DeserializeOwned + Send + Sync;
    /// 创建时提交的内容，不含服务端分配的字段
    type Draft: Debug + Clone + Serialize + Send + Sync;
    /// 更新时提交的部分字段
    type Patch: Debug + Clone + Serialize + Send + Sync;
    /// 表单字段值，全部可为空
    type Form: Debug + Clone + Default + PartialEq + Send + Sync;

    fn entity_id(entity: &Self::Entity) -> Option<i64>;

    /// 编辑时用实体当前值预填表单
    fn form_of(entity: &Self::Entity) -> Self::Form;

    /// 必填校验通过后生成创建内容
    fn draft_from_form(form: &Self::Form) -> Result<Self::Draft>;

    /// 必填校验通过后生成更新内容
    fn patch_from_form(form: &Self::Form) -> Result<Self::Patch>;
}

/// 单个实体类型的增删改查客户端
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResult<R::Entity>>;

    async fn get(&self, id: i64) -> Result<R::Entity>;

    async fn create(&self, draft: &R::Draft) -> Result<R::Entity>;

    /// 部分更新，未提供的字段保持不变
    async fn update(&self, id: i64, patch: &R::Patch) -> Result<R::Entity>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// 基于 REST 约定的通用实现：
/// `GET /{path}?page&limit`、`GET/PUT/DELETE /{path}/{id}`、`POST /{path}`
pub struct RestResource<R: Resource> {
    transport: HttpTransport,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for RestResource<R> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> RestResource<R> {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            _resource: PhantomData,
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    fn item_path(id: i64) -> String {
        format!("{}/{}", R::PATH, id)
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for RestResource<R> {
    async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResult<R::Entity>> {
        let path = format!("{}?page={}&limit={}", R::PATH, page, limit);
        let result: PaginatedResult<R::Entity> = self
            .transport
            .get_json(&path, &format!("{}列表", R::DISPLAY_NAME))
            .await?;
        info!(
            "[{}] ✅ 列表响应，第 {} 页，本页 {} 条，共 {} 条",
            R::PATH,
            page,
            result.items.len(),
            result.total
        );
        Ok(result)
    }

    async fn get(&self, id: i64) -> Result<R::Entity> {
        self.transport
            .get_json(&Self::item_path(id), &format!("获取{}", R::DISPLAY_NAME))
            .await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Entity> {
        let created: R::Entity = self
            .transport
            .send_json(
                reqwest::Method::POST,
                R::PATH,
                draft,
                &format!("创建{}", R::DISPLAY_NAME),
            )
            .await?;
        info!("[{}] ✅ 创建成功，id: {:?}", R::PATH, R::entity_id(&created));
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &R::Patch) -> Result<R::Entity> {
        let updated = self
            .transport
            .send_json(
                reqwest::Method::PUT,
                &Self::item_path(id),
                patch,
                &format!("更新{}", R::DISPLAY_NAME),
            )
            .await?;
        info!("[{}] ✅ 更新成功，id: {}", R::PATH, id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.transport
            .send_empty(
                reqwest::Method::DELETE,
                &Self::item_path(id),
                &format!("删除{}", R::DISPLAY_NAME),
            )
            .await?;
        info!("[{}] ✅ 删除成功，id: {}", R::PATH, id);
        Ok(())
    }
}
