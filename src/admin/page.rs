//! 分页资源页面
//!
//! 把分页、增删改查客户端和表单状态机组合成一个页面。所有远端调用都不在
//! 持有状态锁时进行；列表响应只在其请求代次仍是最新时才会写入状态。

use crate::admin::error::{AdminError, Result};
use crate::admin::form::{FormMode, ResourceFormController, SubmitAction};
use crate::admin::listener::{EmptyNoticeListener, Notice, NoticeListener};
use crate::admin::pagination::{FetchTicket, PaginationController, PaginationState};
use crate::admin::resource::{Resource, ResourceClient};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// 单个操作的进行中标记，同一操作未结束前拒绝重复触发
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicBool);

pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl BusyFlag {
    pub(crate) fn try_acquire(&self, action: &'static str) -> Result<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(&self.0))
            .map_err(|_| AdminError::Busy(action))
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 列表请求的加载标记，0 表示空闲；请求结束或 future 被丢弃时清除
struct LoadingGuard<'a> {
    slot: &'a AtomicU64,
    generation: u64,
}

impl<'a> LoadingGuard<'a> {
    fn start(slot: &'a AtomicU64, generation: u64) -> Self {
        slot.store(generation, Ordering::Release);
        Self { slot, generation }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        // 已被更新的请求接管时不清除
        let _ = self
            .slot
            .compare_exchange(self.generation, 0, Ordering::AcqRel, Ordering::Acquire);
    }
}

/// 正在删除的 id 集合，锁只在插入和移除时短暂持有
#[derive(Debug, Default)]
struct DeletingSet(std::sync::Mutex<HashSet<i64>>);

struct DeletingGuard<'a> {
    set: &'a DeletingSet,
    id: i64,
}

impl DeletingSet {
    fn ids(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_acquire(&self, id: i64) -> Result<DeletingGuard<'_>> {
        if self.ids().insert(id) {
            Ok(DeletingGuard { set: self, id })
        } else {
            Err(AdminError::Busy("删除"))
        }
    }

    fn contains(&self, id: i64) -> bool {
        self.ids().contains(&id)
    }
}

impl Drop for DeletingGuard<'_> {
    fn drop(&mut self) {
        self.set.ids().remove(&self.id);
    }
}

struct PageState<R: Resource> {
    pagination: PaginationController,
    items: Vec<R::Entity>,
    form: ResourceFormController<R>,
}

pub struct ResourcePage<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    listener: Arc<dyn NoticeListener>,
    state: Mutex<PageState<R>>,
    /// 正在等待的列表请求代次
    loading: AtomicU64,
    deleting: DeletingSet,
    submitting: BusyFlag,
}

impl<R: Resource> ResourcePage<R> {
    /// 使用默认分页和空监听器创建页面
    pub fn new(client: Arc<dyn ResourceClient<R>>) -> Self {
        Self::with_listener(client, PaginationController::default(), Arc::new(EmptyNoticeListener))
    }

    pub fn with_listener(
        client: Arc<dyn ResourceClient<R>>,
        pagination: PaginationController,
        listener: Arc<dyn NoticeListener>,
    ) -> Self {
        Self {
            client,
            listener,
            state: Mutex::new(PageState {
                pagination,
                items: Vec::new(),
                form: ResourceFormController::new(),
            }),
            loading: AtomicU64::new(0),
            deleting: DeletingSet::default(),
            submitting: BusyFlag::default(),
        }
    }

    pub fn client(&self) -> &Arc<dyn ResourceClient<R>> {
        &self.client
    }

    pub(crate) async fn notify(&self, notice: Notice) {
        self.listener.on_notice(notice).await;
    }

    pub async fn items(&self) -> Vec<R::Entity> {
        self.state.lock().await.items.clone()
    }

    pub async fn pagination(&self) -> PaginationState {
        self.state.lock().await.pagination.state()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire) != 0
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }

    pub fn is_deleting(&self, id: i64) -> bool {
        self.deleting.contains(id)
    }

    /// 以当前分页参数重新拉取列表
    pub async fn refresh(&self) -> Result<bool> {
        let ticket = self.state.lock().await.pagination.refresh();
        self.fetch(ticket).await
    }

    /// 切换页码后拉取列表；返回 `false` 表示响应已被更新的请求取代
    pub async fn set_page(&self, page: u64, page_size: Option<u64>) -> Result<bool> {
        let ticket = self.state.lock().await.pagination.set_page(page, page_size);
        self.fetch(ticket).await
    }

    async fn fetch(&self, mut ticket: FetchTicket) -> Result<bool> {
        loop {
            let _loading = LoadingGuard::start(&self.loading, ticket.generation);
            debug!(
                "[Page/{}] 拉取第 {} 页，每页 {} 条，代次 {}",
                R::PATH,
                ticket.page,
                ticket.limit,
                ticket.generation
            );

            let result = self.client.list(ticket.page, ticket.limit).await;

            let mut state = self.state.lock().await;
            if !state.pagination.is_current(&ticket) {
                debug!("[Page/{}] 代次 {} 的响应已过期，丢弃", R::PATH, ticket.generation);
                return Ok(false);
            }

            match result {
                Ok(page) => {
                    state.pagination.on_result(&ticket, page.total);
                    // 整体替换，不保留旧列表的任何部分
                    state.items = page.items;
                    if state.items.is_empty() {
                        if let Some(next) = state.pagination.correct_overflow() {
                            ticket = next;
                            continue;
                        }
                    }
                    return Ok(true);
                }
                Err(e) => {
                    drop(state);
                    error!("[Page/{}] 获取列表失败: {}", R::PATH, e);
                    self.notify(Notice::error(format!("获取{}列表失败", R::DISPLAY_NAME)))
                        .await;
                    return Err(e);
                }
            }
        }
    }

    pub async fn open_create(&self) {
        self.state.lock().await.form.open_create();
    }

    pub async fn open_edit(&self, entity: R::Entity) {
        self.state.lock().await.form.open_edit(entity);
    }

    pub async fn set_form_values(&self, values: R::Form) {
        self.state.lock().await.form.set_values(values);
    }

    /// 关闭表单，不发起任何请求
    pub async fn cancel_form(&self) {
        self.state.lock().await.form.cancel();
    }

    pub async fn form_mode(&self) -> FormMode<R::Entity> {
        self.state.lock().await.form.mode().clone()
    }

    pub async fn form_values(&self) -> R::Form {
        self.state.lock().await.form.values().clone()
    }

    pub async fn form_error(&self) -> Option<String> {
        self.state.lock().await.form.error().map(str::to_string)
    }

    pub async fn form_title(&self) -> String {
        self.state.lock().await.form.title()
    }

    /// 提交表单
    ///
    /// 成功后关闭表单并刷新当前页（不会跳转到新记录所在的页）；
    /// 失败时表单保持打开，输入保留。
    pub async fn submit(&self, values: R::Form) -> Result<R::Entity> {
        let _guard = self.submitting.try_acquire("提交")?;
        let action = self.state.lock().await.form.submit(values)?;
        let is_create = action.is_create();

        let result = match &action {
            SubmitAction::Create(draft) => self.client.create(draft).await,
            SubmitAction::Update { id, patch } => self.client.update(*id, patch).await,
        };
        let verb = if is_create { "添加" } else { "更新" };

        match result {
            Ok(entity) => {
                self.state.lock().await.form.complete();
                info!("[Page/{}] {}{}成功", R::PATH, verb, R::DISPLAY_NAME);
                self.notify(Notice::success(format!("{}成功", verb))).await;
                // 刷新失败已单独提示，不影响本次提交结果
                let _ = self.refresh().await;
                Ok(entity)
            }
            Err(e) => {
                let text = format!("{}失败: {}", verb, e);
                self.state.lock().await.form.fail(text.clone());
                error!("[Page/{}] {}", R::PATH, text);
                self.notify(Notice::error(text)).await;
                Err(e)
            }
        }
    }

    /// 删除（调用方负责二次确认）
    pub async fn delete(&self, id: i64) -> Result<()> {
        let deleting = self.deleting.try_acquire(id)?;
        let result = self.client.delete(id).await;
        drop(deleting);

        match result {
            Ok(()) => {
                self.notify(Notice::success("删除成功")).await;
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!("[Page/{}] 删除 {} 失败: {}", R::PATH, id, e);
                self.notify(Notice::error(format!("删除失败: {}", e))).await;
                Err(e)
            }
        }
    }
}
