//! 添加/编辑弹窗的状态机
//!
//! `Closed` → `Create`/`Edit` → 提交成功回到 `Closed`；提交失败保持打开并保留输入。

use crate::admin::error::{AdminError, Result};
use crate::admin::resource::Resource;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode<E> {
    Closed,
    Create,
    /// 编辑中的实体，保留 id 但不可编辑
    Edit(E),
}

/// 表单校验通过后需要执行的远端操作
#[derive(Debug, Clone)]
pub enum SubmitAction<R: Resource> {
    Create(R::Draft),
    Update { id: i64, patch: R::Patch },
}

impl<R: Resource> SubmitAction<R> {
    pub fn is_create(&self) -> bool {
        matches!(self, SubmitAction::Create(_))
    }
}

#[derive(Debug, Clone)]
pub struct ResourceFormController<R: Resource> {
    mode: FormMode<R::Entity>,
    values: R::Form,
    error: Option<String>,
}

impl<R: Resource> Default for ResourceFormController<R> {
    fn default() -> Self {
        Self {
            mode: FormMode::Closed,
            values: R::Form::default(),
            error: None,
        }
    }
}

impl<R: Resource> ResourceFormController<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode<R::Entity> {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.mode, FormMode::Closed)
    }

    pub fn values(&self) -> &R::Form {
        &self.values
    }

    /// 最近一次提交失败的原因
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Closed => String::new(),
            FormMode::Create => format!("添加{}", R::DISPLAY_NAME),
            FormMode::Edit(_) => format!("编辑{}", R::DISPLAY_NAME),
        }
    }

    pub fn open_create(&mut self) {
        debug!("[Form] 打开添加{}表单", R::DISPLAY_NAME);
        self.mode = FormMode::Create;
        self.values = R::Form::default();
        self.error = None;
    }

    pub fn open_edit(&mut self, entity: R::Entity) {
        debug!(
            "[Form] 打开编辑{}表单，id: {:?}",
            R::DISPLAY_NAME,
            R::entity_id(&entity)
        );
        self.values = R::form_of(&entity);
        self.mode = FormMode::Edit(entity);
        self.error = None;
    }

    /// 更新表单输入，不触发校验
    pub fn set_values(&mut self, values: R::Form) {
        self.values = values;
    }

    /// 记录输入并做本地校验，返回需要执行的操作；校验失败时表单保持打开
    pub fn submit(&mut self, values: R::Form) -> Result<SubmitAction<R>> {
        self.values = values;
        let action = match &self.mode {
            FormMode::Closed => {
                return Err(AdminError::NotFound("表单未打开".to_string()));
            }
            FormMode::Create => R::draft_from_form(&self.values).map(SubmitAction::Create),
            FormMode::Edit(entity) => match R::entity_id(entity) {
                Some(id) => R::patch_from_form(&self.values)
                    .map(|patch| SubmitAction::Update { id, patch }),
                None => Err(AdminError::NotFound(format!(
                    "待编辑的{}缺少 id",
                    R::DISPLAY_NAME
                ))),
            },
        };
        if let Err(e) = &action {
            self.error = Some(e.to_string());
        }
        action
    }

    /// 远端操作成功：关闭并清空
    pub fn complete(&mut self) {
        self.mode = FormMode::Closed;
        self.values = R::Form::default();
        self.error = None;
    }

    /// 远端操作失败：保持打开，保留输入以便直接重试
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// 取消，丢弃未提交的输入
    pub fn cancel(&mut self) {
        debug!("[Form] 取消{}表单", R::DISPLAY_NAME);
        self.complete();
    }
}
