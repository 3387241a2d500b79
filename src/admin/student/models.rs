//! 学生模型定义

use crate::admin::error::{FormErrors, Result};
use crate::admin::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 学生（与后台 StudentDto 对应）
///
/// `student_id` 是对外有意义的唯一学号，成绩通过它引用学生；`id` 是存储层主键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default)]
    pub id: Option<i64>,
    pub student_id: i64,
    pub name: String,
    pub qq_number: i64,
    pub group_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 创建学生时提交的内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub student_id: i64,
    pub name: String,
    pub qq_number: i64,
    pub group_id: i64,
}

/// 学生部分更新，`None` 字段不会被发送
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qq_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

impl StudentPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// 没有任何要修改的字段
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 添加/编辑学生表单
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub student_id: Option<i64>,
    pub name: Option<String>,
    pub qq_number: Option<i64>,
    pub group_id: Option<i64>,
}

impl StudentForm {
    fn validate(&self) -> Result<StudentDraft> {
        let mut errors = FormErrors::default();
        if self.student_id.is_none() {
            errors.push("student_id", "请输入学号");
        }
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.push("name", "请输入姓名");
        }
        if self.qq_number.is_none() {
            errors.push("qq_number", "请输入QQ号");
        }
        if self.group_id.is_none() {
            errors.push("group_id", "请输入群号");
        }
        errors.into_result(())?;

        Ok(StudentDraft {
            student_id: self.student_id.unwrap_or_default(),
            name: name.to_string(),
            qq_number: self.qq_number.unwrap_or_default(),
            group_id: self.group_id.unwrap_or_default(),
        })
    }
}

impl From<&StudentDraft> for StudentForm {
    fn from(d: &StudentDraft) -> Self {
        Self {
            student_id: Some(d.student_id),
            name: Some(d.name.clone()),
            qq_number: Some(d.qq_number),
            group_id: Some(d.group_id),
        }
    }
}

impl Student {
    pub fn draft(&self) -> StudentDraft {
        StudentDraft {
            student_id: self.student_id,
            name: self.name.clone(),
            qq_number: self.qq_number,
            group_id: self.group_id,
        }
    }

    /// 下拉选项中的展示文本，如 `张三 (20210001)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.student_id)
    }
}

/// 学生资源标记类型
#[derive(Debug, Clone, Copy)]
pub struct Students;

impl Resource for Students {
    const DISPLAY_NAME: &'static str = "学生";
    const PATH: &'static str = "students";

    type Entity = Student;
    type Draft = StudentDraft;
    type Patch = StudentPatch;
    type Form = StudentForm;

    fn entity_id(entity: &Student) -> Option<i64> {
        entity.id
    }

    fn form_of(entity: &Student) -> StudentForm {
        StudentForm::from(&entity.draft())
    }

    fn draft_from_form(form: &StudentForm) -> Result<StudentDraft> {
        form.validate()
    }

    // 表单提交全部字段，后台逐字段覆盖
    fn patch_from_form(form: &StudentForm) -> Result<StudentPatch> {
        let d = form.validate()?;
        Ok(StudentPatch {
            student_id: Some(d.student_id),
            name: Some(d.name),
            qq_number: Some(d.qq_number),
            group_id: Some(d.group_id),
        })
    }
}
