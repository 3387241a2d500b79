//! 学生导入、群发接口的请求和响应结构体

use crate::admin::student::models::StudentDraft;
use crate::admin::types::deserialize_vec_or_null;
use serde::{Deserialize, Serialize};

/// 导入的一行学生数据
///
/// CSV 中无法解析为整数的字段保留为 `None`（序列化为 null），整行仍会提交。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub student_id: Option<i64>,
    pub name: String,
    pub qq_number: Option<i64>,
    pub group_id: Option<i64>,
}

impl ImportRecord {
    /// 所有数值字段都解析成功时才能转成完整的创建内容
    pub fn to_draft(&self) -> Option<StudentDraft> {
        Some(StudentDraft {
            student_id: self.student_id?,
            name: self.name.clone(),
            qq_number: self.qq_number?,
            group_id: self.group_id?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.to_draft().is_some()
    }
}

impl From<StudentDraft> for ImportRecord {
    fn from(d: StudentDraft) -> Self {
        Self {
            student_id: Some(d.student_id),
            name: d.name,
            qq_number: Some(d.qq_number),
            group_id: Some(d.group_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportStudentsRequest<'a> {
    pub students: &'a [ImportRecord],
}

/// 导入结果，`errors` 为服务端逐行返回的失败原因
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkMessageRequest<'a> {
    pub student_ids: &'a [i64],
    pub message: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMessageResult {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub message: String,
}
