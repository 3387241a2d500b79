//! 群发对象选择
//!
//! 文本框（每行一个学号）和多选框是同一个集合的两种视图，二者都只通过
//! `SelectionController` 读写，不会互相直接同步。

use crate::admin::student::models::Student;
use std::collections::BTreeSet;
use tracing::debug;

/// 按行解析学号：去掉首尾空白，跳过空行，无法解析为整数的行静默丢弃
pub fn parse_id_lines(text: &str) -> BTreeSet<i64> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.parse::<i64>().ok())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    ids: BTreeSet<i64>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文本框输入，整体替换当前选择
    pub fn from_text(&mut self, text: &str) -> &BTreeSet<i64> {
        self.ids = parse_id_lines(text);
        debug!("[Selection] 文本输入解析出 {} 个学号", self.ids.len());
        &self.ids
    }

    /// 多选框输入，整体替换当前选择
    pub fn from_select<I>(&mut self, ids: I) -> &BTreeSet<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        self.ids = ids.into_iter().collect();
        debug!("[Selection] 多选框选择了 {} 个学号", self.ids.len());
        &self.ids
    }

    /// 移除单个学号（关闭标签时）
    pub fn remove_one(&mut self, id: i64) -> bool {
        self.ids.remove(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &BTreeSet<i64> {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// 文本框视图，每行一个学号，按学号升序
    pub fn text(&self) -> String {
        self.ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 多选框视图：名单中被勾选的学生
    pub fn checked<'a>(&self, roster: &'a [Student]) -> Vec<&'a Student> {
        roster
            .iter()
            .filter(|s| self.ids.contains(&s.student_id))
            .collect()
    }

    /// 已选学生的展示标签；不在名单中的学号不显示
    pub fn labels(&self, roster: &[Student]) -> Vec<String> {
        self.checked(roster).into_iter().map(Student::label).collect()
    }
}
