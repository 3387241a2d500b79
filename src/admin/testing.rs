//! 测试用的内存后端和通知记录器

use crate::admin::config::api::ConfigClient;
use crate::admin::config::models::{sample_config, BotConfig};
use crate::admin::csv_codec::CsvCodec;
use crate::admin::error::{AdminError, Result};
use crate::admin::grade::api::GradeClient;
use crate::admin::grade::models::{Grade, GradeDraft, GradePatch, Grades};
use crate::admin::listener::{Notice, NoticeLevel, NoticeListener};
use crate::admin::resource::ResourceClient;
use crate::admin::student::api::StudentClient;
use crate::admin::student::models::{Student, StudentDraft, StudentPatch, Students};
use crate::admin::student::types::{BulkMessageResult, ImportRecord, ImportResult};
use crate::admin::types::PaginatedResult;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;

static INIT_LOGGER: Once = Once::new();

pub(crate) fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::EnvFilter;

        let filter_layer = EnvFilter::new("info,qqbot_admin_client=debug");
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_test_writer();

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    });
}

fn paginate<T: Clone>(all: &[T], page: u64, limit: u64) -> PaginatedResult<T> {
    let skip = (page.max(1) - 1).saturating_mul(limit) as usize;
    PaginatedResult {
        items: all.iter().skip(skip).take(limit as usize).cloned().collect(),
        total: all.len() as u64,
        page,
        limit,
    }
}

/// 内存中的学生、成绩、配置后端
///
/// - `fail(op)` 让指定操作持续返回网络错误，`recover(op)` 恢复
/// - `gate(page)` 让该页的列表请求挂起，直到 `release(page)`
/// - `hold(op)` 让某类写操作在记录调用后挂起，直到 `release_op(op)`
/// - `calls()` 按顺序记录每一次调用
#[derive(Default)]
pub(crate) struct MemoryBackend {
    next_id: AtomicI64,
    students: Mutex<Vec<Student>>,
    grades: Mutex<Vec<Grade>>,
    config: Mutex<BotConfig>,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<u64, Arc<Notify>>>,
    holds: Mutex<HashMap<&'static str, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
    imported: Mutex<Vec<ImportRecord>>,
    messages: Mutex<Vec<(Vec<i64>, String)>>,
}

impl MemoryBackend {
    pub(crate) fn new() -> Arc<Self> {
        let backend = Self::default();
        *backend.config.lock().unwrap() = sample_config();
        Arc::new(backend)
    }

    /// 预置 `n` 个学生，学号从 2024001 开始
    pub(crate) fn with_students(n: usize) -> Arc<Self> {
        let backend = Self::new();
        for i in 1..=n as i64 {
            backend.insert_student(StudentDraft {
                student_id: 2024000 + i,
                name: format!("学生{}", i),
                qq_number: 10000 + i,
                group_id: 900,
            });
        }
        backend
    }

    pub(crate) fn insert_student(&self, draft: StudentDraft) -> Student {
        let student = Student {
            id: Some(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            student_id: draft.student_id,
            name: draft.name,
            qq_number: draft.qq_number,
            group_id: draft.group_id,
            created_at: None,
            updated_at: None,
        };
        self.students.lock().unwrap().push(student.clone());
        student
    }

    pub(crate) fn insert_grade(&self, draft: GradeDraft) -> Grade {
        let grade = Grade {
            id: Some(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            student_name: draft.student_name,
            exam_name: draft.exam_name,
            course_id: draft.course_id,
            course_seq: draft.course_seq,
            student_id: draft.student_id,
            score: draft.score,
            category: draft.category,
        };
        self.grades.lock().unwrap().push(grade.clone());
        grade
    }

    pub(crate) fn students(&self) -> Vec<Student> {
        self.students.lock().unwrap().clone()
    }

    pub(crate) fn student(&self, id: i64) -> Option<Student> {
        self.students().into_iter().find(|s| s.id == Some(id))
    }

    pub(crate) fn config(&self) -> BotConfig {
        self.config.lock().unwrap().clone()
    }

    pub(crate) fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub(crate) fn gate(&self, page: u64) {
        self.gates.lock().unwrap().insert(page, Arc::new(Notify::new()));
    }

    pub(crate) fn release(&self, page: u64) {
        if let Some(gate) = self.gates.lock().unwrap().remove(&page) {
            gate.notify_one();
        }
    }

    pub(crate) fn hold(&self, op: &'static str) {
        self.holds.lock().unwrap().insert(op, Arc::new(Notify::new()));
    }

    pub(crate) fn release_op(&self, op: &'static str) {
        if let Some(hold) = self.holds.lock().unwrap().remove(op) {
            hold.notify_one();
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// 等到指定调用出现在调用记录中
    pub(crate) async fn wait_for_call(&self, call: &str) {
        while !self.calls().iter().any(|c| c == call) {
            tokio::task::yield_now().await;
        }
    }

    pub(crate) fn imported(&self) -> Vec<ImportRecord> {
        self.imported.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self) -> Vec<(Vec<i64>, String)> {
        self.messages.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(op) {
            return Err(AdminError::Network(format!("{} 连接被拒绝", op)));
        }
        Ok(())
    }

    async fn pass_gate(&self, page: u64) {
        let gate = self.gates.lock().unwrap().get(&page).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    async fn pass_hold(&self, op: &'static str) {
        let hold = self.holds.lock().unwrap().get(op).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
    }
}

#[async_trait]
impl ResourceClient<Students> for MemoryBackend {
    async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResult<Student>> {
        self.record("list", format!("students.list {}", page))?;
        self.pass_gate(page).await;
        Ok(paginate(&self.students(), page, limit))
    }

    async fn get(&self, id: i64) -> Result<Student> {
        self.record("get", format!("students.get {}", id))?;
        self.student(id)
            .ok_or_else(|| AdminError::NotFound(format!("学生 {}", id)))
    }

    async fn create(&self, draft: &StudentDraft) -> Result<Student> {
        self.record("create", format!("students.create {}", draft.student_id))?;
        Ok(self.insert_student(draft.clone()))
    }

    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Student> {
        self.record("update", format!("students.update {}", id))?;
        let mut students = self.students.lock().unwrap();
        let student = students
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or_else(|| AdminError::NotFound(format!("学生 {}", id)))?;
        if let Some(v) = patch.student_id {
            student.student_id = v;
        }
        if let Some(v) = &patch.name {
            student.name = v.clone();
        }
        if let Some(v) = patch.qq_number {
            student.qq_number = v;
        }
        if let Some(v) = patch.group_id {
            student.group_id = v;
        }
        Ok(student.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.record("delete", format!("students.delete {}", id))?;
        self.pass_hold("delete").await;
        let mut students = self.students.lock().unwrap();
        let before = students.len();
        students.retain(|s| s.id != Some(id));
        if students.len() == before {
            return Err(AdminError::NotFound(format!("学生 {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl StudentClient for MemoryBackend {
    async fn import(&self, records: &[ImportRecord]) -> Result<ImportResult> {
        self.record("import", format!("students.import {}", records.len()))?;
        self.imported.lock().unwrap().extend_from_slice(records);

        let mut result = ImportResult {
            total_count: records.len(),
            ..Default::default()
        };
        for (i, record) in records.iter().enumerate() {
            match record.to_draft() {
                Some(draft) => {
                    self.insert_student(draft);
                    result.success_count += 1;
                }
                None => result.errors.push(format!("第{}行数据不完整", i + 1)),
            }
        }
        Ok(result)
    }

    async fn export(&self) -> Result<Vec<u8>> {
        self.record("export", "students.export".to_string())?;
        let drafts: Vec<StudentDraft> = self.students().iter().map(Student::draft).collect();
        Ok(CsvCodec::default().encode(&drafts)?.into_bytes())
    }

    async fn bulk_message(&self, student_ids: &[i64], message: &str) -> Result<BulkMessageResult> {
        self.record("bulk_message", format!("students.bulk_message {}", student_ids.len()))?;
        self.pass_hold("bulk_message").await;
        self.messages
            .lock()
            .unwrap()
            .push((student_ids.to_vec(), message.to_string()));
        Ok(BulkMessageResult {
            success_count: student_ids.len(),
            message: "消息发送成功".to_string(),
        })
    }
}

#[async_trait]
impl ResourceClient<Grades> for MemoryBackend {
    async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResult<Grade>> {
        self.record("list", format!("grades.list {}", page))?;
        let grades = self.grades.lock().unwrap().clone();
        Ok(paginate(&grades, page, limit))
    }

    async fn get(&self, id: i64) -> Result<Grade> {
        self.record("get", format!("grades.get {}", id))?;
        self.grades
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == Some(id))
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("成绩 {}", id)))
    }

    async fn create(&self, draft: &GradeDraft) -> Result<Grade> {
        self.record("create", format!("grades.create {}", draft.student_id))?;
        Ok(self.insert_grade(draft.clone()))
    }

    async fn update(&self, id: i64, patch: &GradePatch) -> Result<Grade> {
        self.record("update", format!("grades.update {}", id))?;
        let mut grades = self.grades.lock().unwrap();
        let grade = grades
            .iter_mut()
            .find(|g| g.id == Some(id))
            .ok_or_else(|| AdminError::NotFound(format!("成绩 {}", id)))?;
        if let Some(v) = &patch.student_name {
            grade.student_name = v.clone();
        }
        if let Some(v) = &patch.exam_name {
            grade.exam_name = v.clone();
        }
        if let Some(v) = patch.course_id {
            grade.course_id = v;
        }
        if let Some(v) = patch.course_seq {
            grade.course_seq = v;
        }
        if let Some(v) = patch.student_id {
            grade.student_id = v;
        }
        if let Some(v) = patch.score {
            grade.score = v;
        }
        if let Some(v) = &patch.category {
            grade.category = v.clone();
        }
        Ok(grade.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.record("delete", format!("grades.delete {}", id))?;
        self.grades.lock().unwrap().retain(|g| g.id != Some(id));
        Ok(())
    }
}

#[async_trait]
impl GradeClient for MemoryBackend {
    async fn by_student(&self, student_id: i64) -> Result<Vec<Grade>> {
        self.record("by_student", format!("grades.by_student {}", student_id))?;
        Ok(self
            .grades
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConfigClient for MemoryBackend {
    async fn get(&self) -> Result<BotConfig> {
        self.record("config_get", "config.get".to_string())?;
        Ok(self.config())
    }

    async fn update(&self, config: &BotConfig) -> Result<String> {
        self.record("config_update", "config.update".to_string())?;
        *self.config.lock().unwrap() = config.clone();
        Ok("配置更新成功".to_string())
    }
}

/// 记录所有通知，便于断言提示内容和次数
#[derive(Default)]
pub(crate) struct RecordingListener {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingListener {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.text)
            .collect()
    }
}

#[async_trait]
impl NoticeListener for RecordingListener {
    async fn on_notice(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
