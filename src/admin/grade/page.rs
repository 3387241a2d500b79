//! 成绩管理页面

use crate::admin::error::Result;
use crate::admin::grade::api::GradeClient;
use crate::admin::grade::models::{Grade, Grades};
use crate::admin::listener::{EmptyNoticeListener, Notice, NoticeListener};
use crate::admin::page::ResourcePage;
use crate::admin::pagination::PaginationController;
use crate::admin::resource::ResourceClient;
use crate::admin::student::models::{Student, Students};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// 选择学生的下拉框一次拉取的名单上限
pub const ROSTER_LIMIT: u64 = 1000;

pub struct GradePage {
    page: ResourcePage<Grades>,
    grades: Arc<dyn GradeClient>,
    students: Arc<dyn ResourceClient<Students>>,
    listener: Arc<dyn NoticeListener>,
    roster: Mutex<Vec<Student>>,
}

impl GradePage {
    pub fn new<G, S>(grades: Arc<G>, students: Arc<S>) -> Self
    where
        G: GradeClient + 'static,
        S: ResourceClient<Students> + 'static,
    {
        Self::with_listener(
            grades,
            students,
            PaginationController::default(),
            Arc::new(EmptyNoticeListener),
        )
    }

    pub fn with_listener<G, S>(
        grades: Arc<G>,
        students: Arc<S>,
        pagination: PaginationController,
        listener: Arc<dyn NoticeListener>,
    ) -> Self
    where
        G: GradeClient + 'static,
        S: ResourceClient<Students> + 'static,
    {
        Self {
            page: ResourcePage::<Grades>::with_listener(grades.clone(), pagination, listener.clone()),
            grades,
            students,
            listener,
            roster: Mutex::new(Vec::new()),
        }
    }

    pub fn list(&self) -> &ResourcePage<Grades> {
        &self.page
    }

    /// 刷新成绩列表和学生名单
    pub async fn load(&self) -> Result<()> {
        let grades = self.page.refresh().await;
        let roster = self.load_roster().await;
        grades.and(roster)
    }

    pub async fn load_roster(&self) -> Result<()> {
        match self.students.list(1, ROSTER_LIMIT).await {
            Ok(page) => {
                *self.roster.lock().await = page.items;
                Ok(())
            }
            Err(e) => {
                error!("[GradePage] 获取学生名单失败: {}", e);
                self.listener.on_notice(Notice::error("获取学生列表失败")).await;
                Err(e)
            }
        }
    }

    pub async fn roster(&self) -> Vec<Student> {
        self.roster.lock().await.clone()
    }

    /// 学生下拉框选项：`(学号, "姓名 (学号)")`
    pub async fn student_options(&self) -> Vec<(i64, String)> {
        self.roster
            .lock()
            .await
            .iter()
            .map(|s| (s.student_id, s.label()))
            .collect()
    }

    pub async fn by_student(&self, student_id: i64) -> Result<Vec<Grade>> {
        match self.grades.by_student(student_id).await {
            Ok(grades) => Ok(grades),
            Err(e) => {
                error!("[GradePage] 查询学号 {} 的成绩失败: {}", student_id, e);
                self.listener.on_notice(Notice::error("获取成绩列表失败")).await;
                Err(e)
            }
        }
    }
}
