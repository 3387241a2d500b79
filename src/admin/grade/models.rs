//! 成绩模型定义

use crate::admin::error::{FormErrors, Result};
use crate::admin::resource::Resource;
use serde::{Deserialize, Serialize};

/// 表单中提供的成绩类别，仅作为选项，不做强制校验
pub const GRADE_CATEGORIES: [&str; 5] = ["Quiz-1", "Quiz-2", "Quiz-3", "Quiz-4", "Mid"];

/// 表单允许的分数范围
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

/// 成绩（与后台 GradeDto 对应）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(default)]
    pub id: Option<i64>,
    /// 展示用的学生姓名副本
    pub student_name: String,
    pub exam_name: String,
    pub course_id: i32,
    pub course_seq: i32,
    /// 引用 `Student::student_id`
    pub student_id: i64,
    pub score: i32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDraft {
    pub student_name: String,
    pub exam_name: String,
    pub course_id: i32,
    pub course_seq: i32,
    pub student_id: i64,
    pub score: i32,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_seq: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl GradePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeForm {
    pub student_name: Option<String>,
    pub exam_name: Option<String>,
    pub course_id: Option<i32>,
    pub course_seq: Option<i32>,
    pub student_id: Option<i64>,
    pub score: Option<i32>,
    pub category: Option<String>,
}

fn required_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl GradeForm {
    fn validate(&self) -> Result<GradeDraft> {
        let mut errors = FormErrors::default();
        let student_name = required_text(&self.student_name);
        let exam_name = required_text(&self.exam_name);
        let category = required_text(&self.category);

        if student_name.is_none() {
            errors.push("student_name", "请输入学生姓名");
        }
        if exam_name.is_none() {
            errors.push("exam_name", "请输入考试名称");
        }
        if self.course_id.is_none() {
            errors.push("course_id", "请输入课程号");
        }
        if self.course_seq.is_none() {
            errors.push("course_seq", "请输入课序号");
        }
        if self.student_id.is_none() {
            errors.push("student_id", "请选择学生");
        }
        match self.score {
            None => errors.push("score", "请输入成绩"),
            Some(s) if !SCORE_RANGE.contains(&s) => errors.push("score", "成绩必须在 0 到 100 之间"),
            Some(_) => {}
        }
        if category.is_none() {
            errors.push("category", "请选择类别");
        }
        errors.into_result(())?;

        Ok(GradeDraft {
            student_name: student_name.unwrap_or_default(),
            exam_name: exam_name.unwrap_or_default(),
            course_id: self.course_id.unwrap_or_default(),
            course_seq: self.course_seq.unwrap_or_default(),
            student_id: self.student_id.unwrap_or_default(),
            score: self.score.unwrap_or_default(),
            category: category.unwrap_or_default(),
        })
    }
}

impl Grade {
    pub fn draft(&self) -> GradeDraft {
        GradeDraft {
            student_name: self.student_name.clone(),
            exam_name: self.exam_name.clone(),
            course_id: self.course_id,
            course_seq: self.course_seq,
            student_id: self.student_id,
            score: self.score,
            category: self.category.clone(),
        }
    }
}

/// 成绩资源标记类型
#[derive(Debug, Clone, Copy)]
pub struct Grades;

impl Resource for Grades {
    const DISPLAY_NAME: &'static str = "成绩";
    const PATH: &'static str = "grades";

    type Entity = Grade;
    type Draft = GradeDraft;
    type Patch = GradePatch;
    type Form = GradeForm;

    fn entity_id(entity: &Grade) -> Option<i64> {
        entity.id
    }

    fn form_of(g: &Grade) -> GradeForm {
        GradeForm {
            student_name: Some(g.student_name.clone()),
            exam_name: Some(g.exam_name.clone()),
            course_id: Some(g.course_id),
            course_seq: Some(g.course_seq),
            student_id: Some(g.student_id),
            score: Some(g.score),
            category: Some(g.category.clone()),
        }
    }

    fn draft_from_form(form: &GradeForm) -> Result<GradeDraft> {
        form.validate()
    }

    fn patch_from_form(form: &GradeForm) -> Result<GradePatch> {
        let d = form.validate()?;
        Ok(GradePatch {
            student_name: Some(d.student_name),
            exam_name: Some(d.exam_name),
            course_id: Some(d.course_id),
            course_seq: Some(d.course_seq),
            student_id: Some(d.student_id),
            score: Some(d.score),
            category: Some(d.category),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::error::AdminError;

    fn full_form() -> GradeForm {
        GradeForm {
            student_name: Some("张三".into()),
            exam_name: Some("第一次小测".into()),
            course_id: Some(1001),
            course_seq: Some(2),
            student_id: Some(20210001),
            score: Some(88),
            category: Some("Quiz-1".into()),
        }
    }

    #[test]
    fn patch_with_score_is_not_empty() {
        assert!(GradePatch::default().is_empty());
        let patch = GradePatch {
            score: Some(60),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn score_outside_range_is_rejected() {
        let mut form = full_form();
        form.score = Some(101);
        let err = Grades::draft_from_form(&form).unwrap_err();
        assert!(matches!(err, AdminError::Form(ref e) if e.contains("score") && e.0.len() == 1));

        form.score = Some(100);
        assert_eq!(Grades::draft_from_form(&form).unwrap().score, 100);
    }

    #[test]
    fn category_outside_display_set_is_accepted() {
        let mut form = full_form();
        form.category = Some("Final".into());
        assert_eq!(Grades::draft_from_form(&form).unwrap().category, "Final");
    }

    #[test]
    fn patch_from_form_carries_every_field() {
        let patch = Grades::patch_from_form(&full_form()).unwrap();
        assert_eq!(patch.score, Some(88));
        assert_eq!(patch.category.as_deref(), Some("Quiz-1"));
    }
}
