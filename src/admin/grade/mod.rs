//! 成绩模块

pub mod api;
pub mod models;
pub mod page;

pub use api::{GradeApi, GradeClient};
pub use models::{Grade, GradeDraft, GradeForm, GradePatch, Grades, GRADE_CATEGORIES};
pub use page::GradePage;
