//! 学生名单 CSV 编解码
//!
//! 固定列：`student_id,name,qq_number,group_id`，第一行是表头。
//! 不支持引号和转义，姓名中不能包含逗号。
//!
//! 宽松模式下数值字段取开头的整数部分（`"12abc"` 读作 12），没有数字时为空；
//! 严格模式要求整个字段都是整数。

use crate::admin::error::{AdminError, FormErrors, Result};
use crate::admin::student::models::StudentDraft;
use crate::admin::student::types::ImportRecord;
use tracing::{debug, warn};

pub const CSV_HEADER: [&str; 4] = ["student_id", "name", "qq_number", "group_id"];

/// 导出文件的默认名称
pub const EXPORT_FILE_NAME: &str = "students.csv";

/// 数值字段解析失败时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// 保留整行，解析失败的字段置空
    #[default]
    BestEffort,
    /// 任意数值字段解析失败即拒绝整个文件，并给出行号
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec {
    mode: ParseMode,
}

fn parse_int(field: Option<&str>, mode: ParseMode) -> Option<i64> {
    let s = field?.trim();
    match mode {
        ParseMode::Strict => s.parse::<i64>().ok(),
        ParseMode::BestEffort => {
            let start = usize::from(s.starts_with(['+', '-']));
            let end = s[start..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(s.len(), |i| start + i);
            if end == start {
                return None;
            }
            // 溢出时为空
            s[..end].parse::<i64>().ok()
        }
    }
}

impl CsvCodec {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(ParseMode::Strict)
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// 解析 CSV 文本；空行跳过，第一条非空行视为表头丢弃
    pub fn decode(&self, text: &str) -> Result<Vec<ImportRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        let mut errors = FormErrors::default();
        let mut header_seen = false;

        for row in reader.records() {
            let row = row.map_err(|e| AdminError::Decode(format!("CSV读取错误: {}", e)))?;
            if row.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            if !header_seen {
                header_seen = true;
                continue;
            }
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let record = ImportRecord {
                student_id: parse_int(row.get(0), self.mode),
                name: row.get(1).map(str::trim).unwrap_or_default().to_string(),
                qq_number: parse_int(row.get(2), self.mode),
                group_id: parse_int(row.get(3), self.mode),
            };
            if !record.is_complete() {
                warn!("[CSV] 第{}行存在无法解析的数值字段: {:?}", line, record);
                if self.mode == ParseMode::Strict {
                    errors.push("csv", format!("第{}行: 数值字段无法解析", line));
                }
            }
            records.push(record);
        }

        debug!("[CSV] 解析完成，记录数: {}", records.len());
        errors.into_result(records)
    }

    /// 按固定列顺序输出，附带表头
    pub fn encode(&self, drafts: &[StudentDraft]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());

        let write_err = |e: csv::Error| AdminError::Decode(format!("CSV写入错误: {}", e));
        writer.write_record(CSV_HEADER).map_err(write_err)?;
        for d in drafts {
            writer
                .write_record([
                    d.student_id.to_string(),
                    d.name.clone(),
                    d.qq_number.to_string(),
                    d.group_id.to_string(),
                ])
                .map_err(write_err)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AdminError::Decode(format!("CSV生成错误: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AdminError::Decode(format!("CSV编码错误: {}", e)))
    }
}
