//! QQ 机器人管理后台命令行客户端
//!
//! 每次执行一个子命令，结果以格式化 JSON 输出到 stdout，提示信息输出到 stderr。

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use qqbot_admin_client::admin::config::BotConfig;
use qqbot_admin_client::admin::csv_codec::{ParseMode, EXPORT_FILE_NAME};
use qqbot_admin_client::admin::grade::models::GRADE_CATEGORIES;
use qqbot_admin_client::admin::grade::{GradeForm, GradePatch};
use qqbot_admin_client::admin::listener::{Notice, NoticeLevel, NoticeListener};
use qqbot_admin_client::admin::resource::ResourceClient;
use qqbot_admin_client::admin::student::{StudentForm, StudentPatch};
use qqbot_admin_client::{AdminClient, ClientConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// QQ 机器人管理后台命令行客户端
#[derive(Parser, Debug)]
#[command(name = "qqbot-admin")]
#[command(about = "QQ 机器人管理后台客户端 - 学生、成绩和机器人配置管理", long_about = None)]
struct Args {
    /// 管理后台 API 地址（默认读取 QQBOT_ADMIN_API，否则 http://localhost:8080/api）
    #[arg(long, global = true)]
    api: Option<String>,

    /// 请求超时（秒），默认读取 QQBOT_ADMIN_TIMEOUT_SECS，否则 30
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// 日志级别，设置了 RUST_LOG 时以 RUST_LOG 为准
    #[arg(long, global = true, default_value = "warn,qqbot_admin_client=info")]
    log_level: String,

    /// 额外把日志写入该文件（追加模式）
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 学生管理
    #[command(subcommand)]
    Students(StudentCommand),
    /// 成绩管理
    #[command(subcommand)]
    Grades(GradeCommand),
    /// 机器人配置
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(ClapArgs, Debug)]
struct PageArgs {
    /// 页码，从 1 开始
    #[arg(long, default_value = "1")]
    page: u64,

    /// 每页条数
    #[arg(long, default_value = "10")]
    limit: u64,
}

#[derive(ClapArgs, Debug)]
struct StudentFields {
    #[arg(long)]
    student_id: Option<i64>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    qq: Option<i64>,
    #[arg(long)]
    group: Option<i64>,
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    /// 分页列出学生
    List(PageArgs),
    /// 按 id 查询学生
    Get { id: i64 },
    /// 添加学生（所有字段必填）
    Create(StudentFields),
    /// 修改学生，只发送给出的字段
    Update {
        id: i64,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// 删除学生
    Delete { id: i64 },
    /// 从 CSV 文件导入学生
    Import {
        file: PathBuf,
        /// 数值字段无法解析时拒绝整个文件
        #[arg(long)]
        strict: bool,
    },
    /// 导出学生到 CSV 文件
    Export {
        #[arg(long, default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
    /// 给选中的学生群发消息
    Message {
        /// 学号，可重复指定，也可用逗号分隔
        #[arg(long = "id", value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// 消息内容
        #[arg(long)]
        text: String,
    },
}

#[derive(ClapArgs, Debug)]
struct GradeFields {
    #[arg(long)]
    student_name: Option<String>,
    #[arg(long)]
    exam_name: Option<String>,
    #[arg(long)]
    course_id: Option<i32>,
    #[arg(long)]
    course_seq: Option<i32>,
    #[arg(long)]
    student_id: Option<i64>,
    /// 成绩，0 到 100
    #[arg(long)]
    score: Option<i32>,
    #[arg(long, value_parser = GRADE_CATEGORIES)]
    category: Option<String>,
}

#[derive(Subcommand, Debug)]
enum GradeCommand {
    /// 分页列出成绩
    List(PageArgs),
    /// 按 id 查询成绩
    Get { id: i64 },
    /// 录入成绩（所有字段必填）
    Create(GradeFields),
    /// 修改成绩，只发送给出的字段
    Update {
        id: i64,
        #[command(flatten)]
        fields: GradeFields,
    },
    /// 删除成绩
    Delete { id: i64 },
    /// 查询某个学生的全部成绩
    ByStudent { student_id: i64 },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// 读取当前配置
    Get,
    /// 用 JSON 文件整体替换配置
    Set { file: PathBuf },
}

/// 初始化日志：stdout 之外可选写入文件
fn init_logger(log_level: &str, log_file: Option<&PathBuf>) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout 留给 JSON 结果，日志输出到 stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("无法创建日志文件 {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// 把页面提示打印到 stderr
struct CliNoticeListener;

#[async_trait::async_trait]
impl NoticeListener for CliNoticeListener {
    async fn on_notice(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => eprintln!("✅ {}", notice.text),
            NoticeLevel::Warning => eprintln!("⚠️ {}", notice.text),
            NoticeLevel::Error => eprintln!("❌ {}", notice.text),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn student_form(fields: StudentFields) -> StudentForm {
    StudentForm {
        student_id: fields.student_id,
        name: fields.name,
        qq_number: fields.qq,
        group_id: fields.group,
    }
}

fn grade_form(fields: GradeFields) -> GradeForm {
    GradeForm {
        student_name: fields.student_name,
        exam_name: fields.exam_name,
        course_id: fields.course_id,
        course_seq: fields.course_seq,
        student_id: fields.student_id,
        score: fields.score,
        category: fields.category,
    }
}

/// 修改命令至少要给出一个字段，否则不发请求
fn student_patch(fields: StudentFields) -> Result<StudentPatch> {
    let patch = StudentPatch {
        student_id: fields.student_id,
        name: fields.name,
        qq_number: fields.qq,
        group_id: fields.group,
    };
    if patch.is_empty() {
        anyhow::bail!("没有指定任何要修改的字段");
    }
    Ok(patch)
}

fn grade_patch(fields: GradeFields) -> Result<GradePatch> {
    let patch = GradePatch {
        student_name: fields.student_name,
        exam_name: fields.exam_name,
        course_id: fields.course_id,
        course_seq: fields.course_seq,
        student_id: fields.student_id,
        score: fields.score,
        category: fields.category,
    };
    if patch.is_empty() {
        anyhow::bail!("没有指定任何要修改的字段");
    }
    Ok(patch)
}

async fn run_students(client: &AdminClient, command: StudentCommand) -> Result<()> {
    let listener: Arc<dyn NoticeListener> = Arc::new(CliNoticeListener);
    let api = client.students();

    match command {
        StudentCommand::List(p) => print_json(&api.list(p.page, p.limit).await?),
        StudentCommand::Get { id } => print_json(&api.get(id).await?),
        StudentCommand::Create(fields) => {
            // 经过页面表单，先做本地必填校验
            let page = client.student_page(listener);
            page.list().open_create().await;
            print_json(&page.list().submit(student_form(fields)).await?)
        }
        StudentCommand::Update { id, fields } => {
            let patch = student_patch(fields)?;
            print_json(&api.update(id, &patch).await?)
        }
        StudentCommand::Delete { id } => {
            api.delete(id).await?;
            info!("[CLI] 🗑️ 已删除学生 {}", id);
            Ok(())
        }
        StudentCommand::Import { file, strict } => {
            let mode = if strict { ParseMode::Strict } else { ParseMode::BestEffort };
            let page = client.student_page(listener).with_parse_mode(mode);
            print_json(&page.import_file(&file).await?)
        }
        StudentCommand::Export { out } => {
            let page = client.student_page(listener);
            let written = page.export_to(&out).await?;
            info!("[CLI] 📄 已导出 {} 字节到 {}", written, out.display());
            Ok(())
        }
        StudentCommand::Message { ids, text } => {
            let page = client.bulk_message_page(listener);
            page.set_selected(ids).await;
            print_json(&page.send(&text).await?)
        }
    }
}

async fn run_grades(client: &AdminClient, command: GradeCommand) -> Result<()> {
    let listener: Arc<dyn NoticeListener> = Arc::new(CliNoticeListener);
    let api = client.grades();

    match command {
        GradeCommand::List(p) => print_json(&api.list(p.page, p.limit).await?),
        GradeCommand::Get { id } => print_json(&api.get(id).await?),
        GradeCommand::Create(fields) => {
            let page = client.grade_page(listener);
            page.list().open_create().await;
            print_json(&page.list().submit(grade_form(fields)).await?)
        }
        GradeCommand::Update { id, fields } => {
            let patch = grade_patch(fields)?;
            print_json(&api.update(id, &patch).await?)
        }
        GradeCommand::Delete { id } => {
            api.delete(id).await?;
            info!("[CLI] 🗑️ 已删除成绩 {}", id);
            Ok(())
        }
        GradeCommand::ByStudent { student_id } => {
            let page = client.grade_page(listener);
            print_json(&page.by_student(student_id).await?)
        }
    }
}

async fn run_config(client: &AdminClient, command: ConfigCommand) -> Result<()> {
    let page = client.config_page(Arc::new(CliNoticeListener));

    match command {
        ConfigCommand::Get => print_json(&page.load().await?),
        ConfigCommand::Set { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("读取配置文件 {} 失败", file.display()))?;
            let config: BotConfig = serde_json::from_str(&text)
                .with_context(|| format!("配置文件 {} 不是有效的 JSON", file.display()))?;
            let status = page.save(config).await?;
            println!("{}", status);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level, args.log_file.as_ref())?;

    let mut config = ClientConfig::from_env();
    if let Some(api) = args.api {
        config.api_base_url = api;
    }
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    info!("[CLI] 🚀 管理后台: {}", config.api_base_url);

    let client = AdminClient::new(config)?;
    let result = match args.command {
        Command::Students(command) => run_students(&client, command).await,
        Command::Grades(command) => run_grades(&client, command).await,
        Command::Config(command) => run_config(&client, command).await,
    };

    if let Err(e) = &result {
        error!("[CLI] ❌ 执行失败: {:#}", e);
    }
    result
}
