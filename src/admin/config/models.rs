//! 机器人运行配置模型
//!
//! 配置是单例：没有 id，只能整体读取、整体替换。

use crate::admin::error::{FormErrors, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub logging_level: String,
    pub cmd_suffix: String,
    /// 管理员 ID 列表，保持原有顺序
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// 缓存子系统参数，时长为 humantime 格式文本（如 "10m"）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub cache_lifetime: String,
    pub cache_capacity: u32,
    pub cache_idletime: String,
    pub conversation_capacity: u32,
    pub max_conversation_history: u32,
    pub conversation_timeout_minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: String,
    pub acquire_timeout: String,
    pub idle_timeout: String,
    pub max_lifetime: String,
    pub sqlx_logging: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub timeout_seconds: u32,
    /// 是否自动收录群聊消息
    #[serde(default)]
    pub auto_capture_group_messages: bool,
}

/// 每行一个管理员 ID，忽略空行
pub fn admins_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn admins_to_text(admins: &[String]) -> String {
    admins.join("\n")
}

fn require(errors: &mut FormErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

fn at_least_one(errors: &mut FormErrors, field: &'static str, value: u32) {
    if value < 1 {
        errors.push(field, format!("{} 不能小于 1", field));
    }
}

impl BotConfig {
    /// 提交前的本地校验，规则与配置页面表单一致
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::default();
        require(&mut errors, "logging_level", &self.logging_level, "请输入日志级别");
        require(&mut errors, "cmd_suffix", &self.cmd_suffix, "请输入命令后缀");
        require(&mut errors, "database.url", &self.database.url, "请输入数据库连接URL");
        require(&mut errors, "llm.api_key", &self.llm.api_key, "请输入API密钥");
        require(&mut errors, "llm.base_url", &self.llm.base_url, "请输入API基础URL");
        require(&mut errors, "llm.model", &self.llm.model, "请输入模型名称");
        require(&mut errors, "llm.system_prompt", &self.llm.system_prompt, "请输入系统提示");

        at_least_one(&mut errors, "cache.cache_capacity", self.cache.cache_capacity);
        at_least_one(&mut errors, "cache.conversation_capacity", self.cache.conversation_capacity);
        at_least_one(&mut errors, "cache.max_conversation_history", self.cache.max_conversation_history);
        at_least_one(
            &mut errors,
            "cache.conversation_timeout_minutes",
            self.cache.conversation_timeout_minutes,
        );
        at_least_one(&mut errors, "database.max_connections", self.database.max_connections);
        at_least_one(&mut errors, "llm.max_tokens", self.llm.max_tokens);
        at_least_one(&mut errors, "llm.timeout_seconds", self.llm.timeout_seconds);

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.push("llm.temperature", "温度必须在 0 到 2 之间");
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            errors.push("llm.top_p", "Top P 必须在 0 到 1 之间");
        }
        errors.into_result(())
    }
}

#[cfg(test)]
pub(crate) fn sample_config() -> BotConfig {
    BotConfig {
        logging_level: "info".into(),
        cmd_suffix: "/".into(),
        admins: vec!["10001".into(), "10002".into()],
        cache: CacheConfig {
            cache_lifetime: "10m".into(),
            cache_capacity: 1000,
            cache_idletime: "5m".into(),
            conversation_capacity: 100,
            max_conversation_history: 20,
            conversation_timeout_minutes: 30,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/qqbot".into(),
            max_connections: 10,
            connect_timeout: "5s".into(),
            acquire_timeout: "5s".into(),
            idle_timeout: "10m".into(),
            max_lifetime: "30m".into(),
            sqlx_logging: false,
        },
        llm: LlmConfig {
            api_key: "sk-test".into(),
            base_url: "https://api.siliconflow.cn/v1".into(),
            model: "Qwen/Qwen2.5-7B-Instruct".into(),
            system_prompt: "你是课程助教".into(),
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 0.9,
            timeout_seconds: 60,
            auto_capture_group_messages: true,
        },
    }
}
