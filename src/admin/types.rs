use crate::admin::error::{AdminError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 分页列表响应：`{data, total, page, limit}`
///
/// `total` 是服务端总条数，与当前页无关；页数按 `ceil(total / limit)` 计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    #[serde(
        rename = "data",
        deserialize_with = "deserialize_vec_or_null",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    pub fn page_count(&self) -> u64 {
        page_count(self.total, self.limit)
    }
}

pub(crate) fn page_count(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// 从错误响应 body 中提取可读信息
///
/// 后端失败时通常返回一个 JSON 字符串（如 `"创建失败: ..."`），也可能是带
/// `message`/`error` 字段的对象，其余情况保留原文。
pub(crate) fn error_message_from_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        _ => body.trim().to_string(),
    }
}

/// 管理后台 REST 接口的 HTTP 传输层
///
/// 不做重试，也不做本地缓存；所有错误原样交给调用方。
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_base_url: String,
}

impl HttpTransport {
    /// `client` 应该已经在外部配置好超时等参数
    pub fn new(client: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn url(&self, path: &str) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn request(&self, method: reqwest::Method, path: &str, operation_name: &str) -> reqwest::RequestBuilder {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.url(path);
        debug!(
            "[HTTP] {} {} {}, 操作ID: {}",
            operation_name, method, url, operation_id
        );
        self.client
            .request(method, &url)
            .header("operationID", operation_id)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, operation_name: &str) -> Result<T> {
        let response = self
            .request(reqwest::Method::GET, path, operation_name)
            .send()
            .await
            .map_err(|e| send_failed(operation_name, e))?;
        let body = read_success_body(response, operation_name).await?;
        decode_json(&body, operation_name)
    }

    pub async fn send_json<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
        operation_name: &str,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path, operation_name)
            .json(body)
            .send()
            .await
            .map_err(|e| send_failed(operation_name, e))?;
        let body = read_success_body(response, operation_name).await?;
        decode_json(&body, operation_name)
    }

    /// 只关心状态码的请求（如 DELETE），忽略响应 body
    pub async fn send_empty(&self, method: reqwest::Method, path: &str, operation_name: &str) -> Result<()> {
        let response = self
            .request(method, path, operation_name)
            .send()
            .await
            .map_err(|e| send_failed(operation_name, e))?;
        read_success_body(response, operation_name).await?;
        Ok(())
    }

    /// 获取原始字节流（如 CSV 导出）
    pub async fn get_bytes(&self, path: &str, operation_name: &str) -> Result<Vec<u8>> {
        let response = self
            .request(reqwest::Method::GET, path, operation_name)
            .send()
            .await
            .map_err(|e| send_failed(operation_name, e))?;
        read_success_body(response, operation_name).await
    }
}

fn send_failed(operation_name: &str, e: reqwest::Error) -> AdminError {
    error!("[HTTP] {}请求发送失败: {}", operation_name, e);
    AdminError::Network(format!("{}请求失败: {}", operation_name, e))
}

const SECRET_KEYS: [&str; 5] = ["api_key", "apikey", "password", "token", "secret"];

fn redact_value(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                let key = key.to_ascii_lowercase();
                if SECRET_KEYS.iter().any(|secret| key.ends_with(secret)) {
                    *field = serde_json::Value::String("***".to_string());
                } else {
                    redact_value(field);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// 写日志前遮蔽 body 中的密钥类字段；非 JSON 原样返回
pub(crate) fn redact_secrets(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(mut value) if value.is_object() || value.is_array() => {
            redact_value(&mut value);
            value.to_string()
        }
        _ => body.to_string(),
    }
}

/// 读取 body 并按状态码分类：4xx 为校验错误，其余非 2xx 为网络错误
async fn read_success_body(response: reqwest::Response, operation_name: &str) -> Result<Vec<u8>> {
    let status = response.status();

    // body 只能读取一次
    let body_bytes = response.bytes().await.map_err(|e| {
        error!("[HTTP] {}读取响应 body 失败: {}", operation_name, e);
        AdminError::Network(format!("读取响应 body 失败: {}", e))
    })?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    let logged_body = redact_secrets(&body_str);
    debug!("[HTTP] {}响应 {}, Body: {}", operation_name, status, logged_body);

    if status.is_client_error() {
        error!(
            "[HTTP] {}请求被拒绝，HTTP状态: {}, 响应: {}",
            operation_name, status, logged_body
        );
        return Err(AdminError::Validation {
            status: status.as_u16(),
            message: error_message_from_body(&body_str),
        });
    }
    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, logged_body
        );
        return Err(AdminError::Network(format!(
            "HTTP 错误 {}: {}",
            status,
            error_message_from_body(&body_str)
        )));
    }

    Ok(body_bytes.to_vec())
}

fn decode_json<T: DeserializeOwned>(body: &[u8], operation_name: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name,
            e,
            redact_secrets(&String::from_utf8_lossy(body))
        );
        AdminError::Decode(format!("{}: {}", operation_name, e))
    })
}
