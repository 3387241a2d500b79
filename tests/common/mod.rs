//! 集成测试共用的假管理后台
//!
//! 用 axum 在 127.0.0.1 的随机端口上提供与真实后台相同路径的接口，
//! 并记录收到的每一个请求供断言使用。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use qqbot_admin_client::{AdminClient, ClientConfig};

/// 学生总数，分页接口按此计算
pub const STUDENT_TOTAL: i64 = 23;
pub const MISSING_ID: i64 = 404;
pub const BROKEN_ID: i64 = 500;
pub const DUPLICATE_STUDENT_ID: i64 = 2024001;
pub const EXPORT_CSV: &str = "学号,姓名,QQ号,群号\n2024001,张三,10001,900\n";

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub uri: String,
    pub body: Value,
    pub operation_id: Option<String>,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Seen>>>);

impl Recorder {
    fn push(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Value) {
        let operation_id = headers
            .get("operationID")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(Seen {
            method,
            uri: uri.to_string(),
            body,
            operation_id,
        });
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Seen {
        self.requests().pop().expect("没有收到任何请求")
    }
}

pub fn student_json(id: i64) -> Value {
    json!({
        "id": id,
        "student_id": 2024000 + id,
        "name": format!("学生{}", id),
        "qq_number": 10000 + id,
        "group_id": 900,
        "created_at": "2024-09-01T08:00:00Z",
        "updated_at": null
    })
}

pub fn config_json() -> Value {
    json!({
        "logging_level": "info",
        "cmd_suffix": "/",
        "admins": ["10001", "10002"],
        "cache": {
            "cache_lifetime": "10m",
            "cache_capacity": 1000,
            "cache_idletime": "5m",
            "conversation_capacity": 100,
            "max_conversation_history": 20,
            "conversation_timeout_minutes": 30
        },
        "database": {
            "url": "sqlite://bot.db",
            "max_connections": 5,
            "connect_timeout": "8s",
            "acquire_timeout": "8s",
            "idle_timeout": "10m",
            "max_lifetime": "30m",
            "sqlx_logging": false
        },
        "llm": {
            "api_key": "sk-test",
            "base_url": "https://llm.example.com/v1",
            "model": "chat-small",
            "system_prompt": "你是助教",
            "temperature": 0.7,
            "max_tokens": 1024,
            "top_p": 0.9,
            "timeout_seconds": 60,
            "auto_capture_group_messages": true
        }
    })
}

async fn list_students(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    rec.push(Method::GET, &uri, &headers, Value::Null);
    let page: i64 = query.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let limit: i64 = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);

    let start = (page - 1) * limit + 1;
    let end = (page * limit).min(STUDENT_TOTAL);
    // 超出末页时后台返回 null 而不是空数组
    let data = if start > STUDENT_TOTAL {
        Value::Null
    } else {
        Value::Array((start..=end).map(student_json).collect())
    };
    Json(json!({"data": data, "total": STUDENT_TOTAL, "page": page, "limit": limit}))
}

async fn create_student(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    rec.push(Method::POST, &uri, &headers, body.clone());
    if body["student_id"] == json!(DUPLICATE_STUDENT_ID) {
        return (StatusCode::BAD_REQUEST, Json(json!("创建失败: 学号已存在"))).into_response();
    }
    let mut created = body;
    created["id"] = json!(99);
    Json(created).into_response()
}

async fn get_student(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    rec.push(Method::GET, &uri, &headers, Value::Null);
    if id == MISSING_ID {
        return (StatusCode::NOT_FOUND, Json(json!("学生不存在"))).into_response();
    }
    Json(student_json(id)).into_response()
}

async fn update_student(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push(Method::PUT, &uri, &headers, body.clone());
    let mut student = student_json(id);
    if let (Some(target), Some(patch)) = (student.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(student)
}

async fn delete_student(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    rec.push(Method::DELETE, &uri, &headers, Value::Null);
    if id == BROKEN_ID {
        return (StatusCode::INTERNAL_SERVER_ERROR, "数据库不可用").into_response();
    }
    StatusCode::OK.into_response()
}

async fn import_students(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push(Method::POST, &uri, &headers, body.clone());
    let rows = body["students"].as_array().cloned().unwrap_or_default();
    let mut errors = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if row["student_id"].is_null() {
            errors.push(format!("第{}行: 学号不能为空", i + 1));
        }
    }
    let success_count = rows.len() - errors.len();
    // 全部成功时后台返回 null
    let errors = if errors.is_empty() { Value::Null } else { json!(errors) };
    Json(json!({
        "success_count": success_count,
        "total_count": rows.len(),
        "errors": errors
    }))
}

async fn export_students(State(rec): State<Recorder>, uri: Uri, headers: HeaderMap) -> Response {
    rec.push(Method::GET, &uri, &headers, Value::Null);
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], EXPORT_CSV).into_response()
}

async fn bulk_message(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push(Method::POST, &uri, &headers, body.clone());
    let count = body["student_ids"].as_array().map(Vec::len).unwrap_or(0);
    Json(json!({"success_count": count, "message": "发送完成"}))
}

async fn grades_of_student(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Path(student_id): Path<i64>,
) -> Json<Value> {
    rec.push(Method::GET, &uri, &headers, Value::Null);
    Json(json!([
        {
            "id": 1,
            "student_name": "张三",
            "exam_name": "第一次测验",
            "course_id": 101,
            "course_seq": 1,
            "student_id": student_id,
            "score": 88,
            "category": "Quiz-1"
        },
        {
            "id": 2,
            "student_name": "张三",
            "exam_name": "期中",
            "course_id": 101,
            "course_seq": 1,
            "student_id": student_id,
            "score": 92,
            "category": "Mid"
        }
    ]))
}

async fn get_config(State(rec): State<Recorder>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    rec.push(Method::GET, &uri, &headers, Value::Null);
    Json(config_json())
}

async fn put_config(
    State(rec): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push(Method::PUT, &uri, &headers, body);
    Json(json!("配置更新成功"))
}

/// 启动假后台，返回 API 基础地址和请求记录
pub async fn spawn_backend() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/import", post(import_students))
        .route("/api/students/export", get(export_students))
        .route("/api/students/bulk-message", post(bulk_message))
        .route(
            "/api/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/api/grades/student/{student_id}", get(grades_of_student))
        .route("/api/config", get(get_config).put(put_config))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), recorder)
}

pub async fn connect() -> (AdminClient, Recorder) {
    let (base_url, recorder) = spawn_backend().await;
    let client = AdminClient::new(
        ClientConfig::new(base_url).with_timeout(Duration::from_secs(5)),
    )
    .unwrap();
    (client, recorder)
}
