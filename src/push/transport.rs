//! HTTP 传输层
//!
//! 渠道只构造 `HttpRequest`，真正的网络调用由 `HttpTransport` 完成，
//! 测试中可以替换为 mock。

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::PushError;

/// 默认 HTTP 超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// 一次 HTTP 请求
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            json: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            json: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 设置 Bearer token；空 token 不加 header
    pub fn bearer(self, token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(t) if !t.is_empty() => self.header("Authorization", format!("Bearer {}", t)),
            _ => self,
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// HTTP 响应
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, PushError> {
        serde_json::from_str(&self.body)
            .map_err(|e| PushError::rejected(format!("unparseable response body: {}", e)))
    }
}

/// HTTP 传输抽象
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, PushError>;
}

/// 基于 reqwest blocking client 的传输实现
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, PushError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PushError::transport(format!("cannot create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, PushError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let start = std::time::Instant::now();
        let response = builder.send().map_err(|e| {
            let method = method_name(request.method);
            PushError::transport(format!("{} {}: {}", method, request.url, e))
        })?;
        debug!(
            url = %request.url,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "HTTP request completed"
        );

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| PushError::transport(format!("failed to read response: {}", e)))?;
        Ok(HttpResponse { status, body })
    }
}

fn method_name(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
    }
}

/// 拼接服务端地址和路径，忽略多余的 `/`
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// 发送请求并要求 2xx 状态码
pub fn send_checked(
    transport: &dyn HttpTransport,
    request: &HttpRequest,
) -> Result<HttpResponse, PushError> {
    let response = transport.execute(request)?;
    debug!(url = %request.url, status = response.status, body = %response.body, "Gateway response");
    if !response.is_success() {
        return Err(PushError::Status {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response)
}

/// 检查响应体中的业务码，例如 `{"code": 200}` 或 `{"retcode": 0}`
pub fn expect_code(response: &HttpResponse, field: &str, expected: i64) -> Result<(), PushError> {
    let json = response.json()?;
    match json.get(field).and_then(Value::as_i64) {
        Some(code) if code == expected => Ok(()),
        Some(code) => Err(PushError::rejected(format!(
            "{} = {} (expected {}): {}",
            field, code, expected, response.body
        ))),
        None => Err(PushError::rejected(format!(
            "missing `{}` in response: {}",
            field, response.body
        ))),
    }
}
