use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use url::Url;
use warden_common::UserId;
use warden_errors::AppError;

/// OAuth 端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Authorize,
    Token,
    Revoke,
    Introspect,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Authorize,
        Endpoint::Token,
        Endpoint::Revoke,
        Endpoint::Introspect,
    ];

    /// 前缀之后的路径
    pub fn path(&self) -> &'static str {
        match self {
            Self::Authorize => "/authorize",
            Self::Token => "/token",
            Self::Revoke => "/revoke",
            Self::Introspect => "/introspect",
        }
    }

    pub fn allows(&self, method: Method) -> bool {
        match self {
            Self::Authorize => true,
            Self::Token | Self::Revoke | Self::Introspect => method == Method::Post,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path()[1..])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl FromStr for Method {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Self::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(Self::Post)
        } else {
            Err(AppError::invalid_request(format!("Method {} is not allowed", s)))
        }
    }
}

/// 已解析的端点请求
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    pub method: Method,
    /// query 与表单参数
    pub params: HashMap<String, String>,
    /// `Authorization` 请求头
    pub authorization: Option<String>,
    /// 宿主已认证的资源所有者
    pub user_id: Option<UserId>,
    /// 资源所有者是否同意授权
    pub approved: bool,
}

impl EndpointRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            params: HashMap::new(),
            authorization: None,
            user_id: None,
            approved: false,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// 资源所有者登录并同意授权
    pub fn approved_by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self.approved = true;
        self
    }

    /// 读取参数，空字符串视为缺省
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn param_owned(&self, name: &str) -> Option<String> {
        self.param(name).map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(serde_json::Value),
}

/// 端点响应
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl EndpointResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: ResponseBody::Json(value),
        }
    }

    pub fn redirect(location: &Url) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: ResponseBody::Empty,
        }
    }

    /// OAuth2 错误响应
    pub fn error(err: &AppError) -> Self {
        let mut response = Self::json(err.to_error_response().to_json());
        response.status = err.status_code();
        if matches!(err, AppError::InvalidClient(_)) {
            response = response.with_header("WWW-Authenticate", "Basic realm=\"oauth\"");
        } else if matches!(err, AppError::InvalidToken(_) | AppError::InsufficientScope(_)) {
            response = response.with_header(
                "WWW-Authenticate",
                format!("Bearer error=\"{}\"", err.error_code()),
            );
        }
        response
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 禁止缓存（RFC 6749 §5.1）
    pub fn no_store(self) -> Self {
        self.with_header("Cache-Control", "no-store")
            .with_header("Pragma", "no-cache")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Empty => None,
        }
    }
}

/// 端点处理器
#[async_trait]
pub trait EndpointHandler: Send + Sync {
    async fn handle(&self, request: EndpointRequest) -> EndpointResponse;
}
