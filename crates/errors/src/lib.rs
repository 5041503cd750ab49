//! warden-errors - 统一错误处理
//!
//! 错误码遵循 RFC 6749 §5.2 / RFC 6750 §3.1

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 服务端错误对外展示的固定描述
const SERVER_ERROR_DESCRIPTION: &str = "The authorization server encountered an unexpected condition";

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid client: {0}")]
    InvalidClient(String),

    #[error("Unauthorized client: {0}")]
    UnauthorizedClient(String),

    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    #[error("Invalid scope format: {0}")]
    InvalidScopeFormat(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    #[error("Unsupported response type: {0}")]
    UnsupportedResponseType(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Insufficient scope: {0}")]
    InsufficientScope(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Role cycle detected: {0}")]
    RoleCycle(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn invalid_client(msg: impl Into<String>) -> Self {
        Self::InvalidClient(msg.into())
    }

    pub fn unauthorized_client(msg: impl Into<String>) -> Self {
        Self::UnauthorizedClient(msg.into())
    }

    pub fn invalid_grant(msg: impl Into<String>) -> Self {
        Self::InvalidGrant(msg.into())
    }

    pub fn invalid_scope_format(msg: impl Into<String>) -> Self {
        Self::InvalidScopeFormat(msg.into())
    }

    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    pub fn unsupported_grant_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedGrantType(msg.into())
    }

    pub fn unsupported_response_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedResponseType(msg.into())
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn insufficient_scope(msg: impl Into<String>) -> Self {
        Self::InsufficientScope(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn role_cycle(msg: impl Into<String>) -> Self {
        Self::RoleCycle(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::InvalidClient(_) => 401,
            Self::UnauthorizedClient(_) => 400,
            Self::InvalidGrant(_) => 400,
            Self::InvalidScopeFormat(_) => 400,
            Self::InvalidScope(_) => 400,
            Self::UnsupportedGrantType(_) => 400,
            Self::UnsupportedResponseType(_) => 400,
            Self::AccessDenied(_) => 403,
            Self::InvalidToken(_) => 401,
            Self::InsufficientScope(_) => 403,
            Self::Conflict(_) => 409,
            Self::RoleCycle(_) => 500,
            Self::NotFound(_) => 404,
            Self::Storage(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// 转换为 OAuth2 错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidClient(_) => "invalid_client",
            Self::UnauthorizedClient(_) => "unauthorized_client",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::InvalidScopeFormat(_) | Self::InvalidScope(_) => "invalid_scope",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::UnsupportedResponseType(_) => "unsupported_response_type",
            Self::AccessDenied(_) => "access_denied",
            Self::InvalidToken(_) => "invalid_token",
            Self::InsufficientScope(_) => "insufficient_scope",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::RoleCycle(_) | Self::Storage(_) | Self::Internal(_) => "server_error",
        }
    }

    /// 是否可由调用方重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// 是否为服务端错误
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// 转换为 OAuth2 错误响应体
    pub fn to_error_response(&self) -> ErrorResponse {
        let description = match self {
            Self::RoleCycle(_) | Self::Storage(_) | Self::Internal(_) => {
                SERVER_ERROR_DESCRIPTION.to_string()
            }
            Self::InvalidRequest(msg)
            | Self::InvalidClient(msg)
            | Self::UnauthorizedClient(msg)
            | Self::InvalidGrant(msg)
            | Self::InvalidScopeFormat(msg)
            | Self::InvalidScope(msg)
            | Self::UnsupportedGrantType(msg)
            | Self::UnsupportedResponseType(msg)
            | Self::AccessDenied(msg)
            | Self::InvalidToken(msg)
            | Self::InsufficientScope(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg) => msg.clone(),
        };

        ErrorResponse {
            error: self.error_code().to_string(),
            error_description: description,
        }
    }
}

/// OAuth2 错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_description: String,
}

impl ErrorResponse {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error,
            "error_description": self.error_description,
        })
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
