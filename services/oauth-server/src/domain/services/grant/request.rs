//! 授权请求与结果

use secrecy::SecretString;
use warden_common::UserId;

use crate::domain::oauth::{AuthorizationCode, GrantType, Token};
use crate::domain::scope::ScopeSet;
use crate::domain::services::ScopeResolution;

/// 客户端提交的认证信息
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Option<SecretString>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.map(SecretString::new),
        }
    }
}

/// token 端点请求，参数已完成格式校验
#[derive(Debug, Clone)]
pub enum GrantRequest {
    AuthorizationCode {
        code: String,
        redirect_uri: Option<String>,
        code_verifier: Option<String>,
    },
    Password {
        username: String,
        password: SecretString,
        scope: ScopeSet,
    },
    ClientCredentials {
        scope: ScopeSet,
    },
    RefreshToken {
        refresh_token: String,
        scope: ScopeSet,
    },
}

impl GrantRequest {
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::Password { .. } => GrantType::Password,
            Self::ClientCredentials { .. } => GrantType::ClientCredentials,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }
}

/// 授权端点请求
///
/// 参数按原样保存，在客户端解析之后再逐项校验。
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub response_type: String,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    /// 已登录的资源所有者
    pub user_id: Option<UserId>,
    /// 资源所有者是否同意授权
    pub approved: bool,
}

/// 签发结果
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: Token,
    pub resolution: ScopeResolution,
}

/// 授权端点结果
#[derive(Debug, Clone)]
pub enum AuthorizationOutcome {
    Code {
        code: AuthorizationCode,
        redirect_uri: String,
        state: Option<String>,
    },
    Token {
        issued: IssuedToken,
        redirect_uri: String,
        state: Option<String>,
    },
}
