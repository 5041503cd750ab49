//! OAuth Client 实体

use rand::RngCore;
use serde::{Deserialize, Serialize};
use url::Url;
use warden_common::AuditInfo;
use warden_domain_core::{AggregateRoot, Entity};
use warden_errors::AppError;

use crate::domain::capabilities::{Authenticatable, ScopeBearing};
use crate::domain::role::{RoleGraph, RoleGraphError};
use crate::domain::scope::ScopeSet;

use super::grant_type::GrantType;

/// client_id 随机字节数（十六进制编码后 48 个字符）
const CLIENT_ID_BYTES: usize = 24;
/// client_secret 随机字节数（十六进制编码后 120 个字符）
const CLIENT_SECRET_BYTES: usize = 60;

/// 生成随机 client_id
pub fn generate_client_id() -> String {
    random_hex(CLIENT_ID_BYTES)
}

/// 生成随机 client_secret（明文，仅返回给注册方一次）
pub fn generate_client_secret() -> String {
    random_hex(CLIENT_SECRET_BYTES)
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// OAuth Client ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OAuthClientId(pub String);

impl OAuthClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 生成随机 ID
    pub fn generate() -> Self {
        Self(generate_client_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OAuthClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// OAuth Client 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OAuthClientType {
    /// 机密客户端（有 client_secret）
    Confidential,
    /// 公开客户端（无 client_secret，如 SPA、移动应用）
    Public,
}

/// OAuth Client 错误
#[derive(Debug, thiserror::Error)]
pub enum OAuthClientError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<OAuthClientError> for AppError {
    fn from(err: OAuthClientError) -> Self {
        AppError::invalid_request(err.to_string())
    }
}

/// OAuth Client 实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClient {
    pub id: OAuthClientId,
    pub name: String,
    /// Client Secret（哈希后），公开客户端为 `None`
    pub client_secret_hash: Option<String>,
    pub client_type: OAuthClientType,
    pub grant_types: Vec<GrantType>,
    /// 已登记的重定向 URI，第一个为默认值
    pub redirect_uris: Vec<String>,
    /// 客户端可能获得的 scope 上限
    pub allowed_scopes: ScopeSet,
    pub is_active: bool,
    pub audit_info: AuditInfo,
}

impl OAuthClient {
    /// 创建机密客户端
    pub fn confidential(
        id: OAuthClientId,
        name: impl Into<String>,
        client_secret_hash: String,
        redirect_uris: Vec<String>,
    ) -> Result<Self, OAuthClientError> {
        let mut client = Self::build(id, name.into(), OAuthClientType::Confidential, redirect_uris)?;
        client.client_secret_hash = Some(client_secret_hash);
        Ok(client)
    }

    /// 创建公开客户端
    pub fn public(
        id: OAuthClientId,
        name: impl Into<String>,
        redirect_uris: Vec<String>,
    ) -> Result<Self, OAuthClientError> {
        Self::build(id, name.into(), OAuthClientType::Public, redirect_uris)
    }

    fn build(
        id: OAuthClientId,
        name: String,
        client_type: OAuthClientType,
        redirect_uris: Vec<String>,
    ) -> Result<Self, OAuthClientError> {
        if id.as_str().is_empty() {
            return Err(OAuthClientError::Validation("Client ID cannot be empty".to_string()));
        }
        if name.is_empty() {
            return Err(OAuthClientError::Validation("Client name cannot be empty".to_string()));
        }
        for uri in &redirect_uris {
            Self::validate_redirect_uri(uri)?;
        }

        Ok(Self {
            id,
            name,
            client_secret_hash: None,
            client_type,
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            redirect_uris,
            allowed_scopes: ScopeSet::empty(),
            is_active: true,
            audit_info: AuditInfo::default(),
        })
    }

    pub fn with_grant_types(mut self, grant_types: Vec<GrantType>) -> Self {
        self.grant_types = grant_types;
        self
    }

    pub fn with_allowed_scopes(mut self, allowed_scopes: ScopeSet) -> Self {
        self.allowed_scopes = allowed_scopes;
        self
    }

    /// 验证重定向 URI：必须是 HTTPS 或本机地址，且不能包含 fragment
    pub fn validate_redirect_uri(uri: &str) -> Result<(), OAuthClientError> {
        let parsed = Url::parse(uri).map_err(|e| {
            OAuthClientError::Validation(format!("Redirect URI '{}' is not absolute: {}", uri, e))
        })?;

        let loopback = matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1"));
        if parsed.scheme() != "https" && !(parsed.scheme() == "http" && loopback) {
            return Err(OAuthClientError::Validation(
                "Redirect URI must use HTTPS or be localhost".to_string(),
            ));
        }

        if parsed.fragment().is_some() {
            return Err(OAuthClientError::Validation(
                "Redirect URI cannot contain fragment".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_public(&self) -> bool {
        self.client_type == OAuthClientType::Public
    }

    /// 验证重定向 URI 是否在允许列表中
    pub fn validate_redirect_uri_match(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    pub fn default_redirect_uri(&self) -> Option<&str> {
        self.redirect_uris.first().map(String::as_str)
    }

    /// 验证授权类型是否允许
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// 轮换 Client Secret
    pub fn rotate_client_secret(&mut self, new_secret_hash: String) {
        self.client_secret_hash = Some(new_secret_hash);
        self.touch();
    }

    /// 更新重定向 URI 与 scope 上限
    pub fn update(
        &mut self,
        redirect_uris: Option<Vec<String>>,
        allowed_scopes: Option<ScopeSet>,
    ) -> Result<(), OAuthClientError> {
        if let Some(uris) = redirect_uris {
            for uri in &uris {
                Self::validate_redirect_uri(uri)?;
            }
            self.redirect_uris = uris;
        }

        if let Some(scopes) = allowed_scopes {
            self.allowed_scopes = scopes;
        }

        self.touch();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }
}

impl Entity for OAuthClient {
    type Id = OAuthClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for OAuthClient {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl Authenticatable for OAuthClient {
    fn identifier(&self) -> String {
        self.id.to_string()
    }

    fn credential_hash(&self) -> Option<&str> {
        self.client_secret_hash.as_deref()
    }

    fn is_enabled(&self) -> bool {
        self.is_active
    }
}

impl ScopeBearing for OAuthClient {
    fn effective_scope(&self, _roles: &RoleGraph) -> Result<ScopeSet, RoleGraphError> {
        Ok(self.allowed_scopes.clone())
    }
}
