//! Token 实体
//!
//! 一次授权对应一个 Token：access_token 必有，refresh_token 可选，两半分别记录撤销状态。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use warden_common::UserId;

use crate::domain::scope::ScopeSet;

use super::grant_type::GrantType;
use super::oauth_client::OAuthClientId;

/// Bearer token 类型
pub const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: OAuthClientId,
    /// client_credentials 授权没有用户
    pub user_id: Option<UserId>,
    pub scope: ScopeSet,
    pub grant_type: GrantType,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
    pub access_revoked: bool,
    pub refresh_revoked: bool,
}

impl Token {
    pub fn new(
        access_token: String,
        client_id: OAuthClientId,
        user_id: Option<UserId>,
        scope: ScopeSet,
        grant_type: GrantType,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            access_token,
            refresh_token: None,
            client_id,
            user_id,
            scope,
            grant_type,
            issued_at: now,
            expires_at: now + lifetime,
            refresh_expires_at: None,
            access_revoked: false,
            refresh_revoked: false,
        }
    }

    /// 附带 refresh_token
    pub fn with_refresh_token(mut self, refresh_token: String, lifetime: Duration) -> Self {
        self.refresh_token = Some(refresh_token);
        self.refresh_expires_at = Some(self.issued_at + lifetime);
        self
    }

    pub fn token_type(&self) -> &'static str {
        BEARER
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// access_token 是否可用（未撤销且未过期）
    pub fn is_access_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_revoked && !self.is_expired_at(now)
    }

    pub fn is_access_active(&self) -> bool {
        self.is_access_active_at(Utc::now())
    }

    /// refresh_token 是否可用
    pub fn is_refresh_active_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.refresh_expires_at) {
            (Some(_), Some(expires_at)) => !self.refresh_revoked && now < expires_at,
            _ => false,
        }
    }

    /// 两半都已失效，可以清理
    pub fn is_dead_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_access_active_at(now) && !self.is_refresh_active_at(now)
    }

    /// 剩余有效时间（秒）
    pub fn expires_in_at(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// 撤销 access_token，返回状态是否改变
    pub fn revoke_access(&mut self) -> bool {
        let changed = !self.access_revoked;
        self.access_revoked = true;
        changed
    }

    /// 撤销整个授权（两半），返回状态是否改变
    pub fn revoke_all(&mut self) -> bool {
        let changed = !self.access_revoked || (self.refresh_token.is_some() && !self.refresh_revoked);
        self.access_revoked = true;
        if self.refresh_token.is_some() {
            self.refresh_revoked = true;
        }
        changed
    }

    /// token scope 是否覆盖 `required`
    pub fn covers(&self, required: &ScopeSet) -> bool {
        required.is_subset(&self.scope)
    }
}
