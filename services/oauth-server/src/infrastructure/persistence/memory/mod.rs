//! 内存存储
//!
//! 所有集合由同一把 `RwLock` 保护，授权码兑换与 refresh token 轮换在一次写锁内完成。

mod authorization_code_repository;
mod oauth_client_repository;
mod role_repository;
mod token_repository;
mod user_repository;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use warden_common::UserId;
use warden_config::OAuthConfig;
use warden_domain_core::check_version;
use warden_errors::AppResult;

use crate::domain::oauth::{AuthorizationCode, OAuthClient, OAuthClientId, Token};
use crate::domain::repositories::{AuthorizationCodeRepository, TokenRepository};
use crate::domain::role::{Role, RoleId};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    clients: HashMap<OAuthClientId, OAuthClient>,
    users: HashMap<UserId, User>,
    usernames: HashMap<String, UserId>,
    roles: HashMap<RoleId, Role>,
    codes: HashMap<String, AuthorizationCode>,
    /// access_token -> Token
    tokens: HashMap<String, Token>,
    /// refresh_token -> access_token
    refresh_index: HashMap<String, String>,
}

impl State {
    fn insert_token(&mut self, token: Token) {
        if let Some(refresh_token) = &token.refresh_token {
            self.refresh_index
                .insert(refresh_token.clone(), token.access_token.clone());
        }
        self.tokens.insert(token.access_token.clone(), token);
    }

    fn token_by_refresh_mut(&mut self, refresh_token: &str) -> Option<&mut Token> {
        let access_token = self.refresh_index.get(refresh_token)?;
        self.tokens.get_mut(access_token)
    }
}

/// 内存存储，实现全部仓储接口
pub struct InMemoryStore {
    state: RwLock<State>,
    enforce_versions: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InMemoryStore {
    /// `enforce_versions` 为 `false` 时 `update` 不做版本检查
    pub fn new(enforce_versions: bool) -> Self {
        Self {
            state: RwLock::new(State::default()),
            enforce_versions,
        }
    }

    pub fn from_config(config: &OAuthConfig) -> Self {
        Self::new(config.enforce_concurrency_control)
    }

    fn check_version(&self, entity: &str, expected: u64, stored: u64) -> AppResult<()> {
        if self.enforce_versions {
            check_version(entity, expected, stored)
        } else {
            Ok(())
        }
    }

    /// 清理过期授权码与两半都失效的 token，返回清理数量
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let codes = AuthorizationCodeRepository::delete_expired(self, now).await?;
        let tokens = TokenRepository::delete_expired(self, now).await?;

        if codes + tokens > 0 {
            info!(codes, tokens, "Purged expired authorization codes and tokens");
        }
        Ok(codes + tokens)
    }
}

fn purge_tokens(state: &mut State, now: DateTime<Utc>) -> usize {
    let before = state.tokens.len();
    state.tokens.retain(|_, token| !token.is_dead_at(now));
    let State {
        tokens,
        refresh_index,
        ..
    } = state;
    refresh_index.retain(|_, access_token| tokens.contains_key(access_token));
    before - tokens.len()
}
