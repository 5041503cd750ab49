//! 内存授权码仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_errors::AppResult;

use crate::domain::oauth::{AuthorizationCode, Token};
use crate::domain::repositories::AuthorizationCodeRepository;

use super::InMemoryStore;

#[async_trait]
impl AuthorizationCodeRepository for InMemoryStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<AuthorizationCode>> {
        Ok(self.state.read().await.codes.get(code).cloned())
    }

    async fn save(&self, authorization_code: &AuthorizationCode) -> AppResult<()> {
        self.state
            .write()
            .await
            .codes
            .insert(authorization_code.code.clone(), authorization_code.clone());
        Ok(())
    }

    async fn redeem(&self, code: &str, token: &Token) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.codes.get_mut(code) {
            Some(stored) if !stored.is_used() => stored.mark_as_used(),
            _ => return Ok(false),
        }
        state.insert_token(token.clone());
        Ok(true)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.codes.len();
        state.codes.retain(|_, code| !code.is_expired_at(now));
        Ok((before - state.codes.len()) as u64)
    }
}
