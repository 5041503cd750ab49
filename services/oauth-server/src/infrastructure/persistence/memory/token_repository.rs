//! 内存 Token 仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_errors::AppResult;

use crate::domain::oauth::Token;
use crate::domain::repositories::TokenRepository;

use super::{InMemoryStore, purge_tokens};

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn find_by_access_token(&self, access_token: &str) -> AppResult<Option<Token>> {
        Ok(self.state.read().await.tokens.get(access_token).cloned())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> AppResult<Option<Token>> {
        let state = self.state.read().await;
        Ok(state
            .refresh_index
            .get(refresh_token)
            .and_then(|access_token| state.tokens.get(access_token))
            .cloned())
    }

    async fn save(&self, token: &Token) -> AppResult<()> {
        self.state.write().await.insert_token(token.clone());
        Ok(())
    }

    async fn revoke_access_token(&self, access_token: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .tokens
            .get_mut(access_token)
            .is_some_and(|token| token.revoke_access()))
    }

    async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .token_by_refresh_mut(refresh_token)
            .is_some_and(|token| token.revoke_all()))
    }

    async fn rotate(&self, old_refresh_token: &str, new_token: &Token) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.token_by_refresh_mut(old_refresh_token) {
            Some(old) if old.is_refresh_active_at(Utc::now()) => {
                old.revoke_all();
            }
            _ => return Ok(false),
        }
        state.insert_token(new_token.clone());
        Ok(true)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        Ok(purge_tokens(&mut state, now) as u64)
    }
}
