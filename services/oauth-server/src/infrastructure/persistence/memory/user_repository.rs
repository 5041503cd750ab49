//! 内存用户仓储

use async_trait::async_trait;
use warden_common::UserId;
use warden_domain_core::AggregateRoot;
use warden_errors::{AppError, AppResult};

use crate::domain::repositories::UserRepository;
use crate::domain::user::User;

use super::InMemoryStore;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) || state.usernames.contains_key(&user.username) {
            return Err(AppError::conflict(format!(
                "User {} already exists",
                user.username
            )));
        }
        state.usernames.insert(user.username.clone(), user.id.clone());
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User, expected_version: u64) -> AppResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get(&user.id)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;
        self.check_version("User", expected_version, stored.version())?;

        if stored.username != user.username {
            if state.usernames.contains_key(&user.username) {
                return Err(AppError::conflict(format!(
                    "Username {} is taken",
                    user.username
                )));
            }
            let previous = stored.username.clone();
            state.usernames.remove(&previous);
            state.usernames.insert(user.username.clone(), user.id.clone());
        }

        let version = state.users.get(&user.id).map_or(0, |u| u.version());
        let mut updated = user.clone();
        updated.audit_info_mut().version = version + 1;
        state.users.insert(user.id.clone(), updated);
        Ok(())
    }
}
