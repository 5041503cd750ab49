//! 内存 OAuth Client 仓储

use async_trait::async_trait;
use warden_domain_core::AggregateRoot;
use warden_errors::{AppError, AppResult};

use crate::domain::oauth::{OAuthClient, OAuthClientId};
use crate::domain::repositories::OAuthClientRepository;

use super::InMemoryStore;

#[async_trait]
impl OAuthClientRepository for InMemoryStore {
    async fn find_by_id(&self, id: &OAuthClientId) -> AppResult<Option<OAuthClient>> {
        Ok(self.state.read().await.clients.get(id).cloned())
    }

    async fn save(&self, client: &OAuthClient) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.clients.contains_key(&client.id) {
            return Err(AppError::conflict(format!("Client {} already exists", client.id)));
        }
        state.clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn update(&self, client: &OAuthClient, expected_version: u64) -> AppResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .clients
            .get(&client.id)
            .ok_or_else(|| AppError::not_found(format!("Client {} not found", client.id)))?;
        self.check_version("Client", expected_version, stored.version())?;

        let mut updated = client.clone();
        updated.audit_info_mut().version = stored.version() + 1;
        state.clients.insert(client.id.clone(), updated);
        Ok(())
    }

    async fn delete(&self, id: &OAuthClientId) -> AppResult<()> {
        self.state.write().await.clients.remove(id);
        Ok(())
    }
}
