//! 内存角色仓储
//!
//! 写入前在完整层级上校验，成环的父链不会落库。
//! 删除角色时在同一把写锁内解除所有用户对该角色的引用。

use async_trait::async_trait;
use tracing::debug;
use warden_domain_core::AggregateRoot;
use warden_errors::{AppError, AppResult};

use crate::domain::repositories::RoleRepository;
use crate::domain::role::{Role, RoleGraph, RoleId};

use super::{InMemoryStore, State};

fn graph_of(state: &State) -> AppResult<RoleGraph> {
    Ok(RoleGraph::new(state.roles.values().cloned())?)
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(id).cloned())
    }

    async fn save(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.contains_key(&role.id) {
            return Err(AppError::conflict(format!("Role {} already exists", role.id)));
        }

        graph_of(&state)?.insert(role.clone())?;
        state.roles.insert(role.id.clone(), role.clone());
        Ok(())
    }

    async fn update(&self, role: &Role, expected_version: u64) -> AppResult<()> {
        let mut state = self.state.write().await;
        let stored_version = state
            .roles
            .get(&role.id)
            .map(|stored| stored.version())
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", role.id)))?;
        self.check_version("Role", expected_version, stored_version)?;

        let mut updated = role.clone();
        updated.audit_info_mut().version = stored_version + 1;
        graph_of(&state)?.insert(updated.clone())?;
        state.roles.insert(role.id.clone(), updated);
        Ok(())
    }

    async fn delete(&self, id: &RoleId, expected_version: u64) -> AppResult<Vec<RoleId>> {
        let mut state = self.state.write().await;
        let stored_version = state
            .roles
            .get(id)
            .map(|stored| stored.version())
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))?;
        self.check_version("Role", expected_version, stored_version)?;

        let mut graph = graph_of(&state)?;
        let (_, promoted) = graph.remove(id)?;

        state.roles.remove(id);
        for child_id in &promoted {
            if let Some(child) = graph.get(child_id) {
                state.roles.insert(child_id.clone(), child.clone());
            }
        }

        let mut detached = 0usize;
        for user in state.users.values_mut() {
            if user.role_ids.contains(id) {
                user.remove_role(id);
                detached += 1;
            }
        }
        if detached > 0 {
            debug!(role_id = %id, users = detached, "Detached deleted role from users");
        }
        Ok(promoted)
    }

    async fn load_graph(&self) -> AppResult<RoleGraph> {
        graph_of(&*self.state.read().await)
    }
}
