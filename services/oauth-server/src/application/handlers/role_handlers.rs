//! 角色管理 Handler
//!
//! 更新与删除都带版本号，并发修改返回 `Conflict`，由调用方决定是否重试。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use warden_cqrs_core::CommandHandler;
use warden_errors::{AppError, AppResult};

use crate::application::commands::{CreateRoleCommand, DeleteRoleCommand, SetRoleParentCommand};
use crate::domain::repositories::RoleRepository;
use crate::domain::role::{Role, RoleId};
use crate::domain::scope::ScopeSet;

pub struct CreateRoleHandler {
    roles: Arc<dyn RoleRepository>,
}

impl CreateRoleHandler {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl CommandHandler<CreateRoleCommand> for CreateRoleHandler {
    async fn handle(&self, command: CreateRoleCommand) -> AppResult<RoleId> {
        let mut role = Role::new(command.name, ScopeSet::parse(&command.scope)?);
        role.parent_id = command.parent_id;

        self.roles.save(&role).await?;
        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role.id)
    }
}

pub struct SetRoleParentHandler {
    roles: Arc<dyn RoleRepository>,
}

impl SetRoleParentHandler {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl CommandHandler<SetRoleParentCommand> for SetRoleParentHandler {
    async fn handle(&self, command: SetRoleParentCommand) -> AppResult<()> {
        let mut role = self
            .roles
            .find_by_id(&command.role_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", command.role_id)))?;

        role.set_parent(command.parent_id);
        self.roles.update(&role, command.expected_version).await?;
        info!(role_id = %role.id, "Role parent changed");
        Ok(())
    }
}

pub struct DeleteRoleHandler {
    roles: Arc<dyn RoleRepository>,
}

impl DeleteRoleHandler {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl CommandHandler<DeleteRoleCommand> for DeleteRoleHandler {
    async fn handle(&self, command: DeleteRoleCommand) -> AppResult<Vec<RoleId>> {
        let promoted = self
            .roles
            .delete(&command.role_id, command.expected_version)
            .await?;
        info!(
            role_id = %command.role_id,
            promoted = promoted.len(),
            "Role deleted"
        );
        Ok(promoted)
    }
}
