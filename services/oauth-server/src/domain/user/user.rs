//! 用户实体

use serde::{Deserialize, Serialize};
use warden_common::{AuditInfo, UserId};
use warden_domain_core::{AggregateRoot, Entity};

use crate::domain::capabilities::{Authenticatable, ScopeBearing};
use crate::domain::role::{RoleGraph, RoleGraphError, RoleId};
use crate::domain::scope::{Scope, ScopeSet};

/// 用户实体
///
/// 有效 scope 为直接 scope 与所属角色有效 scope 的并集。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// 密码哈希，格式由哈希实现决定
    pub password_hash: String,
    pub scopes: ScopeSet,
    pub role_ids: Vec<RoleId>,
    pub is_active: bool,
    pub audit_info: AuditInfo,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            scopes: ScopeSet::empty(),
            role_ids: Vec::new(),
            is_active: true,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_role(mut self, role_id: RoleId) -> Self {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
        self
    }

    /// 分配角色
    pub fn assign_role(&mut self, role_id: RoleId) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
            self.touch();
        }
    }

    /// 移除角色
    pub fn remove_role(&mut self, role_id: &RoleId) {
        let before = self.role_ids.len();
        self.role_ids.retain(|id| id != role_id);
        if self.role_ids.len() != before {
            self.touch();
        }
    }

    pub fn grant_scope(&mut self, scope: Scope) {
        if self.scopes.insert(scope) {
            self.touch();
        }
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

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for User {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl Authenticatable for User {
    fn identifier(&self) -> String {
        self.username.clone()
    }

    fn credential_hash(&self) -> Option<&str> {
        Some(&self.password_hash)
    }

    fn is_enabled(&self) -> bool {
        self.is_active
    }
}

impl ScopeBearing for User {
    fn effective_scope(&self, roles: &RoleGraph) -> Result<ScopeSet, RoleGraphError> {
        let mut scope = self.scopes.clone();
        for role_id in &self.role_ids {
            if !roles.contains(role_id) {
                return Err(RoleGraphError::DanglingReference {
                    owner: format!("User {}", self.id),
                    missing: role_id.clone(),
                });
            }
            scope.extend(&roles.effective_scope(role_id)?);
        }
        Ok(scope)
    }
}
