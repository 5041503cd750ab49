//! 角色实体

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_common::{AuditInfo, new_id};
use warden_domain_core::{AggregateRoot, Entity};

use crate::domain::capabilities::ScopeBearing;
use crate::domain::scope::{Scope, ScopeSet};

use super::graph::{RoleGraph, RoleGraphError};

/// 角色 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(pub Uuid);

impl RoleId {
    pub fn new() -> Self {
        Self(new_id())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RoleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 角色实体
///
/// 角色至多有一个父角色，有效 scope 为自身 scope 与父链有效 scope 的并集。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<RoleId>,
    pub scopes: ScopeSet,
    pub audit_info: AuditInfo,
}

impl Role {
    pub fn new(name: impl Into<String>, scopes: ScopeSet) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            description: None,
            parent_id: None,
            scopes,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_parent(mut self, parent_id: RoleId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 修改父角色
    pub fn set_parent(&mut self, parent_id: Option<RoleId>) {
        self.parent_id = parent_id;
        self.touch();
    }

    /// 添加 scope
    pub fn grant_scope(&mut self, scope: Scope) {
        if self.scopes.insert(scope) {
            self.touch();
        }
    }

    /// 移除 scope
    pub fn revoke_scope(&mut self, scope: &Scope) {
        if self.scopes.remove(scope) {
            self.touch();
        }
    }

    /// 更新角色信息
    pub fn update(&mut self, name: String, description: Option<String>) {
        self.name = name;
        self.description = description;
        self.touch();
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Role {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl ScopeBearing for Role {
    fn effective_scope(&self, roles: &RoleGraph) -> Result<ScopeSet, RoleGraphError> {
        match &self.parent_id {
            Some(parent_id) => Ok(self.scopes.union(&roles.effective_scope(parent_id)?)),
            None => Ok(self.scopes.clone()),
        }
    }
}
