//! 角色层级
//!
//! 角色以 `RoleId -> Role` 的形式保存，父子关系只通过 `parent_id` 表达。
//! 继承链遍历带访问集合与深度上限，数据损坏时返回错误而不是死循环。

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use warden_domain_core::AggregateRoot;
use warden_errors::AppError;

use crate::domain::scope::ScopeSet;

use super::role::{Role, RoleId};

/// 继承链最大深度
pub const MAX_ROLE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleGraphError {
    #[error("Role hierarchy contains a cycle through role {0}")]
    Cycle(RoleId),

    #[error("Role hierarchy exceeds {max} levels at role {role}")]
    DepthExceeded { role: RoleId, max: usize },

    #[error("{owner} references missing role {missing}")]
    DanglingReference { owner: String, missing: RoleId },

    #[error("Role {0} not found")]
    UnknownRole(RoleId),
}

impl RoleGraphError {
    /// 是否为层级数据损坏
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Cycle(_) | Self::DepthExceeded { .. })
    }
}

impl From<RoleGraphError> for AppError {
    fn from(err: RoleGraphError) -> Self {
        match err {
            RoleGraphError::Cycle(_) | RoleGraphError::DepthExceeded { .. } => {
                AppError::role_cycle(err.to_string())
            }
            RoleGraphError::DanglingReference { .. } => AppError::internal(err.to_string()),
            RoleGraphError::UnknownRole(_) => AppError::not_found(err.to_string()),
        }
    }
}

/// 角色森林
#[derive(Debug, Clone, Default)]
pub struct RoleGraph {
    roles: HashMap<RoleId, Role>,
}

impl RoleGraph {
    /// 构建并校验整个森林
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, RoleGraphError> {
        let graph = Self {
            roles: roles.into_iter().map(|role| (role.id.clone(), role)).collect(),
        };

        for id in graph.roles.keys() {
            graph.ancestors(id)?;
        }

        Ok(graph)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    pub fn contains(&self, id: &RoleId) -> bool {
        self.roles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// 直接子角色
    pub fn children(&self, id: &RoleId) -> Vec<&Role> {
        self.roles
            .values()
            .filter(|role| role.parent_id.as_ref() == Some(id))
            .collect()
    }

    /// 从 `id` 开始沿父链向上的角色序列（包含自身）
    pub fn ancestors(&self, id: &RoleId) -> Result<Vec<&Role>, RoleGraphError> {
        let mut current = self
            .roles
            .get(id)
            .ok_or_else(|| RoleGraphError::UnknownRole(id.clone()))?;
        let mut visited = HashSet::new();
        let mut chain = Vec::new();

        loop {
            if !visited.insert(&current.id) {
                return Err(RoleGraphError::Cycle(current.id.clone()));
            }
            if chain.len() == MAX_ROLE_DEPTH {
                return Err(RoleGraphError::DepthExceeded {
                    role: id.clone(),
                    max: MAX_ROLE_DEPTH,
                });
            }
            chain.push(current);

            let Some(parent_id) = &current.parent_id else {
                return Ok(chain);
            };
            current = self.roles.get(parent_id).ok_or_else(|| {
                RoleGraphError::DanglingReference {
                    owner: format!("Role {}", current.id),
                    missing: parent_id.clone(),
                }
            })?;
        }
    }

    /// 角色有效 scope：自身与所有祖先 scope 的并集
    pub fn effective_scope(&self, id: &RoleId) -> Result<ScopeSet, RoleGraphError> {
        let mut scope = ScopeSet::empty();
        for role in self.ancestors(id)? {
            scope.extend(&role.scopes);
        }
        Ok(scope)
    }

    /// 多个角色有效 scope 的并集
    pub fn effective_scope_of<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a RoleId>,
    ) -> Result<ScopeSet, RoleGraphError> {
        let mut scope = ScopeSet::empty();
        for id in ids {
            scope.extend(&self.effective_scope(id)?);
        }
        Ok(scope)
    }

    /// 插入或替换角色，父链不能回到自身
    pub fn insert(&mut self, role: Role) -> Result<Option<Role>, RoleGraphError> {
        if let Some(parent_id) = &role.parent_id {
            if !self.roles.contains_key(parent_id) && parent_id != &role.id {
                return Err(RoleGraphError::DanglingReference {
                    owner: format!("Role {}", role.id),
                    missing: parent_id.clone(),
                });
            }
            if parent_id == &role.id
                || self
                    .ancestors(parent_id)?
                    .iter()
                    .any(|ancestor| ancestor.id == role.id)
            {
                return Err(RoleGraphError::Cycle(role.id.clone()));
            }
        }

        Ok(self.roles.insert(role.id.clone(), role))
    }

    /// 删除角色，其直接子角色提升到被删除角色的父角色下
    ///
    /// 返回被删除的角色与被提升的子角色 ID。
    pub fn remove(&mut self, id: &RoleId) -> Result<(Role, Vec<RoleId>), RoleGraphError> {
        let removed = self
            .roles
            .remove(id)
            .ok_or_else(|| RoleGraphError::UnknownRole(id.clone()))?;

        let mut promoted = Vec::new();
        for role in self.roles.values_mut() {
            if role.parent_id.as_ref() == Some(id) {
                role.parent_id = removed.parent_id.clone();
                role.touch();
                promoted.push(role.id.clone());
            }
        }

        Ok((removed, promoted))
    }
}
