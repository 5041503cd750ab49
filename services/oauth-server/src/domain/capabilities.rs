//! 能力 trait
//!
//! Client、User、Role 各自独立实现，不依赖继承层次。

use warden_errors::AppResult;

use super::role::{RoleGraph, RoleGraphError};
use super::scope::ScopeSet;
use super::services::PasswordHasher;

/// 可认证主体
pub trait Authenticatable {
    /// 认证标识（client_id 或用户名）
    fn identifier(&self) -> String;

    /// 凭据哈希，没有凭据时返回 `None`
    fn credential_hash(&self) -> Option<&str>;

    fn is_enabled(&self) -> bool;

    /// 校验凭据；没有凭据的主体永远校验失败
    fn verify_credential(&self, hasher: &dyn PasswordHasher, presented: &str) -> AppResult<bool> {
        match self.credential_hash() {
            Some(hash) => hasher.verify(presented, hash),
            None => Ok(false),
        }
    }
}

/// 持有 scope 的主体
pub trait ScopeBearing {
    /// 计算有效 scope，角色继承链在 `roles` 中解析
    fn effective_scope(&self, roles: &RoleGraph) -> Result<ScopeSet, RoleGraphError>;
}
