//! 角色仓储接口

use async_trait::async_trait;
use warden_errors::AppResult;

use crate::domain::role::{Role, RoleGraph, RoleId};

/// 角色仓储接口
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>>;

    /// 保存新角色，父链成环时返回 `RoleCycle`
    async fn save(&self, role: &Role) -> AppResult<()>;

    /// 更新角色（带版本检查）
    async fn update(&self, role: &Role, expected_version: u64) -> AppResult<()>;

    /// 删除角色并把子角色提升到其父角色下，返回被提升的子角色
    async fn delete(&self, id: &RoleId, expected_version: u64) -> AppResult<Vec<RoleId>>;

    /// 加载完整角色层级
    async fn load_graph(&self) -> AppResult<RoleGraph>;
}
