//! 角色管理命令

use warden_cqrs_core::Command;

use crate::domain::role::RoleId;

/// 创建角色
#[derive(Debug, Clone)]
pub struct CreateRoleCommand {
    pub name: String,
    pub scope: String,
    pub parent_id: Option<RoleId>,
}

impl Command for CreateRoleCommand {
    type Result = RoleId;
    const NAME: &'static str = "role.create";
}

/// 修改父角色
#[derive(Debug, Clone)]
pub struct SetRoleParentCommand {
    pub role_id: RoleId,
    pub parent_id: Option<RoleId>,
    pub expected_version: u64,
}

impl Command for SetRoleParentCommand {
    type Result = ();
    const NAME: &'static str = "role.set_parent";
}

/// 删除角色，子角色提升到其父角色下
#[derive(Debug, Clone)]
pub struct DeleteRoleCommand {
    pub role_id: RoleId,
    pub expected_version: u64,
}

impl Command for DeleteRoleCommand {
    type Result = Vec<RoleId>;
    const NAME: &'static str = "role.delete";
}
