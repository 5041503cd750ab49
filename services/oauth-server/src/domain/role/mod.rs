//! 角色与角色层级

#![allow(clippy::module_inception)]

pub mod graph;
pub mod role;

pub use graph::{MAX_ROLE_DEPTH, RoleGraph, RoleGraphError};
pub use role::{Role, RoleId};
