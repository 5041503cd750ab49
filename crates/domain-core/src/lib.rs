//! domain-core - 跨 context 的领域核心类型

mod entity;

pub use entity::*;

pub use warden_common::{AuditInfo, UserId};
