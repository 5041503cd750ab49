//! 用户（资源所有者）

#![allow(clippy::module_inception)]

pub mod user;

pub use user::User;
