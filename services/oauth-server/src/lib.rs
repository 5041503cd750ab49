//! oauth-server - OAuth2 授权引擎
//!
//! scope 解析、授权类型状态机、授权码与 token 的签发、校验与撤销。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod server;

pub use server::{AuthorizationServer, AuthorizationServerBuilder};
