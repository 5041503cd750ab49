//! 授权类型状态机
//!
//! 每个请求经历 `Received -> Validated -> Issued`，任一步失败进入 `Rejected`。

mod processor;
mod request;

pub use processor::GrantProcessor;
pub use request::{
    AuthorizationOutcome, AuthorizationRequest, ClientCredentials, GrantRequest, IssuedToken,
};

/// 授权请求所处状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantState {
    Received,
    Validated,
    Issued,
    Rejected,
}
