//! 端点层
//!
//! 与传输无关的端点表：宿主框架负责解析请求参数并回写响应。

mod basic_auth;
mod endpoint;
mod handlers;
mod registry;

pub use basic_auth::client_credentials;
pub use endpoint::{Endpoint, EndpointHandler, EndpointRequest, EndpointResponse, Method, ResponseBody};
pub use handlers::{AuthorizeEndpoint, IntrospectEndpoint, RevokeEndpoint, TokenEndpoint};
pub use registry::EndpointRegistry;
