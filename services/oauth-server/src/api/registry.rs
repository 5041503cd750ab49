//! 端点表
//!
//! 启动前可用 `register` 替换任意端点；启动后只读共享。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use warden_errors::AppError;

use crate::server::AuthorizationServer;

use super::endpoint::{Endpoint, EndpointHandler, EndpointRequest, EndpointResponse, Method};
use super::handlers::{AuthorizeEndpoint, IntrospectEndpoint, RevokeEndpoint, TokenEndpoint};

pub struct EndpointRegistry {
    prefix: String,
    handlers: HashMap<Endpoint, Arc<dyn EndpointHandler>>,
}

impl EndpointRegistry {
    /// 空端点表
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        Self {
            prefix,
            handlers: HashMap::new(),
        }
    }

    /// 安装默认处理器，前缀取自配置
    pub fn with_defaults(server: Arc<AuthorizationServer>) -> Self {
        let mut registry = Self::new(server.config().url_prefix.clone());
        registry.register(
            Endpoint::Authorize,
            Arc::new(AuthorizeEndpoint::new(server.clone())),
        );
        registry.register(Endpoint::Token, Arc::new(TokenEndpoint::new(server.clone())));
        registry.register(Endpoint::Revoke, Arc::new(RevokeEndpoint::new(server.clone())));
        registry.register(Endpoint::Introspect, Arc::new(IntrospectEndpoint::new(server)));
        registry
    }

    /// 注册处理器，返回被替换的旧处理器
    pub fn register(
        &mut self,
        endpoint: Endpoint,
        handler: Arc<dyn EndpointHandler>,
    ) -> Option<Arc<dyn EndpointHandler>> {
        debug!(endpoint = %endpoint, "Endpoint handler registered");
        self.handlers.insert(endpoint, handler)
    }

    pub fn handler(&self, endpoint: Endpoint) -> Option<&Arc<dyn EndpointHandler>> {
        self.handlers.get(&endpoint)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 端点完整路径
    pub fn path_of(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.prefix, endpoint.path())
    }

    /// 解析请求方法与路径
    pub fn route(&self, method: Method, path: &str) -> Option<Endpoint> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        let rest = match rest.trim_end_matches('/') {
            "" => return None,
            trimmed => trimmed,
        };

        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.path() == rest && endpoint.allows(method))
    }

    /// 路由并执行请求
    pub async fn dispatch(&self, path: &str, request: EndpointRequest) -> EndpointResponse {
        let handler = self
            .route(request.method, path)
            .and_then(|endpoint| self.handlers.get(&endpoint));

        match handler {
            Some(handler) => handler.handle(request).await,
            None => {
                debug!(path, method = ?request.method, "No endpoint matched");
                EndpointResponse::error(&AppError::not_found(format!(
                    "No endpoint for {:?} {}",
                    request.method, path
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Teapot;

    #[async_trait]
    impl EndpointHandler for Teapot {
        async fn handle(&self, _request: EndpointRequest) -> EndpointResponse {
            let mut response = EndpointResponse::ok();
            response.status = 418;
            response
        }
    }

    #[test]
    fn test_route_with_prefix() {
        let registry = EndpointRegistry::new("/oauth/");

        assert_eq!(registry.prefix(), "/oauth");
        assert_eq!(registry.route(Method::Post, "/oauth/token"), Some(Endpoint::Token));
        assert_eq!(registry.route(Method::Get, "/oauth/authorize"), Some(Endpoint::Authorize));
        assert_eq!(registry.route(Method::Post, "/oauth/authorize/"), Some(Endpoint::Authorize));
        assert_eq!(registry.route(Method::Get, "/oauth/token"), None);
        assert_eq!(registry.route(Method::Post, "/token"), None);
        assert_eq!(registry.route(Method::Post, "/oauth"), None);
        assert_eq!(registry.path_of(Endpoint::Revoke), "/oauth/revoke");
    }

    #[test]
    fn test_empty_prefix() {
        let registry = EndpointRegistry::new("");
        assert_eq!(registry.route(Method::Post, "/introspect"), Some(Endpoint::Introspect));
    }

    #[tokio::test]
    async fn test_dispatch() {
        let mut registry = EndpointRegistry::new("/oauth");
        assert!(registry.register(Endpoint::Token, Arc::new(Teapot)).is_none());
        assert!(registry.handler(Endpoint::Token).is_some());

        let response = registry.dispatch("/oauth/token", EndpointRequest::post()).await;
        assert_eq!(response.status, 418);

        let response = registry.dispatch("/oauth/revoke", EndpointRequest::post()).await;
        assert_eq!(response.status, 404);
    }
}
