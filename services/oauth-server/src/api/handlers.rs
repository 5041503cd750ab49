//! 默认端点处理器
//!
//! 把请求参数转换为 Command / Query，交给 `AuthorizationServer` 执行。

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use warden_errors::{AppError, AppResult};

use crate::application::commands::{AuthorizeCommand, RevokeCommand, TokenCommand};
use crate::application::dto::TokenResponse;
use crate::application::queries::IntrospectTokenQuery;
use crate::domain::services::Introspection;
use crate::server::AuthorizationServer;

use super::basic_auth::client_credentials;
use super::endpoint::{EndpointHandler, EndpointRequest, EndpointResponse};

fn required(request: &EndpointRequest, name: &str) -> AppResult<String> {
    request
        .param_owned(name)
        .ok_or_else(|| AppError::invalid_request(format!("{} is required", name)))
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(e.to_string()))
}

/// `/authorize`
pub struct AuthorizeEndpoint {
    server: Arc<AuthorizationServer>,
}

impl AuthorizeEndpoint {
    pub fn new(server: Arc<AuthorizationServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl EndpointHandler for AuthorizeEndpoint {
    async fn handle(&self, request: EndpointRequest) -> EndpointResponse {
        let command = AuthorizeCommand {
            client_id: request.param_owned("client_id").unwrap_or_default(),
            response_type: request.param_owned("response_type").unwrap_or_default(),
            redirect_uri: request.param_owned("redirect_uri"),
            scope: request.param_owned("scope"),
            state: request.param_owned("state"),
            code_challenge: request.param_owned("code_challenge"),
            code_challenge_method: request.param_owned("code_challenge_method"),
            user_id: request.user_id.clone(),
            approved: request.approved,
        };

        match self.server.authorize(command).await {
            Ok(response) => EndpointResponse::redirect(&response.redirect_to),
            Err(e) => EndpointResponse::error(&e),
        }
    }
}

/// `/token`
pub struct TokenEndpoint {
    server: Arc<AuthorizationServer>,
}

impl TokenEndpoint {
    pub fn new(server: Arc<AuthorizationServer>) -> Self {
        Self { server }
    }

    async fn issue(&self, request: &EndpointRequest) -> AppResult<TokenResponse> {
        let credentials = client_credentials(request)?;
        let command = TokenCommand {
            grant_type: required(request, "grant_type")?,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            code: request.param_owned("code"),
            redirect_uri: request.param_owned("redirect_uri"),
            code_verifier: request.param_owned("code_verifier"),
            username: request.param_owned("username"),
            password: request.param_owned("password").map(SecretString::new),
            refresh_token: request.param_owned("refresh_token"),
            scope: request.params.get("scope").cloned(),
        };
        self.server.token(command).await
    }
}

#[async_trait]
impl EndpointHandler for TokenEndpoint {
    async fn handle(&self, request: EndpointRequest) -> EndpointResponse {
        let response = match self.issue(&request).await.and_then(|token| to_json(&token)) {
            Ok(body) => EndpointResponse::json(body),
            Err(e) => EndpointResponse::error(&e),
        };
        response.no_store()
    }
}

/// `/revoke`
pub struct RevokeEndpoint {
    server: Arc<AuthorizationServer>,
}

impl RevokeEndpoint {
    pub fn new(server: Arc<AuthorizationServer>) -> Self {
        Self { server }
    }

    async fn revoke(&self, request: &EndpointRequest) -> AppResult<()> {
        let command = RevokeCommand {
            client: client_credentials(request)?,
            token: required(request, "token")?,
            token_type_hint: request.param_owned("token_type_hint"),
        };
        self.server.revoke(command).await
    }
}

#[async_trait]
impl EndpointHandler for RevokeEndpoint {
    async fn handle(&self, request: EndpointRequest) -> EndpointResponse {
        match self.revoke(&request).await {
            Ok(()) => EndpointResponse::ok(),
            Err(e) => EndpointResponse::error(&e),
        }
    }
}

/// `/introspect`
pub struct IntrospectEndpoint {
    server: Arc<AuthorizationServer>,
}

impl IntrospectEndpoint {
    pub fn new(server: Arc<AuthorizationServer>) -> Self {
        Self { server }
    }

    async fn introspect(&self, request: &EndpointRequest) -> AppResult<Introspection> {
        let query = IntrospectTokenQuery {
            client: client_credentials(request)?,
            token: required(request, "token")?,
            token_type_hint: request.param_owned("token_type_hint"),
        };
        self.server.introspect(query).await
    }
}

#[async_trait]
impl EndpointHandler for IntrospectEndpoint {
    async fn handle(&self, request: EndpointRequest) -> EndpointResponse {
        match self
            .introspect(&request)
            .await
            .and_then(|introspection| to_json(&introspection))
        {
            Ok(body) => EndpointResponse::json(body).no_store(),
            Err(e) => EndpointResponse::error(&e),
        }
    }
}
