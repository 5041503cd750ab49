use std::sync::Arc;

use async_trait::async_trait;
use warden_cqrs_core::CommandHandler;
use warden_errors::{AppError, AppResult};

use crate::application::commands::TokenCommand;
use crate::application::dto::TokenResponse;
use crate::domain::oauth::GrantType;
use crate::domain::scope::ScopeSet;
use crate::domain::services::{ClientCredentials, GrantProcessor, GrantRequest};

pub struct TokenHandler {
    processor: Arc<GrantProcessor>,
}

impl TokenHandler {
    pub fn new(processor: Arc<GrantProcessor>) -> Self {
        Self { processor }
    }
}

fn required<T>(value: Option<T>, name: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::invalid_request(format!("{} is required", name)))
}

/// 校验表单参数并转换为领域请求
fn grant_request(command: TokenCommand) -> AppResult<(ClientCredentials, GrantRequest)> {
    let grant_type: GrantType = command.grant_type.parse()?;
    let credentials = ClientCredentials {
        client_id: command.client_id,
        client_secret: command.client_secret,
    };

    let request = match grant_type {
        GrantType::AuthorizationCode => GrantRequest::AuthorizationCode {
            code: required(command.code, "code")?,
            redirect_uri: command.redirect_uri,
            code_verifier: command.code_verifier,
        },
        GrantType::Password => GrantRequest::Password {
            username: required(command.username, "username")?,
            password: required(command.password, "password")?,
            scope: ScopeSet::parse_optional(command.scope.as_deref())?,
        },
        GrantType::ClientCredentials => GrantRequest::ClientCredentials {
            scope: ScopeSet::parse_optional(command.scope.as_deref())?,
        },
        GrantType::RefreshToken => GrantRequest::RefreshToken {
            refresh_token: required(command.refresh_token, "refresh_token")?,
            scope: ScopeSet::parse_optional(command.scope.as_deref())?,
        },
        GrantType::Implicit => {
            return Err(AppError::unsupported_grant_type(
                "The implicit grant is only available at the authorization endpoint",
            ));
        }
    };

    Ok((credentials, request))
}

#[async_trait]
impl CommandHandler<TokenCommand> for TokenHandler {
    async fn handle(&self, command: TokenCommand) -> AppResult<TokenResponse> {
        if command.client_id.is_empty() {
            return Err(AppError::invalid_client("Client authentication is required"));
        }
        let (credentials, request) = grant_request(command)?;
        let issued = self.processor.process(&credentials, request).await?;
        Ok(TokenResponse::from(&issued))
    }
}
