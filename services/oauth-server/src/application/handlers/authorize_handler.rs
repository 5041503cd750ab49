use std::sync::Arc;

use async_trait::async_trait;
use url::Url;
use url::form_urlencoded::Serializer;
use warden_cqrs_core::CommandHandler;
use warden_errors::{AppError, AppResult};

use crate::application::commands::AuthorizeCommand;
use crate::application::dto::AuthorizeResponse;
use crate::domain::services::{AuthorizationOutcome, AuthorizationRequest, GrantProcessor};

pub struct AuthorizeHandler {
    processor: Arc<GrantProcessor>,
}

impl AuthorizeHandler {
    pub fn new(processor: Arc<GrantProcessor>) -> Self {
        Self { processor }
    }
}

fn parse_redirect(uri: &str) -> AppResult<Url> {
    Url::parse(uri).map_err(|e| AppError::internal(format!("Registered redirect_uri is invalid: {}", e)))
}

/// 构建客户端重定向地址：code 放在 query，token 放在 fragment
fn redirect_for(outcome: AuthorizationOutcome) -> AppResult<Url> {
    match outcome {
        AuthorizationOutcome::Code {
            code,
            redirect_uri,
            state,
        } => {
            let mut url = parse_redirect(&redirect_uri)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("code", &code.code);
                if let Some(state) = &state {
                    query.append_pair("state", state);
                }
            }
            Ok(url)
        }
        AuthorizationOutcome::Token {
            issued,
            redirect_uri,
            state,
        } => {
            let mut url = parse_redirect(&redirect_uri)?;
            let token = &issued.token;
            let mut fragment = Serializer::new(String::new());
            fragment
                .append_pair("access_token", &token.access_token)
                .append_pair("token_type", token.token_type())
                .append_pair("expires_in", &token.expires_in_at(token.issued_at).to_string())
                .append_pair("scope", &issued.resolution.granted.to_string());
            if let Some(state) = &state {
                fragment.append_pair("state", state);
            }
            url.set_fragment(Some(&fragment.finish()));
            Ok(url)
        }
    }
}

#[async_trait]
impl CommandHandler<AuthorizeCommand> for AuthorizeHandler {
    async fn handle(&self, command: AuthorizeCommand) -> AppResult<AuthorizeResponse> {
        let outcome = self
            .processor
            .authorize(AuthorizationRequest {
                client_id: command.client_id,
                response_type: command.response_type,
                redirect_uri: command.redirect_uri,
                scope: command.scope,
                state: command.state,
                code_challenge: command.code_challenge,
                code_challenge_method: command.code_challenge_method,
                user_id: command.user_id,
                approved: command.approved,
            })
            .await?;

        Ok(AuthorizeResponse {
            redirect_to: redirect_for(outcome)?,
        })
    }
}
