//! Token 校验与内省

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use warden_errors::{AppError, AppResult};

use crate::domain::oauth::{OAuthClient, Token, TokenTypeHint};
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::domain::scope::ScopeSet;

/// 内省结果（RFC 7662 §2.2）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Introspection {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Introspection {
    pub fn inactive() -> Self {
        Self {
            active: false,
            scope: None,
            client_id: None,
            username: None,
            sub: None,
            token_type: None,
            exp: None,
            iat: None,
        }
    }
}

pub struct TokenValidator {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
}

impl TokenValidator {
    pub fn new(tokens: Arc<dyn TokenRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// 校验受保护操作携带的 access_token
    pub async fn validate(&self, access_token: &str, required: &ScopeSet) -> AppResult<Token> {
        let token = self
            .tokens
            .find_by_access_token(access_token)
            .await?
            .ok_or_else(|| AppError::invalid_token("Unknown access token"))?;

        if token.access_revoked {
            return Err(AppError::invalid_token("Access token has been revoked"));
        }
        if token.is_expired_at(Utc::now()) {
            return Err(AppError::invalid_token("Access token has expired"));
        }
        if !token.covers(required) {
            return Err(AppError::insufficient_scope(format!(
                "Token lacks required scope: {}",
                required.difference(&token.scope)
            )));
        }

        Ok(token)
    }

    /// 内省 token，只有签发给调用方客户端的有效 token 才返回 active
    pub async fn introspect(
        &self,
        client: &OAuthClient,
        token: &str,
        hint: Option<TokenTypeHint>,
    ) -> AppResult<Introspection> {
        let now = Utc::now();
        let order = match hint {
            Some(TokenTypeHint::RefreshToken) => {
                [TokenTypeHint::RefreshToken, TokenTypeHint::AccessToken]
            }
            _ => [TokenTypeHint::AccessToken, TokenTypeHint::RefreshToken],
        };

        for kind in order {
            let found = match kind {
                TokenTypeHint::AccessToken => self
                    .tokens
                    .find_by_access_token(token)
                    .await?
                    .filter(|t| t.is_access_active_at(now))
                    .map(|t| {
                        let exp = t.expires_at.timestamp();
                        (t, exp)
                    }),
                TokenTypeHint::RefreshToken => self
                    .tokens
                    .find_by_refresh_token(token)
                    .await?
                    .filter(|t| t.is_refresh_active_at(now))
                    .and_then(|t| {
                        let exp = t.refresh_expires_at?.timestamp();
                        Some((t, exp))
                    }),
            };

            if let Some((found, exp)) = found {
                if found.client_id != client.id {
                    return Ok(Introspection::inactive());
                }
                return self.describe(found, exp).await;
            }
        }

        Ok(Introspection::inactive())
    }

    async fn describe(&self, token: Token, exp: i64) -> AppResult<Introspection> {
        let username = match &token.user_id {
            Some(user_id) => self
                .users
                .find_by_id(user_id)
                .await?
                .map(|user| user.username),
            None => None,
        };

        Ok(Introspection {
            active: true,
            scope: Some(token.scope.to_string()),
            client_id: Some(token.client_id.to_string()),
            username,
            sub: token.user_id.as_ref().map(ToString::to_string),
            token_type: Some(token.token_type().to_string()),
            exp: Some(exp),
            iat: Some(token.issued_at.timestamp()),
        })
    }
}
