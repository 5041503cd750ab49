//! Token 撤销（RFC 7009）
//!
//! 撤销 access_token 只影响 access 一半；撤销 refresh_token 使整个授权失效。
//! 不存在、已撤销或属于其他客户端的 token 都按成功处理且不改变状态。

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};
use warden_errors::AppResult;

use crate::domain::oauth::{OAuthClient, Token, TokenTypeHint};
use crate::domain::repositories::TokenRepository;

pub struct RevocationProcessor {
    tokens: Arc<dyn TokenRepository>,
}

impl RevocationProcessor {
    pub fn new(tokens: Arc<dyn TokenRepository>) -> Self {
        Self { tokens }
    }

    /// 撤销 token，按提示类型优先查找，再查找另一类型
    pub async fn revoke(
        &self,
        client: &OAuthClient,
        token: &str,
        hint: Option<TokenTypeHint>,
    ) -> AppResult<()> {
        let order = match hint {
            Some(TokenTypeHint::RefreshToken) => {
                [TokenTypeHint::RefreshToken, TokenTypeHint::AccessToken]
            }
            _ => [TokenTypeHint::AccessToken, TokenTypeHint::RefreshToken],
        };

        for kind in order {
            let found = match kind {
                TokenTypeHint::AccessToken => self.tokens.find_by_access_token(token).await?,
                TokenTypeHint::RefreshToken => self.tokens.find_by_refresh_token(token).await?,
            };
            if let Some(found) = found {
                return self.revoke_found(client, found, kind).await;
            }
        }

        debug!(client_id = %client.id, "Token to revoke not found");
        Ok(())
    }

    async fn revoke_found(
        &self,
        client: &OAuthClient,
        token: Token,
        kind: TokenTypeHint,
    ) -> AppResult<()> {
        if token.client_id != client.id {
            warn!(
                client_id = %client.id,
                owner = %token.client_id,
                "Client attempted to revoke a token it does not own"
            );
            return Ok(());
        }

        let (changed, token_type) = match kind {
            TokenTypeHint::AccessToken => (
                self.tokens.revoke_access_token(&token.access_token).await?,
                "access_token",
            ),
            TokenTypeHint::RefreshToken => match &token.refresh_token {
                Some(refresh_token) => (
                    self.tokens.revoke_refresh_token(refresh_token).await?,
                    "refresh_token",
                ),
                None => (false, "refresh_token"),
            },
        };

        if changed {
            info!(client_id = %client.id, token_type, "Token revoked");
            counter!("oauth_tokens_revoked_total", "token_type" => token_type).increment(1);
        } else {
            debug!(client_id = %client.id, token_type, "Token already revoked");
        }
        Ok(())
    }
}
