//! 授权处理器

use std::sync::Arc;

use chrono::{Duration, Utc};
use metrics::counter;
use secrecy::ExposeSecret;
use tracing::{debug, error, info, warn};
use warden_common::UserId;
use warden_config::OAuthConfig;
use warden_errors::{AppError, AppResult};

use crate::domain::capabilities::{Authenticatable, ScopeBearing};
use crate::domain::oauth::{
    AuthorizationCode, CodeChallengeMethod, GrantType, OAuthClient, OAuthClientId, ResponseType,
    Token,
};
use crate::domain::repositories::OAuthRepositories;
use crate::domain::scope::ScopeSet;
use crate::domain::services::{
    AuthorizationPolicy, PasswordHasher, ScopeResolution, generate_opaque_token,
};
use crate::domain::user::User;

use super::GrantState;
use super::request::{
    AuthorizationOutcome, AuthorizationRequest, ClientCredentials, GrantRequest, IssuedToken,
};

fn ttl(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}

/// 记录服务端错误中的角色层级损坏
fn report_integrity(err: AppError) -> AppError {
    if let AppError::RoleCycle(detail) = &err {
        error!(error = %detail, "Role hierarchy integrity violation");
    }
    err
}

/// 授权处理器
///
/// 负责客户端认证、各授权类型的校验与 token 签发。
pub struct GrantProcessor {
    repos: OAuthRepositories,
    hasher: Arc<dyn PasswordHasher>,
    policy: AuthorizationPolicy,
    config: Arc<OAuthConfig>,
}

impl GrantProcessor {
    pub fn new(
        repos: OAuthRepositories,
        hasher: Arc<dyn PasswordHasher>,
        policy: AuthorizationPolicy,
        config: Arc<OAuthConfig>,
    ) -> Self {
        Self {
            repos,
            hasher,
            policy,
            config,
        }
    }

    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }

    /// 处理 token 端点请求
    pub async fn process(
        &self,
        credentials: &ClientCredentials,
        request: GrantRequest,
    ) -> AppResult<IssuedToken> {
        let grant_type = request.grant_type();
        debug!(
            grant_type = %grant_type,
            client_id = %credentials.client_id,
            state = ?GrantState::Received,
            "Token request received"
        );

        let result = self.run(credentials, request).await;
        match &result {
            Ok(issued) => self.record_issued(grant_type, &issued.token),
            Err(e) => self.record_rejected(grant_type.as_str(), &credentials.client_id, e),
        }
        result
    }

    async fn run(
        &self,
        credentials: &ClientCredentials,
        request: GrantRequest,
    ) -> AppResult<IssuedToken> {
        let grant_type = request.grant_type();
        self.ensure_enabled(grant_type)?;

        let client = self.authenticate_client(credentials).await?;
        self.ensure_client_grant(&client, grant_type)?;

        debug!(
            grant_type = %grant_type,
            client_id = %client.id,
            state = ?GrantState::Validated,
            "Token request validated"
        );

        match request {
            GrantRequest::AuthorizationCode {
                code,
                redirect_uri,
                code_verifier,
            } => {
                self.exchange_authorization_code(
                    &client,
                    &code,
                    redirect_uri.as_deref(),
                    code_verifier.as_deref(),
                )
                .await
            }
            GrantRequest::Password {
                username,
                password,
                scope,
            } => {
                self.password_grant(&client, &username, password.expose_secret(), &scope)
                    .await
            }
            GrantRequest::ClientCredentials { scope } => {
                self.client_credentials_grant(&client, &scope).await
            }
            GrantRequest::RefreshToken {
                refresh_token,
                scope,
            } => self.refresh_token_grant(&client, &refresh_token, &scope).await,
        }
    }

    /// 处理授权端点请求（code / token 两种响应类型）
    pub async fn authorize(&self, request: AuthorizationRequest) -> AppResult<AuthorizationOutcome> {
        let grant_label = request
            .response_type
            .parse::<ResponseType>()
            .map_or("unknown", |response_type| response_type.grant_type().as_str());
        let client_id = request.client_id.clone();
        debug!(
            grant_type = grant_label,
            client_id = %client_id,
            state = ?GrantState::Received,
            "Authorization request received"
        );

        let result = self.run_authorize(request).await;
        match &result {
            Ok(AuthorizationOutcome::Token { issued, .. }) => {
                self.record_issued(GrantType::Implicit, &issued.token)
            }
            Ok(AuthorizationOutcome::Code { code, .. }) => {
                debug!(
                    grant_type = grant_label,
                    client_id = %client_id,
                    state = ?GrantState::Issued,
                    "Authorization code issued"
                );
                info!(
                    client_id = %code.client_id,
                    user_id = %code.user_id,
                    "Authorization code issued"
                );
            }
            Err(e) => self.record_rejected(grant_label, &client_id, e),
        }
        result
    }

    async fn run_authorize(&self, request: AuthorizationRequest) -> AppResult<AuthorizationOutcome> {
        let client = self.find_active_client(&request.client_id).await?;

        let response_type: ResponseType = request.response_type.parse()?;
        let grant_type = response_type.grant_type();
        if !self.is_enabled(grant_type) || !client.is_grant_type_allowed(grant_type) {
            return Err(AppError::unauthorized_client(format!(
                "Client is not allowed to use the {} grant",
                grant_type
            )));
        }

        let (redirect_uri, explicit) = match request.redirect_uri {
            Some(uri) => {
                if !client.validate_redirect_uri_match(&uri) {
                    return Err(AppError::invalid_request(
                        "redirect_uri is not registered for this client",
                    ));
                }
                (uri, true)
            }
            None => {
                let uri = client.default_redirect_uri().ok_or_else(|| {
                    AppError::invalid_request("Client has no registered redirect_uri")
                })?;
                (uri.to_string(), false)
            }
        };

        let scope = ScopeSet::parse_optional(request.scope.as_deref())?;

        let user_id = request
            .user_id
            .ok_or_else(|| AppError::access_denied("Resource owner is not authenticated"))?;
        let user = self
            .repos
            .users
            .find_by_id(&user_id)
            .await?
            .filter(|user| user.is_enabled())
            .ok_or_else(|| AppError::access_denied("Resource owner is unknown or inactive"))?;
        if !request.approved {
            return Err(AppError::access_denied("Resource owner denied the request"));
        }

        debug!(
            grant_type = %grant_type,
            client_id = %client.id,
            state = ?GrantState::Validated,
            "Authorization request validated"
        );

        match response_type {
            ResponseType::Code => {
                let method = request
                    .code_challenge_method
                    .as_deref()
                    .map(str::parse::<CodeChallengeMethod>)
                    .transpose()?;
                if request.code_challenge.is_none() {
                    if method.is_some() {
                        return Err(AppError::invalid_request(
                            "code_challenge_method requires code_challenge",
                        ));
                    }
                    if client.is_public() || self.config.require_pkce {
                        return Err(AppError::invalid_request("code_challenge is required"));
                    }
                }

                let mut code = AuthorizationCode::new(
                    generate_opaque_token(),
                    client.id.clone(),
                    user.id.clone(),
                    redirect_uri.clone(),
                    scope,
                    ttl(self.config.authorization_code_ttl_secs),
                )
                .with_redirect_uri_explicit(explicit);
                if let Some(challenge) = request.code_challenge {
                    code = code.with_code_challenge(challenge, method);
                }

                self.repos.codes.save(&code).await?;

                Ok(AuthorizationOutcome::Code {
                    code,
                    redirect_uri,
                    state: request.state,
                })
            }
            ResponseType::Token => {
                let user_scope = self.user_effective_scope(&user).await?;
                let resolution =
                    self.policy
                        .resolve(&scope, &client.allowed_scopes, Some(&user_scope));
                let token = self.new_token(
                    &client,
                    Some(user.id.clone()),
                    &resolution,
                    GrantType::Implicit,
                    false,
                );
                self.repos.tokens.save(&token).await?;

                Ok(AuthorizationOutcome::Token {
                    issued: IssuedToken { token, resolution },
                    redirect_uri,
                    state: request.state,
                })
            }
        }
    }

    /// 查找并认证客户端（不检查授权类型）
    ///
    /// 机密客户端必须提供可通过校验的 secret；公开客户端不得提供 secret。
    pub async fn authenticate_client(&self, credentials: &ClientCredentials) -> AppResult<OAuthClient> {
        let client = self.find_active_client(&credentials.client_id).await?;

        match (client.is_public(), &credentials.client_secret) {
            (true, None) => Ok(client),
            (true, Some(_)) => Err(AppError::invalid_client(
                "Public clients must not present a client secret",
            )),
            (false, None) => Err(AppError::invalid_client("Client authentication failed")),
            (false, Some(secret)) => {
                if client.verify_credential(self.hasher.as_ref(), secret.expose_secret())? {
                    Ok(client)
                } else {
                    Err(AppError::invalid_client("Client authentication failed"))
                }
            }
        }
    }

    async fn find_active_client(&self, client_id: &str) -> AppResult<OAuthClient> {
        self.repos
            .clients
            .find_by_id(&OAuthClientId::new(client_id))
            .await?
            .filter(|client| client.is_enabled())
            .ok_or_else(|| AppError::invalid_client("Unknown or inactive client"))
    }

    fn is_enabled(&self, grant_type: GrantType) -> bool {
        let grants = &self.config.grants;
        match grant_type {
            GrantType::AuthorizationCode => grants.authorization_code,
            GrantType::Implicit => grants.implicit,
            GrantType::Password => grants.password,
            GrantType::ClientCredentials => grants.client_credentials,
            GrantType::RefreshToken => grants.refresh_token,
        }
    }

    fn ensure_enabled(&self, grant_type: GrantType) -> AppResult<()> {
        if !self.is_enabled(grant_type) {
            return Err(AppError::unsupported_grant_type(format!(
                "Grant type '{}' is disabled",
                grant_type
            )));
        }
        Ok(())
    }

    fn ensure_client_grant(&self, client: &OAuthClient, grant_type: GrantType) -> AppResult<()> {
        if client.is_public() && grant_type == GrantType::ClientCredentials {
            return Err(AppError::unauthorized_client(
                "Public clients cannot use the client_credentials grant",
            ));
        }
        if !client.is_grant_type_allowed(grant_type) {
            return Err(AppError::unauthorized_client(format!(
                "Client is not allowed to use the {} grant",
                grant_type
            )));
        }
        Ok(())
    }

    /// 该客户端的授权是否附带 refresh_token
    fn issues_refresh_token(&self, client: &OAuthClient) -> bool {
        self.config.grants.refresh_token && client.is_grant_type_allowed(GrantType::RefreshToken)
    }

    async fn load_active_user(&self, user_id: &UserId) -> AppResult<User> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_enabled())
            .ok_or_else(|| AppError::invalid_grant("Resource owner is unknown or inactive"))
    }

    async fn user_effective_scope(&self, user: &User) -> AppResult<ScopeSet> {
        let graph = self.repos.roles.load_graph().await.map_err(report_integrity)?;
        user.effective_scope(&graph)
            .map_err(|e| report_integrity(AppError::from(e)))
    }

    fn new_token(
        &self,
        client: &OAuthClient,
        user_id: Option<UserId>,
        resolution: &ScopeResolution,
        grant_type: GrantType,
        with_refresh_token: bool,
    ) -> Token {
        let token = Token::new(
            generate_opaque_token(),
            client.id.clone(),
            user_id,
            resolution.granted.clone(),
            grant_type,
            ttl(self.config.access_token_ttl_secs),
        );
        if with_refresh_token {
            token.with_refresh_token(generate_opaque_token(), ttl(self.config.refresh_token_ttl_secs))
        } else {
            token
        }
    }

    async fn exchange_authorization_code(
        &self,
        client: &OAuthClient,
        code: &str,
        redirect_uri: Option<&str>,
        code_verifier: Option<&str>,
    ) -> AppResult<IssuedToken> {
        let authorization_code = self
            .repos
            .codes
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::invalid_grant("Invalid authorization code"))?;

        if authorization_code.client_id != client.id {
            return Err(AppError::invalid_grant(
                "Authorization code was issued to another client",
            ));
        }
        if authorization_code.is_used() {
            return Err(AppError::invalid_grant("Authorization code already used"));
        }
        if authorization_code.is_expired_at(Utc::now()) {
            return Err(AppError::invalid_grant("Authorization code expired"));
        }
        if !authorization_code.redirect_uri_matches(redirect_uri) {
            return Err(AppError::invalid_grant(
                "redirect_uri does not match the authorization request",
            ));
        }
        if !authorization_code.has_code_challenge() && (client.is_public() || self.config.require_pkce)
        {
            return Err(AppError::invalid_grant("PKCE is required for this client"));
        }
        if !authorization_code.verify_code_verifier(code_verifier) {
            return Err(AppError::invalid_grant("Invalid code_verifier"));
        }

        let user = self.load_active_user(&authorization_code.user_id).await?;
        let user_scope = self.user_effective_scope(&user).await?;
        let resolution = self.policy.resolve(
            &authorization_code.scope,
            &client.allowed_scopes,
            Some(&user_scope),
        );
        let token = self.new_token(
            client,
            Some(user.id.clone()),
            &resolution,
            GrantType::AuthorizationCode,
            self.issues_refresh_token(client),
        );

        if !self.repos.codes.redeem(code, &token).await? {
            return Err(AppError::invalid_grant("Authorization code already used"));
        }

        Ok(IssuedToken { token, resolution })
    }

    async fn password_grant(
        &self,
        client: &OAuthClient,
        username: &str,
        password: &str,
        scope: &ScopeSet,
    ) -> AppResult<IssuedToken> {
        let user = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::invalid_grant("Invalid username or password"))?;

        if !user.verify_credential(self.hasher.as_ref(), password)? {
            return Err(AppError::invalid_grant("Invalid username or password"));
        }
        if !user.is_enabled() {
            return Err(AppError::invalid_grant("User account is inactive"));
        }

        let user_scope = self.user_effective_scope(&user).await?;
        let resolution = self
            .policy
            .resolve(scope, &client.allowed_scopes, Some(&user_scope));
        let token = self.new_token(
            client,
            Some(user.id.clone()),
            &resolution,
            GrantType::Password,
            self.issues_refresh_token(client),
        );
        self.repos.tokens.save(&token).await?;

        Ok(IssuedToken { token, resolution })
    }

    async fn client_credentials_grant(
        &self,
        client: &OAuthClient,
        scope: &ScopeSet,
    ) -> AppResult<IssuedToken> {
        let resolution = self.policy.resolve(scope, &client.allowed_scopes, None);
        let token = self.new_token(client, None, &resolution, GrantType::ClientCredentials, false);
        self.repos.tokens.save(&token).await?;

        Ok(IssuedToken { token, resolution })
    }

    async fn refresh_token_grant(
        &self,
        client: &OAuthClient,
        refresh_token: &str,
        scope: &ScopeSet,
    ) -> AppResult<IssuedToken> {
        let original = self
            .repos
            .tokens
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::invalid_grant("Invalid refresh token"))?;

        if original.client_id != client.id {
            return Err(AppError::invalid_grant(
                "Refresh token was issued to another client",
            ));
        }
        if !original.is_refresh_active_at(Utc::now()) {
            return Err(AppError::invalid_grant("Refresh token is revoked or expired"));
        }

        let requested = if scope.is_empty() {
            original.scope.clone()
        } else if scope.is_subset(&original.scope) {
            scope.clone()
        } else {
            return Err(AppError::invalid_scope(format!(
                "Requested scope exceeds the original grant: {}",
                scope.difference(&original.scope)
            )));
        };

        let user_scope = match &original.user_id {
            Some(user_id) => {
                let user = self.load_active_user(user_id).await?;
                Some(self.user_effective_scope(&user).await?)
            }
            None => None,
        };
        let resolution = self
            .policy
            .narrow(&requested, &client.allowed_scopes, user_scope.as_ref());
        let token = self.new_token(
            client,
            original.user_id.clone(),
            &resolution,
            GrantType::RefreshToken,
            true,
        );

        if !self.repos.tokens.rotate(refresh_token, &token).await? {
            return Err(AppError::invalid_grant("Refresh token already used"));
        }

        Ok(IssuedToken { token, resolution })
    }

    fn record_issued(&self, grant_type: GrantType, token: &Token) {
        debug!(
            grant_type = %grant_type,
            client_id = %token.client_id,
            state = ?GrantState::Issued,
            "Grant issued"
        );
        info!(
            grant_type = %grant_type,
            client_id = %token.client_id,
            scope = %token.scope,
            refresh = token.refresh_token.is_some(),
            "Token issued"
        );
        counter!("oauth_tokens_issued_total", "grant_type" => grant_type.as_str()).increment(1);
    }

    fn record_rejected(&self, grant_type: &'static str, client_id: &str, err: &AppError) {
        debug!(
            grant_type = %grant_type,
            client_id = %client_id,
            state = ?GrantState::Rejected,
            "Grant rejected"
        );
        if err.is_server_error() {
            error!(grant_type = %grant_type, client_id = %client_id, error = %err, "Grant failed");
        } else {
            warn!(
                grant_type = %grant_type,
                client_id = %client_id,
                error_code = err.error_code(),
                "Grant rejected"
            );
        }
        counter!(
            "oauth_grant_rejections_total",
            "grant_type" => grant_type,
            "error" => err.error_code()
        )
        .increment(1);
    }
}
