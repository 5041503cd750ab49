//! 授权服务装配
//!
//! 配置在构建时校验一次，之后不可变；引擎本身只持有配置与仓储句柄，可在并发请求间共享。

use std::sync::Arc;

use tracing::info;
use warden_config::OAuthConfig;
use warden_cqrs_core::{CommandHandler, Logged, QueryHandler};
use warden_errors::{AppError, AppResult};

use crate::api::EndpointRegistry;
use crate::application::commands::{
    AuthorizeCommand, CreateRoleCommand, DeleteRoleCommand, RevokeCommand, SetRoleParentCommand,
    TokenCommand,
};
use crate::application::dto::{AuthorizeResponse, TokenResponse};
use crate::application::handlers::{
    AuthorizeHandler, CreateRoleHandler, DeleteRoleHandler, IntrospectHandler, RevokeHandler,
    SetRoleParentHandler, TokenHandler, ValidateTokenHandler,
};
use crate::application::queries::{IntrospectTokenQuery, ValidateTokenQuery};
use crate::domain::oauth::Token;
use crate::domain::repositories::OAuthRepositories;
use crate::domain::role::RoleId;
use crate::domain::scope::ScopeSet;
use crate::domain::services::{
    Argon2PasswordHasher, AuthorizationPolicy, GrantProcessor, Introspection, PasswordHasher,
    RevocationProcessor, TokenValidator,
};
use crate::infrastructure::persistence::InMemoryStore;

pub struct AuthorizationServerBuilder {
    config: OAuthConfig,
    repos: Option<OAuthRepositories>,
    hasher: Option<Arc<dyn PasswordHasher>>,
}

impl AuthorizationServerBuilder {
    pub fn with_repositories(mut self, repos: OAuthRepositories) -> Self {
        self.repos = Some(repos);
        self
    }

    pub fn with_store(self, store: Arc<InMemoryStore>) -> Self {
        self.with_repositories(OAuthRepositories::from_store(store))
    }

    pub fn with_password_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// 校验配置并装配各 Handler；未指定仓储时使用内存存储
    pub fn build(self) -> AppResult<AuthorizationServer> {
        self.config
            .validate()
            .map_err(|e| AppError::internal(e.to_string()))?;
        let default_scope = ScopeSet::parse(&self.config.default_scope)
            .map_err(|e| AppError::internal(format!("Invalid default_scope: {}", e)))?;

        let config = Arc::new(self.config);
        let repos = self.repos.unwrap_or_else(|| {
            OAuthRepositories::from_store(Arc::new(InMemoryStore::from_config(&config)))
        });
        let hasher: Arc<dyn PasswordHasher> = match self.hasher {
            Some(hasher) => hasher,
            None => Arc::new(Argon2PasswordHasher),
        };

        let processor = Arc::new(GrantProcessor::new(
            repos.clone(),
            hasher,
            AuthorizationPolicy::new(default_scope),
            config.clone(),
        ));
        let revocation = Arc::new(RevocationProcessor::new(repos.tokens.clone()));
        let validator = Arc::new(TokenValidator::new(repos.tokens.clone(), repos.users.clone()));

        info!(
            url_prefix = %config.url_prefix,
            require_pkce = config.require_pkce,
            enforce_concurrency_control = config.enforce_concurrency_control,
            "Authorization server configured"
        );

        Ok(AuthorizationServer {
            authorize_handler: Logged::new(AuthorizeHandler::new(processor.clone())),
            token_handler: Logged::new(TokenHandler::new(processor.clone())),
            revoke_handler: Logged::new(RevokeHandler::new(processor.clone(), revocation)),
            introspect_handler: Logged::new(IntrospectHandler::new(
                processor.clone(),
                validator.clone(),
            )),
            validate_token_handler: Logged::new(ValidateTokenHandler::new(validator)),
            create_role_handler: Logged::new(CreateRoleHandler::new(repos.roles.clone())),
            set_role_parent_handler: Logged::new(SetRoleParentHandler::new(repos.roles.clone())),
            delete_role_handler: Logged::new(DeleteRoleHandler::new(repos.roles.clone())),
            processor,
            repos,
            config,
        })
    }
}

/// OAuth2 授权服务
pub struct AuthorizationServer {
    config: Arc<OAuthConfig>,
    repos: OAuthRepositories,
    processor: Arc<GrantProcessor>,
    authorize_handler: Logged<AuthorizeHandler>,
    token_handler: Logged<TokenHandler>,
    revoke_handler: Logged<RevokeHandler>,
    introspect_handler: Logged<IntrospectHandler>,
    validate_token_handler: Logged<ValidateTokenHandler>,
    create_role_handler: Logged<CreateRoleHandler>,
    set_role_parent_handler: Logged<SetRoleParentHandler>,
    delete_role_handler: Logged<DeleteRoleHandler>,
}

impl AuthorizationServer {
    pub fn builder(config: OAuthConfig) -> AuthorizationServerBuilder {
        AuthorizationServerBuilder {
            config,
            repos: None,
            hasher: None,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn repositories(&self) -> &OAuthRepositories {
        &self.repos
    }

    pub fn processor(&self) -> &GrantProcessor {
        &self.processor
    }

    /// 默认端点表
    pub fn endpoints(self: &Arc<Self>) -> EndpointRegistry {
        EndpointRegistry::with_defaults(self.clone())
    }

    pub async fn authorize(&self, command: AuthorizeCommand) -> AppResult<AuthorizeResponse> {
        CommandHandler::handle(&self.authorize_handler, command).await
    }

    pub async fn token(&self, command: TokenCommand) -> AppResult<TokenResponse> {
        CommandHandler::handle(&self.token_handler, command).await
    }

    pub async fn revoke(&self, command: RevokeCommand) -> AppResult<()> {
        CommandHandler::handle(&self.revoke_handler, command).await
    }

    pub async fn introspect(&self, query: IntrospectTokenQuery) -> AppResult<Introspection> {
        QueryHandler::handle(&self.introspect_handler, query).await
    }

    /// 校验受保护操作携带的 access_token 与所需 scope
    pub async fn validate_token(&self, access_token: &str, required_scope: &str) -> AppResult<Token> {
        let query = ValidateTokenQuery {
            access_token: access_token.to_string(),
            required_scope: required_scope.to_string(),
        };
        QueryHandler::handle(&self.validate_token_handler, query).await
    }

    pub async fn create_role(&self, command: CreateRoleCommand) -> AppResult<RoleId> {
        CommandHandler::handle(&self.create_role_handler, command).await
    }

    pub async fn set_role_parent(&self, command: SetRoleParentCommand) -> AppResult<()> {
        CommandHandler::handle(&self.set_role_parent_handler, command).await
    }

    pub async fn delete_role(&self, command: DeleteRoleCommand) -> AppResult<Vec<RoleId>> {
        CommandHandler::handle(&self.delete_role_handler, command).await
    }
}
