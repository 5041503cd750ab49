//! 集成测试公共设施

#![allow(dead_code)]

use std::sync::Arc;

use oauth_server::AuthorizationServer;
use oauth_server::application::commands::{AuthorizeCommand, TokenCommand};
use oauth_server::application::dto::TokenResponse;
use oauth_server::domain::oauth::{CodeChallengeMethod, GrantType, OAuthClient, OAuthClientId};
use oauth_server::domain::repositories::{OAuthClientRepository, RoleRepository, UserRepository};
use oauth_server::domain::role::Role;
use oauth_server::domain::scope::ScopeSet;
use oauth_server::domain::services::PasswordHasher;
use oauth_server::domain::user::User;
use oauth_server::infrastructure::persistence::InMemoryStore;
use secrecy::SecretString;
use warden_config::OAuthConfig;
use warden_errors::AppResult;

pub const REDIRECT_URI: &str = "https://client.example.com/cb";
/// RFC 7636 附录 B
pub const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

/// 明文比较的哈希实现，避免测试中运行 Argon2
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plain: &str) -> AppResult<String> {
        Ok(format!("plain${}", plain))
    }

    fn verify(&self, plain: &str, hash: &str) -> AppResult<bool> {
        Ok(hash.strip_prefix("plain$") == Some(plain))
    }
}

pub fn scopes(raw: &str) -> ScopeSet {
    ScopeSet::parse(raw).unwrap()
}

pub fn challenge() -> String {
    CodeChallengeMethod::S256.challenge(VERIFIER)
}

pub struct TestServer {
    pub server: Arc<AuthorizationServer>,
    pub store: Arc<InMemoryStore>,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_config(OAuthConfig::default())
    }

    pub fn with_config(config: OAuthConfig) -> Self {
        let store = Arc::new(InMemoryStore::from_config(&config));
        let server = AuthorizationServer::builder(config)
            .with_store(store.clone())
            .with_password_hasher(Arc::new(PlainHasher))
            .build()
            .unwrap();
        Self {
            server: Arc::new(server),
            store,
        }
    }

    /// 注册机密客户端，secret 与 client_id 相同
    pub async fn confidential_client(
        &self,
        id: &str,
        allowed: &str,
        grants: &[GrantType],
    ) -> OAuthClient {
        let client = OAuthClient::confidential(
            OAuthClientId::new(id),
            format!("{} app", id),
            PlainHasher.hash(id).unwrap(),
            vec![REDIRECT_URI.to_string()],
        )
        .unwrap()
        .with_grant_types(grants.to_vec())
        .with_allowed_scopes(scopes(allowed));
        self.server.repositories().clients.save(&client).await.unwrap();
        client
    }

    pub async fn public_client(&self, id: &str, allowed: &str, grants: &[GrantType]) -> OAuthClient {
        let client = OAuthClient::public(
            OAuthClientId::new(id),
            format!("{} app", id),
            vec![REDIRECT_URI.to_string()],
        )
        .unwrap()
        .with_grant_types(grants.to_vec())
        .with_allowed_scopes(scopes(allowed));
        self.server.repositories().clients.save(&client).await.unwrap();
        client
    }

    /// 注册用户，密码与用户名相同
    pub async fn user(&self, username: &str, direct: &str) -> User {
        let user =
            User::new(username, PlainHasher.hash(username).unwrap()).with_scopes(scopes(direct));
        self.server.repositories().users.save(&user).await.unwrap();
        user
    }

    pub async fn save_user(&self, user: &User) {
        self.server.repositories().users.save(user).await.unwrap();
    }

    pub async fn role(&self, role: &Role) {
        self.server.repositories().roles.save(role).await.unwrap();
    }

    pub async fn password_token(
        &self,
        client_id: &str,
        username: &str,
        scope: &str,
    ) -> AppResult<TokenResponse> {
        self.server
            .token(TokenCommand {
                grant_type: "password".to_string(),
                client_id: client_id.to_string(),
                client_secret: Some(SecretString::new(client_id.to_string())),
                username: Some(username.to_string()),
                password: Some(SecretString::new(username.to_string())),
                scope: Some(scope.to_string()),
                ..TokenCommand::default()
            })
            .await
    }

    /// 走完 `/authorize`，返回授权码
    pub async fn authorization_code(&self, client_id: &str, user: &User, scope: &str) -> String {
        let response = self
            .server
            .authorize(AuthorizeCommand {
                client_id: client_id.to_string(),
                response_type: "code".to_string(),
                scope: Some(scope.to_string()),
                state: Some("xyz".to_string()),
                code_challenge: Some(challenge()),
                code_challenge_method: Some("S256".to_string()),
                user_id: Some(user.id.clone()),
                approved: true,
                ..AuthorizeCommand::default()
            })
            .await
            .unwrap();
        assert_eq!(response.query_param("state").as_deref(), Some("xyz"));
        response.query_param("code").unwrap()
    }

    pub fn code_exchange(&self, client_id: &str, code: &str) -> TokenCommand {
        TokenCommand {
            grant_type: "authorization_code".to_string(),
            client_id: client_id.to_string(),
            client_secret: Some(SecretString::new(client_id.to_string())),
            code: Some(code.to_string()),
            code_verifier: Some(VERIFIER.to_string()),
            ..TokenCommand::default()
        }
    }
}
