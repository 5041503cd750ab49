//! 授权流程测试
//!
//! 覆盖五种授权类型的签发路径与主要拒绝路径。

mod common;

use common::{REDIRECT_URI, TestServer, VERIFIER, challenge};
use oauth_server::application::commands::{AuthorizeCommand, RevokeCommand, TokenCommand};
use oauth_server::domain::oauth::GrantType;
use oauth_server::domain::repositories::{OAuthClientRepository, UserRepository};
use oauth_server::domain::services::ClientCredentials;
use secrecy::SecretString;
use warden_config::OAuthConfig;
use warden_errors::AppError;

#[tokio::test]
async fn test_issue_revoke_validate_round_trip() {
    let t = TestServer::new();
    t.confidential_client(
        "test",
        "profile api",
        &[GrantType::Password, GrantType::RefreshToken],
    )
    .await;
    t.user("alice", "profile").await;

    let issued = t.password_token("test", "alice", "profile api").await.unwrap();
    assert_eq!(issued.scope, "profile");
    assert_eq!(issued.token_type, "Bearer");
    assert_eq!(issued.expires_in, 3600);
    assert!(issued.refresh_token.is_some());

    let token = t
        .server
        .validate_token(&issued.access_token, "profile")
        .await
        .unwrap();
    assert_eq!(token.scope.to_string(), "profile");
    assert!(matches!(
        t.server.validate_token(&issued.access_token, "api").await,
        Err(AppError::InsufficientScope(_))
    ));

    t.server
        .revoke(RevokeCommand {
            client: ClientCredentials::new("test", Some("test".to_string())),
            token: issued.access_token.clone(),
            token_type_hint: None,
        })
        .await
        .unwrap();

    assert!(matches!(
        t.server.validate_token(&issued.access_token, "profile").await,
        Err(AppError::InvalidToken(_))
    ));
}

#[tokio::test]
async fn test_authorization_code_with_pkce() {
    let t = TestServer::new();
    t.confidential_client(
        "web",
        "profile api",
        &[GrantType::AuthorizationCode, GrantType::RefreshToken],
    )
    .await;
    let user = t.user("alice", "profile api").await;

    let code = t.authorization_code("web", &user, "api").await;
    let issued = t.server.token(t.code_exchange("web", &code)).await.unwrap();
    assert_eq!(issued.scope, "api");
    assert!(issued.refresh_token.is_some());

    let replay = t.server.token(t.code_exchange("web", &code)).await;
    assert!(matches!(replay, Err(AppError::InvalidGrant(_))));
}

#[tokio::test]
async fn test_code_exchange_rejections() {
    let t = TestServer::new();
    t.confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    t.confidential_client("other", "api", &[GrantType::AuthorizationCode])
        .await;
    let user = t.user("alice", "api").await;

    let code = t.authorization_code("web", &user, "api").await;
    let wrong_verifier = TokenCommand {
        code_verifier: Some("a".repeat(43)),
        ..t.code_exchange("web", &code)
    };
    assert!(matches!(
        t.server.token(wrong_verifier).await,
        Err(AppError::InvalidGrant(_))
    ));

    let wrong_client = t.code_exchange("other", &code);
    assert!(matches!(
        t.server.token(wrong_client).await,
        Err(AppError::InvalidGrant(_))
    ));

    let wrong_redirect = TokenCommand {
        redirect_uri: Some("https://client.example.com/other".to_string()),
        ..t.code_exchange("web", &code)
    };
    assert!(matches!(
        t.server.token(wrong_redirect).await,
        Err(AppError::InvalidGrant(_))
    ));

    let bad_secret = TokenCommand {
        client_secret: Some(SecretString::new("nope".to_string())),
        ..t.code_exchange("web", &code)
    };
    assert!(matches!(
        t.server.token(bad_secret).await,
        Err(AppError::InvalidClient(_))
    ));

    // 失败的尝试不消耗授权码
    let issued = t.server.token(t.code_exchange("web", &code)).await.unwrap();
    assert_eq!(issued.scope, "api");
    assert!(issued.refresh_token.is_none());
}

#[tokio::test]
async fn test_explicit_redirect_uri_must_be_repeated() {
    let t = TestServer::new();
    t.confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    let user = t.user("alice", "api").await;

    let response = t
        .server
        .authorize(AuthorizeCommand {
            client_id: "web".to_string(),
            response_type: "code".to_string(),
            redirect_uri: Some(REDIRECT_URI.to_string()),
            user_id: Some(user.id.clone()),
            approved: true,
            ..AuthorizeCommand::default()
        })
        .await
        .unwrap();
    assert!(response.redirect_to.as_str().starts_with(REDIRECT_URI));
    let code = response.query_param("code").unwrap();

    let exchange = TokenCommand {
        code_verifier: None,
        ..t.code_exchange("web", &code)
    };
    assert!(matches!(
        t.server.token(exchange).await,
        Err(AppError::InvalidGrant(_))
    ));

    let exchange = TokenCommand {
        code_verifier: None,
        redirect_uri: Some(REDIRECT_URI.to_string()),
        ..t.code_exchange("web", &code)
    };
    assert!(t.server.token(exchange).await.is_ok());
}

#[tokio::test]
async fn test_authorize_rejections() {
    let t = TestServer::new();
    t.confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    let user = t.user("alice", "api").await;

    let base = AuthorizeCommand {
        client_id: "web".to_string(),
        response_type: "code".to_string(),
        user_id: Some(user.id.clone()),
        approved: true,
        ..AuthorizeCommand::default()
    };

    let cases = [
        (
            AuthorizeCommand {
                client_id: "ghost".to_string(),
                ..base.clone()
            },
            "invalid_client",
        ),
        (
            AuthorizeCommand {
                response_type: "id_token".to_string(),
                ..base.clone()
            },
            "unsupported_response_type",
        ),
        (
            AuthorizeCommand {
                response_type: "token".to_string(),
                ..base.clone()
            },
            "unauthorized_client",
        ),
        (
            AuthorizeCommand {
                redirect_uri: Some("https://evil.example.com/cb".to_string()),
                ..base.clone()
            },
            "invalid_request",
        ),
        (
            AuthorizeCommand {
                scope: Some("api\"".to_string()),
                ..base.clone()
            },
            "invalid_scope",
        ),
        (
            AuthorizeCommand {
                user_id: None,
                ..base.clone()
            },
            "access_denied",
        ),
        (
            AuthorizeCommand {
                approved: false,
                ..base.clone()
            },
            "access_denied",
        ),
    ];

    for (command, expected) in cases {
        let err = t.server.authorize(command).await.unwrap_err();
        assert_eq!(err.error_code(), expected, "{}", err);
    }
}

#[tokio::test]
async fn test_implicit_grant_uses_fragment() {
    let t = TestServer::new();
    t.confidential_client("spa", "profile api", &[GrantType::Implicit])
        .await;
    let user = t.user("alice", "profile").await;

    let response = t
        .server
        .authorize(AuthorizeCommand {
            client_id: "spa".to_string(),
            response_type: "token".to_string(),
            scope: Some("profile api".to_string()),
            state: Some("s1".to_string()),
            user_id: Some(user.id.clone()),
            approved: true,
            ..AuthorizeCommand::default()
        })
        .await
        .unwrap();

    assert!(response.query_param("access_token").is_none());
    assert_eq!(response.fragment_param("token_type").as_deref(), Some("Bearer"));
    assert_eq!(response.fragment_param("expires_in").as_deref(), Some("3600"));
    assert_eq!(response.fragment_param("scope").as_deref(), Some("profile"));
    assert_eq!(response.fragment_param("state").as_deref(), Some("s1"));

    let access_token = response.fragment_param("access_token").unwrap();
    let token = t.server.validate_token(&access_token, "profile").await.unwrap();
    assert!(token.refresh_token.is_none());
    assert_eq!(token.grant_type, GrantType::Implicit);
}

#[tokio::test]
async fn test_implicit_is_rejected_at_token_endpoint() {
    let t = TestServer::new();
    t.confidential_client("spa", "api", &[GrantType::Implicit]).await;

    let err = t
        .server
        .token(TokenCommand {
            grant_type: "implicit".to_string(),
            client_id: "spa".to_string(),
            client_secret: Some(SecretString::new("spa".to_string())),
            ..TokenCommand::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedGrantType(_)));
}

#[tokio::test]
async fn test_client_credentials_grant() {
    let t = TestServer::new();
    t.confidential_client(
        "svc",
        "api",
        &[GrantType::ClientCredentials, GrantType::RefreshToken],
    )
    .await;

    let issued = t
        .server
        .token(TokenCommand {
            grant_type: "client_credentials".to_string(),
            client_id: "svc".to_string(),
            client_secret: Some(SecretString::new("svc".to_string())),
            scope: Some("api admin".to_string()),
            ..TokenCommand::default()
        })
        .await
        .unwrap();

    assert_eq!(issued.scope, "api");
    assert!(issued.refresh_token.is_none());

    let token = t.server.validate_token(&issued.access_token, "api").await.unwrap();
    assert!(token.user_id.is_none());
}

#[tokio::test]
async fn test_public_client_rules() {
    let t = TestServer::new();
    t.public_client(
        "mobile",
        "api",
        &[GrantType::AuthorizationCode, GrantType::ClientCredentials],
    )
    .await;
    let user = t.user("alice", "api").await;

    let without_pkce = t
        .server
        .authorize(AuthorizeCommand {
            client_id: "mobile".to_string(),
            response_type: "code".to_string(),
            user_id: Some(user.id.clone()),
            approved: true,
            ..AuthorizeCommand::default()
        })
        .await;
    assert!(matches!(without_pkce, Err(AppError::InvalidRequest(_))));

    let code = t.authorization_code("mobile", &user, "api").await;

    let with_secret = t.code_exchange("mobile", &code);
    assert!(matches!(
        t.server.token(with_secret).await,
        Err(AppError::InvalidClient(_))
    ));

    let issued = t
        .server
        .token(TokenCommand {
            client_secret: None,
            ..t.code_exchange("mobile", &code)
        })
        .await
        .unwrap();
    assert_eq!(issued.scope, "api");

    let client_credentials = t
        .server
        .token(TokenCommand {
            grant_type: "client_credentials".to_string(),
            client_id: "mobile".to_string(),
            ..TokenCommand::default()
        })
        .await;
    assert!(matches!(
        client_credentials,
        Err(AppError::UnauthorizedClient(_))
    ));
}

#[tokio::test]
async fn test_refresh_subset_law() {
    let t = TestServer::new();
    t.confidential_client(
        "test",
        "profile api",
        &[GrantType::Password, GrantType::RefreshToken],
    )
    .await;
    t.user("alice", "profile api").await;

    let original = t.password_token("test", "alice", "profile api").await.unwrap();
    let refresh_token = original.refresh_token.clone().unwrap();

    let refresh = |scope: &str, token: &str| TokenCommand {
        grant_type: "refresh_token".to_string(),
        client_id: "test".to_string(),
        client_secret: Some(SecretString::new("test".to_string())),
        refresh_token: Some(token.to_string()),
        scope: Some(scope.to_string()),
        ..TokenCommand::default()
    };

    let widened = t.server.token(refresh("profile api admin", &refresh_token)).await;
    assert!(matches!(widened, Err(AppError::InvalidScope(_))));

    let narrowed = t.server.token(refresh("api", &refresh_token)).await.unwrap();
    assert_eq!(narrowed.scope, "api");
    let rotated = narrowed.refresh_token.clone().unwrap();
    assert_ne!(rotated, refresh_token);

    // 轮换后旧 refresh_token 与旧 access_token 都失效
    assert!(matches!(
        t.server.token(refresh("api", &refresh_token)).await,
        Err(AppError::InvalidGrant(_))
    ));
    assert!(matches!(
        t.server.validate_token(&original.access_token, "api").await,
        Err(AppError::InvalidToken(_))
    ));

    // 新授权的上限是轮换后的 scope
    assert!(matches!(
        t.server.token(refresh("profile", &rotated)).await,
        Err(AppError::InvalidScope(_))
    ));
    let again = t.server.token(refresh("", &rotated)).await.unwrap();
    assert_eq!(again.scope, "api");
}

#[tokio::test]
async fn test_password_grant_rejections() {
    let t = TestServer::new();
    t.confidential_client("test", "api", &[GrantType::Password]).await;
    let mut bob = t.user("bob", "api").await;
    t.user("alice", "api").await;

    let wrong_password = t
        .server
        .token(TokenCommand {
            grant_type: "password".to_string(),
            client_id: "test".to_string(),
            client_secret: Some(SecretString::new("test".to_string())),
            username: Some("alice".to_string()),
            password: Some(SecretString::new("guess".to_string())),
            ..TokenCommand::default()
        })
        .await;
    assert!(matches!(wrong_password, Err(AppError::InvalidGrant(_))));

    assert!(matches!(
        t.password_token("test", "nobody", "api").await,
        Err(AppError::InvalidGrant(_))
    ));

    bob.deactivate();
    t.server
        .repositories()
        .users
        .update(&bob, 1)
        .await
        .unwrap();
    assert!(matches!(
        t.password_token("test", "bob", "api").await,
        Err(AppError::InvalidGrant(_))
    ));

    let issued = t.password_token("test", "alice", "api").await.unwrap();
    assert!(issued.refresh_token.is_none());
}

#[tokio::test]
async fn test_disabled_grant_and_inactive_client() {
    let mut config = OAuthConfig::default();
    config.grants.password = false;
    let t = TestServer::with_config(config);
    let mut client = t
        .confidential_client(
            "test",
            "api",
            &[GrantType::Password, GrantType::ClientCredentials],
        )
        .await;
    t.user("alice", "api").await;

    assert!(matches!(
        t.password_token("test", "alice", "api").await,
        Err(AppError::UnsupportedGrantType(_))
    ));

    client.deactivate();
    t.server
        .repositories()
        .clients
        .update(&client, 1)
        .await
        .unwrap();

    let err = t
        .server
        .token(TokenCommand {
            grant_type: "client_credentials".to_string(),
            client_id: "test".to_string(),
            client_secret: Some(SecretString::new("test".to_string())),
            ..TokenCommand::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidClient(_)));
}

#[tokio::test]
async fn test_require_pkce_for_all_clients() {
    let config = OAuthConfig {
        require_pkce: true,
        ..OAuthConfig::default()
    };
    let t = TestServer::with_config(config);
    t.confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    let user = t.user("alice", "api").await;

    let err = t
        .server
        .authorize(AuthorizeCommand {
            client_id: "web".to_string(),
            response_type: "code".to_string(),
            user_id: Some(user.id.clone()),
            approved: true,
            ..AuthorizeCommand::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));

    let response = t
        .server
        .authorize(AuthorizeCommand {
            client_id: "web".to_string(),
            response_type: "code".to_string(),
            code_challenge: Some(challenge()),
            code_challenge_method: Some("S256".to_string()),
            user_id: Some(user.id.clone()),
            approved: true,
            ..AuthorizeCommand::default()
        })
        .await
        .unwrap();
    let code = response.query_param("code").unwrap();

    let exchange = TokenCommand {
        code_verifier: Some(VERIFIER.to_string()),
        ..t.code_exchange("web", &code)
    };
    assert!(t.server.token(exchange).await.is_ok());
}
