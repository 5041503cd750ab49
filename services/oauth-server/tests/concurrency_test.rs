//! 并发测试
//!
//! 授权码兑换与 refresh token 轮换在并发请求下只能成功一次。

mod common;

use common::TestServer;
use oauth_server::application::commands::TokenCommand;
use oauth_server::application::dto::TokenResponse;
use oauth_server::domain::oauth::GrantType;
use oauth_server::domain::repositories::OAuthClientRepository;
use secrecy::SecretString;
use warden_config::OAuthConfig;
use warden_errors::{AppError, AppResult};

/// 并发发送同一个 token 请求
async fn race(
    t: &TestServer,
    command: TokenCommand,
    attempts: usize,
) -> Vec<AppResult<TokenResponse>> {
    let handles = (0..attempts).map(|_| {
        let server = t.server.clone();
        let command = command.clone();
        tokio::spawn(async move { server.token(command).await })
    });

    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect()
}

fn only_invalid_grant(results: &[AppResult<TokenResponse>]) -> bool {
    results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AppError::InvalidGrant(_)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_code_redeemed_once_under_concurrency() {
    let t = TestServer::new();
    t.confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    let user = t.user("alice", "api").await;
    let code = t.authorization_code("web", &user, "api").await;

    let results = race(&t, t.code_exchange("web", &code), 8).await;

    let issued: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(issued.len(), 1);
    assert!(only_invalid_grant(&results));

    // 胜出的 token 可用
    t.server
        .validate_token(&issued[0].access_token, "api")
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_refresh_rotated_once_under_concurrency() {
    let t = TestServer::new();
    t.confidential_client(
        "test",
        "api",
        &[GrantType::Password, GrantType::RefreshToken],
    )
    .await;
    t.user("alice", "api").await;
    let original = t.password_token("test", "alice", "api").await.unwrap();

    let command = TokenCommand {
        grant_type: "refresh_token".to_string(),
        client_id: "test".to_string(),
        client_secret: Some(SecretString::new("test".to_string())),
        refresh_token: original.refresh_token.clone(),
        ..TokenCommand::default()
    };
    let results = race(&t, command, 8).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(only_invalid_grant(&results));
}

#[tokio::test]
async fn test_concurrent_client_update_conflicts() {
    let t = TestServer::new();
    let client = t
        .confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    let repos = t.server.repositories();

    let mut first = client.clone();
    let mut second = client.clone();
    first.deactivate();
    second.rotate_client_secret("plain$rotated".to_string());

    repos.clients.update(&first, 1).await.unwrap();
    let err = repos.clients.update(&second, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_concurrency_control_can_be_disabled() {
    let config = OAuthConfig {
        enforce_concurrency_control: false,
        ..OAuthConfig::default()
    };
    let t = TestServer::with_config(config);
    let client = t
        .confidential_client("web", "api", &[GrantType::AuthorizationCode])
        .await;
    let repos = t.server.repositories();

    let mut first = client.clone();
    let mut second = client.clone();
    first.deactivate();
    second.activate();

    repos.clients.update(&first, 1).await.unwrap();
    repos.clients.update(&second, 1).await.unwrap();
    let stored = repos.clients.find_by_id(&client.id).await.unwrap().unwrap();
    assert!(stored.is_active);
}
