//! 指标测试
//!
//! Prometheus recorder 是进程级全局状态，本文件只放一个测试。

mod common;

use common::TestServer;
use oauth_server::application::commands::RevokeCommand;
use oauth_server::domain::oauth::GrantType;
use oauth_server::domain::services::ClientCredentials;

#[tokio::test]
async fn test_grant_metrics_are_recorded() {
    let handle = warden_telemetry::init_metrics().unwrap();

    let t = TestServer::new();
    t.confidential_client("test", "api", &[GrantType::Password]).await;
    t.user("alice", "api").await;

    let issued = t.password_token("test", "alice", "api").await.unwrap();
    assert!(t.password_token("test", "mallory", "api").await.is_err());
    t.server
        .revoke(RevokeCommand {
            client: ClientCredentials::new("test", Some("test".to_string())),
            token: issued.access_token,
            token_type_hint: None,
        })
        .await
        .unwrap();

    let rendered = handle.render();
    assert!(rendered.contains("oauth_tokens_issued_total"));
    assert!(rendered.contains("grant_type=\"password\""));
    assert!(rendered.contains("oauth_grant_rejections_total"));
    assert!(rendered.contains("error=\"invalid_grant\""));
    assert!(rendered.contains("oauth_tokens_revoked_total"));
}
