//! Token 仓储接口

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_errors::AppResult;

use crate::domain::oauth::Token;

/// Token 仓储接口
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn find_by_access_token(&self, access_token: &str) -> AppResult<Option<Token>>;

    async fn find_by_refresh_token(&self, refresh_token: &str) -> AppResult<Option<Token>>;

    /// 保存新 Token
    async fn save(&self, token: &Token) -> AppResult<()>;

    /// 撤销 access_token，返回状态是否改变
    async fn revoke_access_token(&self, access_token: &str) -> AppResult<bool>;

    /// 撤销 refresh_token 所属的整个授权，返回状态是否改变
    async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<bool>;

    /// 轮换 refresh_token
    ///
    /// `old_refresh_token` 仍有效时撤销其所属授权（两半）并保存 `new_token`，
    /// 作为一个整体完成并返回 `true`；否则不做修改并返回 `false`。
    async fn rotate(&self, old_refresh_token: &str, new_token: &Token) -> AppResult<bool>;

    /// 删除两半都已失效的 Token
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
