//! OAuth Client 仓储接口

use async_trait::async_trait;
use warden_errors::AppResult;

use crate::domain::oauth::{OAuthClient, OAuthClientId};

/// OAuth Client 仓储接口
#[async_trait]
pub trait OAuthClientRepository: Send + Sync {
    /// 根据 ID 查找 Client
    async fn find_by_id(&self, id: &OAuthClientId) -> AppResult<Option<OAuthClient>>;

    /// 保存新 Client，ID 已存在时返回 `Conflict`
    async fn save(&self, client: &OAuthClient) -> AppResult<()>;

    /// 更新 Client
    ///
    /// `expected_version` 为读取时的版本，与存储版本不一致时返回 `Conflict`。
    async fn update(&self, client: &OAuthClient, expected_version: u64) -> AppResult<()>;

    /// 删除 Client
    async fn delete(&self, id: &OAuthClientId) -> AppResult<()>;
}
