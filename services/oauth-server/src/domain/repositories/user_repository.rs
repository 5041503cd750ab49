//! 用户仓储接口

use async_trait::async_trait;
use warden_common::UserId;
use warden_errors::AppResult;

use crate::domain::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// 保存新用户，ID 或用户名已存在时返回 `Conflict`
    async fn save(&self, user: &User) -> AppResult<()>;

    /// 版本检查同 [`OAuthClientRepository::update`](super::OAuthClientRepository::update)
    async fn update(&self, user: &User, expected_version: u64) -> AppResult<()>;
}
