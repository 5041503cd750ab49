//! 授权码仓储接口

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_errors::AppResult;

use crate::domain::oauth::{AuthorizationCode, Token};

/// 授权码仓储接口
#[async_trait]
pub trait AuthorizationCodeRepository: Send + Sync {
    /// 根据授权码查找
    async fn find_by_code(&self, code: &str) -> AppResult<Option<AuthorizationCode>>;

    /// 保存授权码
    async fn save(&self, authorization_code: &AuthorizationCode) -> AppResult<()>;

    /// 兑换授权码
    ///
    /// 授权码存在且未使用时，标记为已使用并保存 `token`，两步作为一个整体完成并返回 `true`；
    /// 否则不做任何修改并返回 `false`。并发兑换同一授权码时只有一个调用返回 `true`。
    async fn redeem(&self, code: &str, token: &Token) -> AppResult<bool>;

    /// 删除过期的授权码
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
