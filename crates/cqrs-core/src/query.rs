//! Query trait 定义

use async_trait::async_trait;
use warden_errors::AppResult;

/// Query trait
pub trait Query: Send + Sync {
    type Result: Send;

    /// 用于日志与指标的查询名
    const NAME: &'static str;
}

/// Query Handler trait
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q) -> AppResult<Q::Result>;
}
