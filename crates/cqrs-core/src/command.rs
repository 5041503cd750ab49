//! Command trait 定义

use async_trait::async_trait;
use warden_errors::AppResult;

/// Command trait
pub trait Command: Send + Sync {
    type Result: Send;

    /// 用于日志与指标的命令名
    const NAME: &'static str;
}

/// Command Handler trait
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> AppResult<C::Result>;
}
