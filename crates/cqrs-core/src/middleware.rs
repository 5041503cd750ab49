//! 日志装饰器
//!
//! 包装任意 Handler，记录执行结果；服务端错误记为 error，其余拒绝记为 warn。

use async_trait::async_trait;
use warden_errors::AppResult;

use crate::{Command, CommandHandler, Query, QueryHandler};

/// 带日志的 Handler 包装
pub struct Logged<H> {
    inner: H,
}

impl<H> Logged<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

fn record<R>(name: &'static str, result: &AppResult<R>) {
    match result {
        Ok(_) => tracing::debug!(operation = name, "Operation completed"),
        Err(e) if e.is_server_error() => {
            tracing::error!(operation = name, error = %e, "Operation failed")
        }
        Err(e) => tracing::warn!(
            operation = name,
            error_code = e.error_code(),
            "Operation rejected"
        ),
    }
}

#[async_trait]
impl<C, H> CommandHandler<C> for Logged<H>
where
    C: Command + 'static,
    H: CommandHandler<C>,
{
    async fn handle(&self, command: C) -> AppResult<C::Result> {
        tracing::debug!(operation = C::NAME, "Executing command");
        let result = self.inner.handle(command).await;
        record(C::NAME, &result);
        result
    }
}

#[async_trait]
impl<Q, H> QueryHandler<Q> for Logged<H>
where
    Q: Query + 'static,
    H: QueryHandler<Q>,
{
    async fn handle(&self, query: Q) -> AppResult<Q::Result> {
        tracing::debug!(operation = Q::NAME, "Executing query");
        let result = self.inner.handle(query).await;
        record(Q::NAME, &result);
        result
    }
}
