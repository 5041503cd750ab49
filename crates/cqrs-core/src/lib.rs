//! warden-cqrs-core - CQRS 核心库
//!
//! Command/Query trait 与日志装饰器

mod command;
mod middleware;
mod query;

pub use command::*;
pub use middleware::*;
pub use query::*;
