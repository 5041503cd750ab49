//! 应用层
//!
//! Command / Query 与对应 Handler，负责参数校验并调用领域服务。

pub mod commands;
pub mod dto;
pub mod handlers;
pub mod queries;
