//! 仓储接口
//!
//! 存储由外部协作方实现；授权码兑换与 refresh token 轮换要求存储层原子完成。

pub mod authorization_code_repository;
pub mod oauth_client_repository;
pub mod role_repository;
pub mod token_repository;
pub mod user_repository;

pub use authorization_code_repository::*;
pub use oauth_client_repository::*;
pub use role_repository::*;
pub use token_repository::*;
pub use user_repository::*;

use std::sync::Arc;

/// 引擎使用的全部仓储
#[derive(Clone)]
pub struct OAuthRepositories {
    pub clients: Arc<dyn OAuthClientRepository>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub codes: Arc<dyn AuthorizationCodeRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

impl OAuthRepositories {
    /// 由同一个存储实现提供全部仓储
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OAuthClientRepository
            + UserRepository
            + RoleRepository
            + AuthorizationCodeRepository
            + TokenRepository
            + 'static,
    {
        Self {
            clients: store.clone(),
            users: store.clone(),
            roles: store.clone(),
            codes: store.clone(),
            tokens: store,
        }
    }
}
