use warden_common::UserId;
use warden_cqrs_core::Command;

use crate::application::dto::AuthorizeResponse;

/// 授权端点命令
#[derive(Debug, Clone, Default)]
pub struct AuthorizeCommand {
    pub client_id: String,
    pub response_type: String,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    /// 已登录的资源所有者
    pub user_id: Option<UserId>,
    /// 资源所有者是否同意授权
    pub approved: bool,
}

impl Command for AuthorizeCommand {
    type Result = AuthorizeResponse;
    const NAME: &'static str = "oauth.authorize";
}
