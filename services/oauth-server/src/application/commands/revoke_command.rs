use warden_cqrs_core::Command;

use crate::domain::services::ClientCredentials;

/// 撤销命令（RFC 7009）
#[derive(Debug, Clone)]
pub struct RevokeCommand {
    pub client: ClientCredentials,
    pub token: String,
    pub token_type_hint: Option<String>,
}

impl Command for RevokeCommand {
    type Result = ();
    const NAME: &'static str = "oauth.revoke";
}
