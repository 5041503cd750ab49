use secrecy::SecretString;
use warden_cqrs_core::Command;

use crate::application::dto::TokenResponse;

/// token 端点命令，字段对应表单参数
#[derive(Debug, Clone, Default)]
pub struct TokenCommand {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

impl Command for TokenCommand {
    type Result = TokenResponse;
    const NAME: &'static str = "oauth.token";
}
