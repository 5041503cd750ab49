use warden_cqrs_core::Query;

use crate::domain::oauth::Token;

/// 校验受保护操作携带的 access_token
#[derive(Debug, Clone)]
pub struct ValidateTokenQuery {
    pub access_token: String,
    /// 空格分隔的所需 scope
    pub required_scope: String,
}

impl Query for ValidateTokenQuery {
    type Result = Token;
    const NAME: &'static str = "oauth.validate_token";
}
