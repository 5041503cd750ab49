use serde::{Deserialize, Serialize};

use crate::domain::services::IssuedToken;

/// token 端点成功响应（RFC 6749 §5.1）
///
/// `scope` 始终返回，授予结果与请求不同时客户端据此得知。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub scope: String,
}

impl From<&IssuedToken> for TokenResponse {
    fn from(issued: &IssuedToken) -> Self {
        let token = &issued.token;
        Self {
            access_token: token.access_token.clone(),
            token_type: token.token_type().to_string(),
            expires_in: token.expires_in_at(token.issued_at),
            refresh_token: token.refresh_token.clone(),
            scope: issued.resolution.granted.to_string(),
        }
    }
}
