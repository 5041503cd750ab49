//! 客户端认证参数提取
//!
//! 支持 HTTP Basic（RFC 6749 §2.3.1）与表单 `client_id` / `client_secret`，
//! 两种方式不能同时使用。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::form_urlencoded;
use warden_errors::{AppError, AppResult};

use crate::domain::services::ClientCredentials;

use super::endpoint::EndpointRequest;

/// 还原 `application/x-www-form-urlencoded` 编码的凭证片段
fn form_decode(raw: &str) -> String {
    let pair = format!("v={}", raw.replace('&', "%26"));
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

fn decode_basic(header: &str) -> AppResult<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))
        .ok_or_else(|| AppError::invalid_client("Unsupported authorization scheme"))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::invalid_client("Malformed Basic credentials"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AppError::invalid_client("Malformed Basic credentials"))?;

    let (id, secret) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::invalid_client("Malformed Basic credentials"))?;
    Ok((form_decode(id), form_decode(secret)))
}

/// 从请求中提取客户端认证信息
pub fn client_credentials(request: &EndpointRequest) -> AppResult<ClientCredentials> {
    if let Some(header) = &request.authorization {
        if request.param("client_secret").is_some() {
            return Err(AppError::invalid_request(
                "Client credentials must not be sent by more than one method",
            ));
        }
        let (client_id, secret) = decode_basic(header)?;
        if let Some(form_id) = request.param("client_id") {
            if form_id != client_id {
                return Err(AppError::invalid_request(
                    "client_id does not match the Authorization header",
                ));
            }
        }
        let secret = (!secret.is_empty()).then_some(secret);
        return Ok(ClientCredentials::new(client_id, secret));
    }

    let client_id = request
        .param_owned("client_id")
        .ok_or_else(|| AppError::invalid_client("Client authentication is required"))?;
    Ok(ClientCredentials::new(
        client_id,
        request.param_owned("client_secret"),
    ))
}
