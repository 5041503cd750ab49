//! 授权码实体

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use warden_common::UserId;
use warden_errors::AppError;

use crate::domain::scope::ScopeSet;

use super::oauth_client::OAuthClientId;

/// PKCE code_challenge_method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    Plain,
    S256,
}

impl CodeChallengeMethod {
    /// 由 code_verifier 计算 code_challenge
    pub fn challenge(&self, code_verifier: &str) -> String {
        match self {
            Self::Plain => code_verifier.to_string(),
            Self::S256 => URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes())),
        }
    }
}

impl FromStr for CodeChallengeMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "S256" => Ok(Self::S256),
            other => Err(AppError::invalid_request(format!(
                "Unsupported code_challenge_method '{}'",
                other
            ))),
        }
    }
}

/// RFC 7636 §4.1：43-128 个 unreserved 字符
fn is_valid_code_verifier(verifier: &str) -> bool {
    (43..=128).contains(&verifier.len())
        && verifier
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}

/// 授权码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// 授权码（加密随机字符串）
    pub code: String,
    pub client_id: OAuthClientId,
    pub user_id: UserId,
    /// 最终使用的重定向 URI
    pub redirect_uri: String,
    /// 授权请求是否显式携带了 redirect_uri
    pub redirect_uri_explicit: bool,
    /// 授权请求中的 scope，兑换时再与 client / user 求交
    pub scope: ScopeSet,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<CodeChallengeMethod>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationCode {
    pub fn new(
        code: String,
        client_id: OAuthClientId,
        user_id: UserId,
        redirect_uri: String,
        scope: ScopeSet,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            code,
            client_id,
            user_id,
            redirect_uri,
            redirect_uri_explicit: true,
            scope,
            code_challenge: None,
            code_challenge_method: None,
            expires_at: now + ttl,
            used: false,
            created_at: now,
        }
    }

    /// 记录重定向 URI 是否由授权请求显式提供
    pub fn with_redirect_uri_explicit(mut self, explicit: bool) -> Self {
        self.redirect_uri_explicit = explicit;
        self
    }

    /// 绑定 PKCE challenge，未指定方法时按 RFC 7636 视为 `plain`
    pub fn with_code_challenge(
        mut self,
        challenge: String,
        method: Option<CodeChallengeMethod>,
    ) -> Self {
        self.code_challenge = Some(challenge);
        self.code_challenge_method = Some(method.unwrap_or(CodeChallengeMethod::Plain));
        self
    }

    /// 检查是否过期
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// 标记为已使用
    pub fn mark_as_used(&mut self) {
        self.used = true;
    }

    pub fn has_code_challenge(&self) -> bool {
        self.code_challenge.is_some()
    }

    /// 兑换时的 redirect_uri 是否与授权请求一致
    ///
    /// 授权请求显式携带时兑换请求必须给出相同值；否则兑换请求可以省略。
    pub fn redirect_uri_matches(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(uri) => uri == self.redirect_uri,
            None => !self.redirect_uri_explicit,
        }
    }

    /// 验证 PKCE code_verifier
    pub fn verify_code_verifier(&self, code_verifier: Option<&str>) -> bool {
        match (&self.code_challenge, code_verifier) {
            (None, None) => true,
            (None, Some(_)) | (Some(_), None) => false,
            (Some(challenge), Some(verifier)) => {
                let method = self.code_challenge_method.unwrap_or(CodeChallengeMethod::Plain);
                is_valid_code_verifier(verifier) && method.challenge(verifier) == *challenge
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

    fn code() -> AuthorizationCode {
        AuthorizationCode::new(
            "code-1".to_string(),
            OAuthClientId::new("web"),
            UserId::new(),
            "https://example.com/cb".to_string(),
            ScopeSet::parse("profile").unwrap(),
            Duration::minutes(10),
        )
    }

    #[test]
    fn test_new_code_is_fresh() {
        let code = code();

        assert!(!code.is_used());
        assert!(!code.is_expired());
        assert!(code.is_expired_at(code.expires_at));
        assert!(!code.has_code_challenge());
    }

    #[test]
    fn test_s256_matches_rfc7636_appendix_b() {
        assert_eq!(
            CodeChallengeMethod::S256.challenge(VERIFIER),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );

        let code = code().with_code_challenge(
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string(),
            Some(CodeChallengeMethod::S256),
        );
        assert!(code.verify_code_verifier(Some(VERIFIER)));
        assert!(!code.verify_code_verifier(Some(&VERIFIER.replace('d', "e"))));
        assert!(!code.verify_code_verifier(None));
    }

    #[test]
    fn test_plain_is_default_method() {
        let code = code().with_code_challenge(VERIFIER.to_string(), None);

        assert_eq!(code.code_challenge_method, Some(CodeChallengeMethod::Plain));
        assert!(code.verify_code_verifier(Some(VERIFIER)));
    }

    #[test]
    fn test_short_verifier_rejected() {
        let code = code().with_code_challenge("short".to_string(), None);
        assert!(!code.verify_code_verifier(Some("short")));
    }

    #[test]
    fn test_verifier_without_challenge_rejected() {
        let code = code();
        assert!(code.verify_code_verifier(None));
        assert!(!code.verify_code_verifier(Some(VERIFIER)));
    }

    #[test]
    fn test_redirect_uri_binding() {
        let explicit = code();
        assert!(explicit.redirect_uri_matches(Some("https://example.com/cb")));
        assert!(!explicit.redirect_uri_matches(Some("https://example.com/other")));
        assert!(!explicit.redirect_uri_matches(None));

        let defaulted = code().with_redirect_uri_explicit(false);
        assert!(defaulted.redirect_uri_matches(None));
        assert!(defaulted.redirect_uri_matches(Some("https://example.com/cb")));
    }

    #[test]
    fn test_unknown_challenge_method() {
        assert!("S512".parse::<CodeChallengeMethod>().is_err());
        assert_eq!(
            "S256".parse::<CodeChallengeMethod>().unwrap(),
            CodeChallengeMethod::S256
        );
    }
}
