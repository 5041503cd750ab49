//! 密码哈希
//!
//! 客户端密钥与用户密码都通过 [`PasswordHasher`] 校验，默认实现为 Argon2。

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;
use warden_errors::{AppError, AppResult};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is malformed: {0}")]
    InvalidHash(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::internal(err.to_string())
    }
}

/// 哈希协作方
pub trait PasswordHasher: Send + Sync {
    /// 哈希明文
    fn hash(&self, plain: &str) -> AppResult<String>;

    /// 校验明文与哈希是否匹配
    fn verify(&self, plain: &str, hash: &str) -> AppResult<bool>;
}

/// Argon2id 默认参数
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> AppResult<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("s3cret").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("s3cret", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let hasher = Argon2PasswordHasher;
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let err = Argon2PasswordHasher.verify("x", "not-a-phc-string").unwrap_err();
        assert!(err.is_server_error());
    }
}
