//! Scope 值对象
//!
//! 语法遵循 RFC 6749 §3.3：`scope-token = 1*( %x21 / %x23-5B / %x5D-7E )`，
//! 多个 token 以单个空格分隔。

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use warden_errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Scope contains an empty token")]
    EmptyToken,

    #[error("Scope token '{0}' contains characters outside the allowed set")]
    InvalidCharacter(String),
}

impl From<ScopeError> for AppError {
    fn from(err: ScopeError) -> Self {
        AppError::invalid_scope_format(err.to_string())
    }
}

fn is_scope_char(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x5B | 0x5D..=0x7E)
}

/// 单个 scope token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(String);

impl Scope {
    pub fn new(token: impl Into<String>) -> Result<Self, ScopeError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ScopeError::EmptyToken);
        }
        if !token.bytes().all(is_scope_char) {
            return Err(ScopeError::InvalidCharacter(token));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scope 集合
///
/// 以字典序保存，`Display` 输出稳定。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 解析空格分隔的 scope 字符串，空串得到空集合
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        if raw.is_empty() {
            return Ok(Self::empty());
        }
        raw.split(' ').map(Scope::new).collect()
    }

    /// 解析可选参数，缺省视为空集合
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ScopeError> {
        raw.map_or_else(|| Ok(Self::empty()), Self::parse)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|scope| scope.as_str() == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.0.iter()
    }

    pub fn insert(&mut self, scope: Scope) -> bool {
        self.0.insert(scope)
    }

    pub fn remove(&mut self, scope: &Scope) -> bool {
        self.0.remove(scope)
    }

    pub fn intersection(&self, other: &ScopeSet) -> ScopeSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &ScopeSet) -> ScopeSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn extend(&mut self, other: &ScopeSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn is_subset(&self, other: &ScopeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// 不在 `other` 中的 scope
    pub fn difference(&self, other: &ScopeSet) -> ScopeSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for ScopeSet {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ScopeSet {
    type Item = &'a Scope;
    type IntoIter = std::collections::btree_set::Iter<'a, Scope>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(raw: &str) -> ScopeSet {
        ScopeSet::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_and_display_sorted() {
        let set = scopes("write profile api");
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_string(), "api profile write");
    }

    #[test]
    fn test_empty_string_is_empty_set() {
        assert!(scopes("").is_empty());
        assert_eq!(ScopeSet::empty().to_string(), "");
        assert!(ScopeSet::parse_optional(None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(scopes("api api").len(), 1);
    }

    #[test]
    fn test_rejects_empty_tokens() {
        assert_eq!(ScopeSet::parse("a  b"), Err(ScopeError::EmptyToken));
        assert_eq!(ScopeSet::parse(" a"), Err(ScopeError::EmptyToken));
        assert_eq!(ScopeSet::parse("a "), Err(ScopeError::EmptyToken));
    }

    #[test]
    fn test_rejects_characters_outside_grammar() {
        assert!(matches!(
            ScopeSet::parse("a\"b"),
            Err(ScopeError::InvalidCharacter(_))
        ));
        assert!(ScopeSet::parse("a\\b").is_err());
        assert!(ScopeSet::parse("caf\u{e9}").is_err());
        assert!(ScopeSet::parse("tab\there").is_err());
        assert!(ScopeSet::parse("\u{7f}").is_err());
        assert!(ScopeSet::parse("read:user files/*").is_ok());
    }

    #[test]
    fn test_format_error_maps_to_invalid_scope_code() {
        let err: AppError = ScopeSet::parse("a\"b").unwrap_err().into();
        assert!(matches!(err, AppError::InvalidScopeFormat(_)));
        assert_eq!(err.error_code(), "invalid_scope");
    }

    #[test]
    fn test_set_algebra() {
        let requested = scopes("profile api admin");
        let allowed = scopes("profile api");

        let granted = requested.intersection(&allowed);
        assert_eq!(granted, allowed);
        assert!(granted.is_subset(&requested));
        assert_eq!(requested.difference(&allowed).to_string(), "admin");
        assert_eq!(allowed.union(&scopes("email")).to_string(), "api email profile");
        assert!(granted.contains("api"));
        assert!(!granted.contains("admin"));
    }

    #[test]
    fn test_serde_as_space_separated_string() {
        let json = serde_json::to_string(&scopes("b a")).unwrap();
        assert_eq!(json, "\"a b\"");

        let back: ScopeSet = serde_json::from_str("\"profile api\"").unwrap();
        assert_eq!(back, scopes("api profile"));

        assert!(serde_json::from_str::<ScopeSet>("\"a  b\"").is_err());
    }
}
