//! 有效 scope 计算
//!
//! granted = requested ∩ client ∩ user，只做交集，结果为空不是错误。

use crate::domain::scope::ScopeSet;

/// scope 计算结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeResolution {
    /// 代入默认值之后的请求 scope
    pub requested: ScopeSet,
    pub granted: ScopeSet,
}

impl ScopeResolution {
    /// 授予的 scope 与请求不同，响应中必须回显
    pub fn differs_from_request(&self) -> bool {
        self.requested != self.granted
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    default_scope: ScopeSet,
}

impl AuthorizationPolicy {
    pub fn new(default_scope: ScopeSet) -> Self {
        Self { default_scope }
    }

    pub fn default_scope(&self) -> &ScopeSet {
        &self.default_scope
    }

    /// 计算授予的 scope，请求为空时使用默认 scope
    ///
    /// `user` 为 `None` 表示没有资源所有者（client_credentials）。
    pub fn resolve(
        &self,
        requested: &ScopeSet,
        client: &ScopeSet,
        user: Option<&ScopeSet>,
    ) -> ScopeResolution {
        let requested = if requested.is_empty() {
            self.default_scope.clone()
        } else {
            requested.clone()
        };
        Self::intersect(requested, client, user)
    }

    /// 不代入默认值的交集，refresh 时使用
    pub fn narrow(
        &self,
        requested: &ScopeSet,
        client: &ScopeSet,
        user: Option<&ScopeSet>,
    ) -> ScopeResolution {
        Self::intersect(requested.clone(), client, user)
    }

    fn intersect(requested: ScopeSet, client: &ScopeSet, user: Option<&ScopeSet>) -> ScopeResolution {
        let mut granted = requested.intersection(client);
        if let Some(user) = user {
            granted = granted.intersection(user);
        }
        ScopeResolution { requested, granted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(raw: &str) -> ScopeSet {
        ScopeSet::parse(raw).unwrap()
    }

    #[test]
    fn test_three_way_intersection() {
        let policy = AuthorizationPolicy::default();
        let requested = scopes("profile api admin email");
        let client = scopes("profile api email");
        let user = scopes("profile email admin");

        let resolution = policy.resolve(&requested, &client, Some(&user));

        assert_eq!(resolution.granted, scopes("email profile"));
        assert!(resolution.granted.is_subset(&requested));
        assert!(resolution.granted.is_subset(&client));
        assert!(resolution.granted.is_subset(&user));
        assert!(resolution.differs_from_request());
    }

    #[test]
    fn test_client_only_path() {
        let policy = AuthorizationPolicy::default();
        let resolution = policy.resolve(&scopes("api"), &scopes("api profile"), None);

        assert_eq!(resolution.granted, scopes("api"));
        assert!(!resolution.differs_from_request());
    }

    #[test]
    fn test_empty_request_uses_default_scope() {
        let policy = AuthorizationPolicy::new(scopes("profile"));
        let resolution = policy.resolve(&ScopeSet::empty(), &scopes("profile api"), None);

        assert_eq!(resolution.requested, scopes("profile"));
        assert_eq!(resolution.granted, scopes("profile"));
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let policy = AuthorizationPolicy::default();
        let resolution = policy.resolve(&scopes("admin"), &scopes("profile"), Some(&scopes("admin")));

        assert!(resolution.granted.is_empty());
        assert!(resolution.differs_from_request());
    }

    #[test]
    fn test_narrow_keeps_empty_request_empty() {
        let policy = AuthorizationPolicy::new(scopes("profile"));
        let resolution = policy.narrow(&ScopeSet::empty(), &scopes("profile"), None);

        assert!(resolution.granted.is_empty());
    }
}
