use url::Url;

/// 授权端点成功响应：客户端重定向地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeResponse {
    pub redirect_to: Url,
}

impl AuthorizeResponse {
    /// 读取 query 参数
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.redirect_to
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// 读取 fragment 参数（implicit 流程）
    pub fn fragment_param(&self, name: &str) -> Option<String> {
        let fragment = self.redirect_to.fragment()?;
        url::form_urlencoded::parse(fragment.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}
