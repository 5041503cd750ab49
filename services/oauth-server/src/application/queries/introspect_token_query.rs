use warden_cqrs_core::Query;

use crate::domain::services::{ClientCredentials, Introspection};

/// 内省查询（RFC 7662）
#[derive(Debug, Clone)]
pub struct IntrospectTokenQuery {
    pub client: ClientCredentials,
    pub token: String,
    pub token_type_hint: Option<String>,
}

impl Query for IntrospectTokenQuery {
    type Result = Introspection;
    const NAME: &'static str = "oauth.introspect";
}
