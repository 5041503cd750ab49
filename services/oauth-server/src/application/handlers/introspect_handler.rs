use std::sync::Arc;

use async_trait::async_trait;
use warden_cqrs_core::QueryHandler;
use warden_errors::AppResult;

use crate::application::queries::IntrospectTokenQuery;
use crate::domain::oauth::TokenTypeHint;
use crate::domain::services::{GrantProcessor, Introspection, TokenValidator};

pub struct IntrospectHandler {
    processor: Arc<GrantProcessor>,
    validator: Arc<TokenValidator>,
}

impl IntrospectHandler {
    pub fn new(processor: Arc<GrantProcessor>, validator: Arc<TokenValidator>) -> Self {
        Self {
            processor,
            validator,
        }
    }
}

#[async_trait]
impl QueryHandler<IntrospectTokenQuery> for IntrospectHandler {
    async fn handle(&self, query: IntrospectTokenQuery) -> AppResult<Introspection> {
        let client = self.processor.authenticate_client(&query.client).await?;
        let hint = TokenTypeHint::parse(query.token_type_hint.as_deref());
        self.validator.introspect(&client, &query.token, hint).await
    }
}
