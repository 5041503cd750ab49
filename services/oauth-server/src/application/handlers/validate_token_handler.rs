use std::sync::Arc;

use async_trait::async_trait;
use warden_cqrs_core::QueryHandler;
use warden_errors::AppResult;

use crate::application::queries::ValidateTokenQuery;
use crate::domain::oauth::Token;
use crate::domain::scope::ScopeSet;
use crate::domain::services::TokenValidator;

pub struct ValidateTokenHandler {
    validator: Arc<TokenValidator>,
}

impl ValidateTokenHandler {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl QueryHandler<ValidateTokenQuery> for ValidateTokenHandler {
    async fn handle(&self, query: ValidateTokenQuery) -> AppResult<Token> {
        let required = ScopeSet::parse(&query.required_scope)?;
        self.validator.validate(&query.access_token, &required).await
    }
}
