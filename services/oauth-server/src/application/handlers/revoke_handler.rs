use std::sync::Arc;

use async_trait::async_trait;
use warden_cqrs_core::CommandHandler;
use warden_errors::AppResult;

use crate::application::commands::RevokeCommand;
use crate::domain::oauth::TokenTypeHint;
use crate::domain::services::{GrantProcessor, RevocationProcessor};

pub struct RevokeHandler {
    processor: Arc<GrantProcessor>,
    revocation: Arc<RevocationProcessor>,
}

impl RevokeHandler {
    pub fn new(processor: Arc<GrantProcessor>, revocation: Arc<RevocationProcessor>) -> Self {
        Self {
            processor,
            revocation,
        }
    }
}

#[async_trait]
impl CommandHandler<RevokeCommand> for RevokeHandler {
    async fn handle(&self, command: RevokeCommand) -> AppResult<()> {
        let client = self.processor.authenticate_client(&command.client).await?;
        let hint = TokenTypeHint::parse(command.token_type_hint.as_deref());
        self.revocation.revoke(&client, &command.token, hint).await
    }
}
