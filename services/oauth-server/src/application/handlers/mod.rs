//! Command / Query Handler

pub mod authorize_handler;
pub mod introspect_handler;
pub mod revoke_handler;
pub mod role_handlers;
pub mod token_handler;
pub mod validate_token_handler;

pub use authorize_handler::AuthorizeHandler;
pub use introspect_handler::IntrospectHandler;
pub use revoke_handler::RevokeHandler;
pub use role_handlers::{CreateRoleHandler, DeleteRoleHandler, SetRoleParentHandler};
pub use token_handler::TokenHandler;
pub use validate_token_handler::ValidateTokenHandler;
