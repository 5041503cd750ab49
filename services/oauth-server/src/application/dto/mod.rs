//! 响应 DTO

mod authorize_response;
mod token_response;

pub use authorize_response::AuthorizeResponse;
pub use token_response::TokenResponse;
