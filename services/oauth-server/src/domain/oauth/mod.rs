//! OAuth2 领域实体

pub mod authorization_code;
pub mod grant_type;
pub mod oauth_client;
pub mod token;

pub use authorization_code::{AuthorizationCode, CodeChallengeMethod};
pub use grant_type::{GrantType, ResponseType, TokenTypeHint};
pub use oauth_client::{
    OAuthClient, OAuthClientError, OAuthClientId, OAuthClientType, generate_client_id,
    generate_client_secret,
};
pub use token::{BEARER, Token};
