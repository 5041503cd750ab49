//! 领域服务

pub mod authorization_policy;
pub mod grant;
pub mod password_service;
pub mod revocation;
pub mod token_generator;
pub mod token_validator;

pub use authorization_policy::{AuthorizationPolicy, ScopeResolution};
pub use grant::{
    AuthorizationOutcome, AuthorizationRequest, ClientCredentials, GrantProcessor, GrantRequest,
    GrantState, IssuedToken,
};
pub use password_service::{Argon2PasswordHasher, PasswordError, PasswordHasher};
pub use revocation::RevocationProcessor;
pub use token_generator::generate_opaque_token;
pub use token_validator::{Introspection, TokenValidator};
