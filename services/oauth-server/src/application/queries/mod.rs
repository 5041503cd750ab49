//! OAuth 查询

pub mod introspect_token_query;
pub mod validate_token_query;

pub use introspect_token_query::*;
pub use validate_token_query::*;
