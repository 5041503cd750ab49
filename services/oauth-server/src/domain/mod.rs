//! 领域层

pub mod capabilities;
pub mod oauth;
pub mod repositories;
pub mod role;
pub mod scope;
pub mod services;
pub mod user;
