//! OAuth 命令

pub mod authorize_command;
pub mod revoke_command;
pub mod role_commands;
pub mod token_command;

pub use authorize_command::*;
pub use revoke_command::*;
pub use role_commands::*;
pub use token_command::*;
