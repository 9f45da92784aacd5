// social-auth-core — ambient types shared across the social-auth workspace.
//
// Holds the error taxonomy, the structured logger, and the top-level
// configuration struct. The main crate and the adapters depend on this;
// it depends on nothing else in the workspace.

pub mod error;
pub mod logger;
pub mod options;

pub use error::{ErrorCode, Result, SocialAuthError};
pub use logger::{AuthLogger, LogHandler, LogLevel, LoggerConfig};
pub use options::SocialAuthOptions;
