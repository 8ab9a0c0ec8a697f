pub mod app_config;
pub mod codec;
pub mod config;
pub mod gpx;
pub mod permission;
pub mod position;
pub mod text;
pub mod uri;

use thiserror::Error;

pub use permission::Permission;
pub use position::Position;
pub use uri::Uri;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
