pub mod client;
pub mod error;

pub use client::{ProbeMethod, UrlClient, UrlClientConfig};
pub use error::{NetError, RecoverableKind};
