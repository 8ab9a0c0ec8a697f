//! Application configuration for hosts embedding the conversion engine.

use crate::permission::Permission;

/// Runtime configuration, loaded from `GEOLINK_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Overall per-request timeout for unshortening and HTML fetches.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Standing permission for network access (unshorten + HTML parsing).
    /// `None` means "never decided"; the engine treats that as ask-first.
    pub connection_permission: Option<Permission>,
    /// Automation action name; parsed by the host (`noop`, `copy`,
    /// `share-geo-uri`, `save-gpx`, ...).
    pub automation_action: String,
    /// Deliberate delay before open-app/share automations run.
    pub automation_delay_secs: u64,
    /// How long a web-render fallback may wait for a usable URL change.
    pub web_timeout_secs: u64,
}
