//! Permission resolution.
//!
//! A network-gated step resolves its effective permission from three layers:
//! an explicit answer already threaded through the state (a one-off dialog
//! result), the persisted preference, and finally the `Ask` default. Once
//! resolved, a dialog answer and a persisted default behave identically.

use geolink_core::Permission;

use crate::prefs::PreferenceStore;

/// Resolve the effective permission for a connection-gated step.
#[must_use]
pub fn effective_permission(
    explicit: Option<Permission>,
    prefs: &dyn PreferenceStore,
) -> Permission {
    explicit
        .or_else(|| prefs.connection_permission())
        .unwrap_or_default()
}

/// Persist a dialog answer when the user ticked "don't ask again".
pub fn persist_decision(granted: bool, do_not_ask: bool, prefs: &dyn PreferenceStore) {
    if do_not_ask {
        let permission = if granted {
            Permission::Always
        } else {
            Permission::Never
        };
        prefs.set_connection_permission(permission);
    }
}
