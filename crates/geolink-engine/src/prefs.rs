//! Preference storage collaborator.
//!
//! The engine reads and writes a handful of keys: the standing connection
//! permission (shared by unshortening and HTML parsing), the configured
//! automation and its delay, and the last product id observed as purchased
//! (the synchronous fallback when billing is still loading).

use std::sync::Mutex;
use std::time::Duration;

use geolink_core::Permission;

use crate::automation::Automation;

pub trait PreferenceStore: Send + Sync {
    fn connection_permission(&self) -> Option<Permission>;
    fn set_connection_permission(&self, permission: Permission);

    fn automation(&self) -> Automation;
    fn automation_delay(&self) -> Duration;

    fn cached_product_id(&self) -> Option<String>;
    fn set_cached_product_id(&self, product: &str);
}

#[derive(Debug, Default)]
struct Inner {
    connection_permission: Option<Permission>,
    automation: Option<Automation>,
    automation_delay: Option<Duration>,
    cached_product_id: Option<String>,
}

/// Mutex-backed store; the host syncs it to durable storage on its own
/// schedule.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    inner: Mutex<Inner>,
}

impl InMemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        InMemoryPreferences::default()
    }

    #[must_use]
    pub fn with_automation(self, automation: Automation) -> Self {
        self.inner.lock().expect("prefs lock").automation = Some(automation);
        self
    }

    #[must_use]
    pub fn with_automation_delay(self, delay: Duration) -> Self {
        self.inner.lock().expect("prefs lock").automation_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn with_connection_permission(self, permission: Permission) -> Self {
        self.inner.lock().expect("prefs lock").connection_permission = Some(permission);
        self
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn connection_permission(&self) -> Option<Permission> {
        self.inner.lock().expect("prefs lock").connection_permission
    }

    fn set_connection_permission(&self, permission: Permission) {
        self.inner.lock().expect("prefs lock").connection_permission = Some(permission);
    }

    fn automation(&self) -> Automation {
        self.inner
            .lock()
            .expect("prefs lock")
            .automation
            .clone()
            .unwrap_or(Automation::Noop)
    }

    fn automation_delay(&self) -> Duration {
        self.inner
            .lock()
            .expect("prefs lock")
            .automation_delay
            .unwrap_or(Duration::from_secs(3))
    }

    fn cached_product_id(&self) -> Option<String> {
        self.inner.lock().expect("prefs lock").cached_product_id.clone()
    }

    fn set_cached_product_id(&self, product: &str) {
        self.inner.lock().expect("prefs lock").cached_product_id = Some(product.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_noop_ask_and_three_seconds() {
        let prefs = InMemoryPreferences::new();
        assert_eq!(prefs.connection_permission(), None);
        assert_eq!(prefs.automation(), Automation::Noop);
        assert_eq!(prefs.automation_delay(), Duration::from_secs(3));
        assert_eq!(prefs.cached_product_id(), None);
    }

    #[test]
    fn builder_presets_apply() {
        let prefs = InMemoryPreferences::new()
            .with_automation(Automation::Copy)
            .with_automation_delay(Duration::from_millis(50))
            .with_connection_permission(Permission::Always);
        assert_eq!(prefs.automation(), Automation::Copy);
        assert_eq!(prefs.automation_delay(), Duration::from_millis(50));
        assert_eq!(prefs.connection_permission(), Some(Permission::Always));
    }

    #[test]
    fn writes_are_visible_to_reads() {
        let prefs = InMemoryPreferences::new();
        prefs.set_connection_permission(Permission::Never);
        prefs.set_cached_product_id("automation");
        assert_eq!(prefs.connection_permission(), Some(Permission::Never));
        assert_eq!(prefs.cached_product_id(), Some("automation".to_owned()));
    }
}
