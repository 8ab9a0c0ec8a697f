//! Post-conversion automation actions.
//!
//! The engine selects and sequences an action after a successful
//! conversion; the host executes it (clipboard write, share sheet, file
//! save, location lookup) and reports back through `ActionRan`.

use std::time::Duration;

/// A configured action to run automatically after a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Automation {
    Noop,
    /// Copy the `geo:` URI to the clipboard.
    Copy,
    /// Open the system share sheet with the `geo:` URI.
    ShareGeoUri,
    /// Hand the `geo:` URI straight to a specific app.
    ShareGeoUriWithApp(String),
    /// Save the position's points as a GPX file.
    SaveGpxPoints,
    /// Share a GPX route built from the points.
    ShareGpxRoute,
    /// Share the converted target together with the device's own location.
    ShareLiveLocation,
}

impl Automation {
    /// Parse a stored preference value. `share-geo-uri:<package>` selects a
    /// target app.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Automation> {
        let raw = raw.trim();
        if let Some(package) = raw.strip_prefix("share-geo-uri:") {
            if package.is_empty() {
                return None;
            }
            return Some(Automation::ShareGeoUriWithApp(package.to_owned()));
        }
        match raw {
            "noop" | "" => Some(Automation::Noop),
            "copy" => Some(Automation::Copy),
            "share-geo-uri" => Some(Automation::ShareGeoUri),
            "save-gpx" => Some(Automation::SaveGpxPoints),
            "share-gpx-route" => Some(Automation::ShareGpxRoute),
            "share-live-location" => Some(Automation::ShareLiveLocation),
            _ => None,
        }
    }

    /// Actions that yank the user out of the app (share sheets, app
    /// hand-offs) get a deliberate countdown so an unwanted automation can
    /// be cancelled; quiet local actions run immediately.
    #[must_use]
    pub fn pre_delay(&self, configured: Duration) -> Option<Duration> {
        match self {
            Automation::ShareGeoUri
            | Automation::ShareGeoUriWithApp(_)
            | Automation::ShareGpxRoute
            | Automation::ShareLiveLocation => {
                (!configured.is_zero()).then_some(configured)
            }
            Automation::Noop | Automation::Copy | Automation::SaveGpxPoints => None,
        }
    }

    /// Whether executing this action needs the device's current location.
    #[must_use]
    pub fn needs_location(&self) -> bool {
        matches!(self, Automation::ShareLiveLocation)
    }

    /// All non-noop automations sit behind the paid entitlement.
    #[must_use]
    pub fn requires_entitlement(&self) -> bool {
        !matches!(self, Automation::Noop)
    }
}
