//! One module per supported mapping service.

mod apple_maps;
mod coordinates;
mod geo_uri;
mod google_maps;
mod here_wego;
mod magic_earth;
mod mapy;
mod openstreetmap;
mod organic_maps;
mod osmand;
mod waze;
mod yandex_maps;

pub use apple_maps::AppleMaps;
pub use coordinates::Coordinates;
pub use geo_uri::GeoUri;
pub use google_maps::GoogleMaps;
pub use here_wego::HereWeGo;
pub use magic_earth::MagicEarth;
pub use mapy::Mapy;
pub use openstreetmap::OpenStreetMap;
pub use organic_maps::OrganicMaps;
pub use osmand::OsmAnd;
pub use waze::Waze;
pub use yandex_maps::YandexMaps;
