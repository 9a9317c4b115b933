//! Towpath Core
//!
//! Contains the fundamental domain types shared by every crate:
//! - Geographic points, bounds and view state
//! - Boat positions and marker keys
//! - The session store
//! - Day/night theme and selected-feature types

pub mod boat;
pub mod feature;
pub mod geo;
pub mod session;
pub mod theme;

pub use boat::{BoatPosition, MarkerKey};
pub use feature::{FeatureValue, SelectedFeature};
pub use geo::{GeoBounds, GeoPoint, MapView};
pub use session::{Profile, SessionStore, SharedSession};
pub use theme::Theme;

/// App version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
