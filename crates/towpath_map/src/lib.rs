//! Towpath Map
//!
//! The map viewport and everything tied to its lifetime:
//! - The overlay surface abstraction (and a headless implementation)
//! - The map host: viewport state and style-generation lifecycle
//! - Waterway feature layer definitions
//! - Feature-selection state for the info panel

pub mod headless;
pub mod host;
pub mod layers;
pub mod selection;
pub mod surface;

pub use headless::HeadlessSurface;
pub use host::{MapError, MapHost};
pub use layers::{waterway_layers, LineLayer, StyleDocument, VectorSource, WATERWAY_SOURCE_ID};
pub use selection::{FeatureSelection, SelectionChange};
pub use surface::{OverlayDescriptor, OverlayId, OverlaySurface, PopupId, SurfaceError};
