//! Overlay surface abstraction
//!
//! The rendering library underneath the map is imperative: you hand it DOM
//! elements and get opaque handles back, and every handle dies with the
//! style it was created under. This trait is the narrow waist between that
//! world and the marker logic, so the registry can be driven against an
//! in-memory surface in tests.

use thiserror::Error;
use towpath_core::GeoPoint;

use crate::layers::{LineLayer, StyleDocument, VectorSource};

/// Handle to a rendered marker overlay. Valid until destroyed or until the
/// surface's style is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// Handle to a hover popup bound to an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(pub u64);

/// Visual description of a marker overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDescriptor {
    /// Emoji glyph rendered inside the marker badge.
    pub glyph: String,
    /// Text shown in the hover popup (owner name).
    pub label: String,
    /// Dark badge backdrop for the night theme.
    pub night: bool,
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("style '{0}' rejected by surface")]
    StyleRejected(String),
    #[error("no style applied yet")]
    NoStyle,
    #[error("unknown overlay handle {0}")]
    UnknownOverlay(u64),
    #[error("unknown popup handle {0}")]
    UnknownPopup(u64),
}

/// The operations the map logic needs from a rendering surface.
///
/// Implementations use interior mutability; all methods take `&self` so a
/// surface can be shared between the host, the registry and the poller task.
pub trait OverlaySurface: Send + Sync + 'static {
    /// Replace the base style. Discards every overlay, popup, source and
    /// layer previously added; the caller re-adds what it needs.
    fn apply_style(&self, style: &StyleDocument) -> Result<(), SurfaceError>;

    fn add_vector_source(&self, source: &VectorSource) -> Result<(), SurfaceError>;

    fn add_line_layer(&self, layer: &LineLayer) -> Result<(), SurfaceError>;

    fn create_overlay(
        &self,
        at: GeoPoint,
        descriptor: &OverlayDescriptor,
    ) -> Result<OverlayId, SurfaceError>;

    fn move_overlay(&self, id: OverlayId, to: GeoPoint) -> Result<(), SurfaceError>;

    /// Destroying an unknown handle is a no-op; handles die en masse on
    /// style replacement and callers may lag behind.
    fn destroy_overlay(&self, id: OverlayId);

    /// Create a popup anchored to an overlay, initially hidden.
    fn create_popup(&self, overlay: OverlayId, text: &str) -> Result<PopupId, SurfaceError>;

    fn set_popup_visible(&self, id: PopupId, visible: bool) -> Result<(), SurfaceError>;

    fn destroy_popup(&self, id: PopupId);
}
