//! Map host: the single long-lived viewport
//!
//! Owns viewport state (center, zoom) and the style lifecycle. Every style
//! swap invalidates all overlay handles on the surface, so the host counts
//! style generations: work prepared against generation N must not be applied
//! once the host has moved to N+1. Overlay-owning code (the marker registry)
//! checks readiness and generation here before touching the surface.
//!
//! Only the host mutates the viewport; other components add overlays or
//! query state through the surface they share with it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use towpath_core::geo::{clamp_zoom, GB_BOUNDS};
use towpath_core::{GeoPoint, MapView};

use crate::layers::{LineLayer, StyleDocument, VectorSource};
use crate::surface::{OverlaySurface, SurfaceError};

#[derive(Debug, Error)]
pub enum MapError {
    /// Operation on a host that has been torn down. A programming error in
    /// development; tolerated as already-released in production.
    #[error("map host has been torn down")]
    TornDown,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub struct MapHost<S: OverlaySurface> {
    surface: Arc<S>,
    view: Mutex<MapView>,
    /// 0 until the first style loads, then incremented per swap.
    generation: AtomicU64,
    ready: AtomicBool,
    torn_down: AtomicBool,
}

impl<S: OverlaySurface> MapHost<S> {
    /// Create the host without a style; not ready until a style is applied.
    pub fn new(surface: Arc<S>, view: MapView) -> Self {
        let view = MapView::new(GB_BOUNDS.clamp(view.center), clamp_zoom(view.zoom));
        Self {
            surface,
            view: Mutex::new(view),
            generation: AtomicU64::new(0),
            ready: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Create the host and load the initial style in one go.
    pub fn initialize(surface: Arc<S>, view: MapView, style: &StyleDocument) -> Result<Self, MapError> {
        let host = Self::new(surface, view);
        host.change_style(style)?;
        Ok(host)
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    /// Swap the base style. Readiness drops, the generation advances, and
    /// every previously issued overlay handle is dead once this returns.
    ///
    /// The caller re-adds feature layers and resyncs markers afterwards;
    /// the host only owns the viewport and the readiness signal.
    pub fn change_style(&self, style: &StyleDocument) -> Result<u64, MapError> {
        self.guard()?;
        self.ready.store(false, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.surface.apply_style(style)?;
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!(style = %style.name, generation, "map style ready");
        Ok(generation)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst) && !self.torn_down.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn center(&self) -> GeoPoint {
        self.view().center
    }

    pub fn zoom(&self) -> f64 {
        self.view().zoom
    }

    pub fn view(&self) -> MapView {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recenter the viewport, clamped to the supported bounds and zoom range.
    pub fn jump_to(&self, center: GeoPoint, zoom: f64) -> Result<(), MapError> {
        self.guard()?;
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.center = GB_BOUNDS.clamp(center);
        view.zoom = clamp_zoom(zoom);
        Ok(())
    }

    pub fn zoom_in(&self) -> Result<f64, MapError> {
        self.step_zoom(1.0)
    }

    pub fn zoom_out(&self) -> Result<f64, MapError> {
        self.step_zoom(-1.0)
    }

    fn step_zoom(&self, delta: f64) -> Result<f64, MapError> {
        self.guard()?;
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.zoom = clamp_zoom(view.zoom + delta);
        Ok(view.zoom)
    }

    /// Install the waterway source and its line layers on the current style.
    pub fn add_waterways(&self, source: &VectorSource, layers: &[LineLayer]) -> Result<(), MapError> {
        self.guard()?;
        self.surface.add_vector_source(source)?;
        for layer in layers {
            self.surface.add_line_layer(layer)?;
        }
        Ok(())
    }

    /// Release the viewport. Must be called exactly once, on unmount; a
    /// second call is a bug and is ignored beyond a debug assert.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            debug_assert!(false, "map host torn down twice");
            tracing::warn!("ignoring repeated map host teardown");
            return;
        }
        self.ready.store(false, Ordering::SeqCst);
        tracing::info!("map host torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn guard(&self) -> Result<(), MapError> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(MapError::TornDown);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;
    use towpath_core::geo::{DEFAULT_ZOOM, FALLBACK_CENTER, MAX_ZOOM};

    fn style(name: &str) -> StyleDocument {
        StyleDocument::new(name, format!("https://tiles.example/styles/{name}"))
    }

    fn host() -> MapHost<HeadlessSurface> {
        MapHost::initialize(
            Arc::new(HeadlessSurface::new()),
            MapView::default(),
            &style("day"),
        )
        .unwrap()
    }

    #[test]
    fn initialize_loads_style_and_signals_ready() {
        let host = host();
        assert!(host.is_ready());
        assert_eq!(host.generation(), 1);
        assert_eq!(host.center(), FALLBACK_CENTER);
        assert_eq!(host.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn style_swap_bumps_generation() {
        let host = host();
        let generation = host.change_style(&style("night")).unwrap();
        assert_eq!(generation, 2);
        assert!(host.is_ready());
        assert_eq!(host.surface().style_name().as_deref(), Some("night"));
    }

    #[test]
    fn failed_style_swap_leaves_host_not_ready() {
        let host = host();
        host.surface().reject_next_style();
        assert!(host.change_style(&style("night")).is_err());
        assert!(!host.is_ready());
        // Generation still advanced; stale work must not land.
        assert_eq!(host.generation(), 2);
    }

    #[test]
    fn viewport_mutations_are_clamped() {
        let host = host();
        host.jump_to(GeoPoint::new(-50.0, 51.0), 30.0).unwrap();
        assert_eq!(host.zoom(), MAX_ZOOM);
        assert!(GB_BOUNDS.contains(host.center()));

        host.jump_to(FALLBACK_CENTER, MAX_ZOOM).unwrap();
        assert_eq!(host.zoom_in().unwrap(), MAX_ZOOM);
        assert_eq!(host.zoom_out().unwrap(), MAX_ZOOM - 1.0);
    }

    #[test]
    fn operations_after_teardown_fail() {
        let host = host();
        host.teardown();
        assert!(!host.is_ready());
        assert!(matches!(
            host.change_style(&style("night")),
            Err(MapError::TornDown)
        ));
        assert!(matches!(
            host.jump_to(FALLBACK_CENTER, DEFAULT_ZOOM),
            Err(MapError::TornDown)
        ));
    }
}
