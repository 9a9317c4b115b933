//! In-memory overlay surface
//!
//! Implements [`OverlaySurface`] without any rendering library. Serves two
//! purposes: the fallback surface for headless runs, and the observable
//! fixture the marker tests drive against.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;
use towpath_core::GeoPoint;

use crate::layers::{LineLayer, StyleDocument, VectorSource};
use crate::surface::{OverlayDescriptor, OverlayId, OverlaySurface, PopupId, SurfaceError};

#[derive(Debug, Clone)]
struct OverlayState {
    position: GeoPoint,
    descriptor: OverlayDescriptor,
}

#[derive(Debug, Clone)]
struct PopupState {
    overlay: OverlayId,
    text: String,
    visible: bool,
}

#[derive(Default)]
pub struct HeadlessSurface {
    next_id: AtomicU64,
    style: Mutex<Option<String>>,
    overlays: DashMap<u64, OverlayState>,
    popups: DashMap<u64, PopupState>,
    sources: DashMap<String, VectorSource>,
    layers: Mutex<Vec<LineLayer>>,
    reject_next_style: AtomicBool,
    reject_next_overlay: AtomicBool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn require_style(&self) -> Result<(), SurfaceError> {
        if self.style.lock().unwrap_or_else(|e| e.into_inner()).is_none() {
            return Err(SurfaceError::NoStyle);
        }
        Ok(())
    }

    // Inspection helpers for tests and diagnostics.

    pub fn style_name(&self) -> Option<String> {
        self.style.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlay_position(&self, id: OverlayId) -> Option<GeoPoint> {
        self.overlays.get(&id.0).map(|o| o.position)
    }

    pub fn overlay_glyph(&self, id: OverlayId) -> Option<String> {
        self.overlays.get(&id.0).map(|o| o.descriptor.glyph.clone())
    }

    pub fn popup_visible(&self, id: PopupId) -> Option<bool> {
        self.popups.get(&id.0).map(|p| p.visible)
    }

    pub fn popup_text(&self, id: PopupId) -> Option<String> {
        self.popups.get(&id.0).map(|p| p.text.clone())
    }

    pub fn visible_popup_count(&self) -> usize {
        self.popups.iter().filter(|p| p.visible).count()
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.layers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|l| l.id.clone())
            .collect()
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Make the next `apply_style` fail, for exercising load-error paths.
    pub fn reject_next_style(&self) {
        self.reject_next_style.store(true, Ordering::Relaxed);
    }

    /// Make the next `create_overlay` fail.
    pub fn reject_next_overlay(&self) {
        self.reject_next_overlay.store(true, Ordering::Relaxed);
    }
}

impl OverlaySurface for HeadlessSurface {
    fn apply_style(&self, style: &StyleDocument) -> Result<(), SurfaceError> {
        if self.reject_next_style.swap(false, Ordering::Relaxed) {
            return Err(SurfaceError::StyleRejected(style.name.clone()));
        }
        // A style swap wipes everything built on top of the old style.
        self.overlays.clear();
        self.popups.clear();
        self.sources.clear();
        self.layers.lock().unwrap_or_else(|e| e.into_inner()).clear();
        *self.style.lock().unwrap_or_else(|e| e.into_inner()) = Some(style.name.clone());
        Ok(())
    }

    fn add_vector_source(&self, source: &VectorSource) -> Result<(), SurfaceError> {
        self.require_style()?;
        self.sources.insert(source.id.clone(), source.clone());
        Ok(())
    }

    fn add_line_layer(&self, layer: &LineLayer) -> Result<(), SurfaceError> {
        self.require_style()?;
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::StyleRejected(layer.source.clone()));
        }
        self.layers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(layer.clone());
        Ok(())
    }

    fn create_overlay(
        &self,
        at: GeoPoint,
        descriptor: &OverlayDescriptor,
    ) -> Result<OverlayId, SurfaceError> {
        self.require_style()?;
        if self.reject_next_overlay.swap(false, Ordering::Relaxed) {
            return Err(SurfaceError::StyleRejected(descriptor.label.clone()));
        }
        let id = self.alloc_id();
        self.overlays.insert(
            id,
            OverlayState {
                position: at,
                descriptor: descriptor.clone(),
            },
        );
        Ok(OverlayId(id))
    }

    fn move_overlay(&self, id: OverlayId, to: GeoPoint) -> Result<(), SurfaceError> {
        let mut overlay = self
            .overlays
            .get_mut(&id.0)
            .ok_or(SurfaceError::UnknownOverlay(id.0))?;
        overlay.position = to;
        Ok(())
    }

    fn destroy_overlay(&self, id: OverlayId) {
        self.overlays.remove(&id.0);
        // Popups anchored to the overlay go with it.
        self.popups.retain(|_, p| p.overlay != id);
    }

    fn create_popup(&self, overlay: OverlayId, text: &str) -> Result<PopupId, SurfaceError> {
        if !self.overlays.contains_key(&overlay.0) {
            return Err(SurfaceError::UnknownOverlay(overlay.0));
        }
        let id = self.alloc_id();
        self.popups.insert(
            id,
            PopupState {
                overlay,
                text: text.to_string(),
                visible: false,
            },
        );
        Ok(PopupId(id))
    }

    fn set_popup_visible(&self, id: PopupId, visible: bool) -> Result<(), SurfaceError> {
        let mut popup = self
            .popups
            .get_mut(&id.0)
            .ok_or(SurfaceError::UnknownPopup(id.0))?;
        popup.visible = visible;
        Ok(())
    }

    fn destroy_popup(&self, id: PopupId) {
        self.popups.remove(&id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_style() -> StyleDocument {
        StyleDocument::new("day", "https://tiles.example/styles/bright")
    }

    #[test]
    fn overlays_require_a_style() {
        let surface = HeadlessSurface::new();
        let at = GeoPoint::new(-2.25, 51.34);
        let descriptor = OverlayDescriptor {
            glyph: "⚓".into(),
            label: "skipper".into(),
            night: false,
        };
        assert!(matches!(
            surface.create_overlay(at, &descriptor),
            Err(SurfaceError::NoStyle)
        ));

        surface.apply_style(&day_style()).unwrap();
        let id = surface.create_overlay(at, &descriptor).unwrap();
        assert_eq!(surface.overlay_position(id), Some(at));
    }

    #[test]
    fn style_swap_discards_overlays_and_layers() {
        let surface = HeadlessSurface::new();
        surface.apply_style(&day_style()).unwrap();
        let descriptor = OverlayDescriptor {
            glyph: "⚓".into(),
            label: "skipper".into(),
            night: false,
        };
        let id = surface
            .create_overlay(GeoPoint::new(-2.25, 51.34), &descriptor)
            .unwrap();
        surface.create_popup(id, "skipper").unwrap();
        let (source, layers) = crate::layers::waterway_layers("http://t/{z}/{x}/{y}");
        surface.add_vector_source(&source).unwrap();
        for layer in &layers {
            surface.add_line_layer(layer).unwrap();
        }

        surface
            .apply_style(&StyleDocument::new("night", "https://tiles.example/styles/dark"))
            .unwrap();
        assert_eq!(surface.overlay_count(), 0);
        assert_eq!(surface.visible_popup_count(), 0);
        assert!(surface.layer_ids().is_empty());
        assert!(!surface.has_source(crate::layers::WATERWAY_SOURCE_ID));
        assert_eq!(surface.style_name().as_deref(), Some("night"));
    }

    #[test]
    fn destroying_an_overlay_takes_its_popup() {
        let surface = HeadlessSurface::new();
        surface.apply_style(&day_style()).unwrap();
        let descriptor = OverlayDescriptor {
            glyph: "🛥".into(),
            label: "narrowboat".into(),
            night: false,
        };
        let overlay = surface
            .create_overlay(GeoPoint::new(-2.0, 51.0), &descriptor)
            .unwrap();
        let popup = surface.create_popup(overlay, "narrowboat").unwrap();
        surface.set_popup_visible(popup, true).unwrap();

        surface.destroy_overlay(overlay);
        assert_eq!(surface.popup_visible(popup), None);
        // Idempotent.
        surface.destroy_overlay(overlay);
    }
}
