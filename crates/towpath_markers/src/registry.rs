//! Marker registry: one overlay per boat key
//!
//! Owns every [`MarkerEntry`] lifecycle. Entries reference surface handles
//! that die whenever the map style is replaced, so each entry records the
//! style generation it was built under; an entry from an older generation is
//! recreated rather than moved, and work prepared against a stale generation
//! is refused outright.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use towpath_core::{BoatPosition, GeoPoint, MarkerKey, Theme};
use towpath_map::host::MapHost;
use towpath_map::surface::{OverlayDescriptor, OverlayId, OverlaySurface, PopupId, SurfaceError};

/// Glyph for the user's own boat; friends render their avatar instead.
const OWN_BOAT_GLYPH: &str = "⎈";

#[derive(Debug, Error)]
pub enum MarkerError {
    /// The map host has no ready style; callers wait for the ready signal.
    #[error("map host is not ready")]
    HostNotReady,

    /// The style changed while this work was in flight; discard it.
    #[error("style generation moved on (work was for {stale}, host is at {current})")]
    StaleGeneration { stale: u64, current: u64 },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug)]
struct MarkerEntry {
    overlay: OverlayId,
    popup: PopupId,
    boat: BoatPosition,
    generation: u64,
}

pub struct MarkerRegistry<S: OverlaySurface> {
    host: Arc<MapHost<S>>,
    entries: DashMap<MarkerKey, MarkerEntry>,
    night: AtomicBool,
}

impl<S: OverlaySurface> MarkerRegistry<S> {
    pub fn new(host: Arc<MapHost<S>>, theme: Theme) -> Self {
        Self {
            host,
            entries: DashMap::new(),
            night: AtomicBool::new(theme.is_night()),
        }
    }

    pub fn host(&self) -> &Arc<MapHost<S>> {
        &self.host
    }

    /// Theme used for overlays created from now on; existing overlays pick
    /// it up on the resync that follows the style swap.
    pub fn set_theme(&self, theme: Theme) {
        self.night.store(theme.is_night(), Ordering::Relaxed);
    }

    /// Create or update the marker for `key` at the boat's position.
    ///
    /// Exactly one overlay is visible for `key` afterwards. An existing
    /// entry from the current style generation is moved in place; one from
    /// an older generation has dead handles and is recreated.
    pub fn upsert(&self, key: MarkerKey, boat: BoatPosition) -> Result<(), MarkerError> {
        self.upsert_at(self.host.generation(), key, boat)
    }

    /// Generation-checked [`upsert`](Self::upsert) for async callers: work
    /// prepared against generation N is refused once the host has moved on.
    pub fn upsert_at(
        &self,
        generation: u64,
        key: MarkerKey,
        boat: BoatPosition,
    ) -> Result<(), MarkerError> {
        if !self.host.is_ready() {
            return Err(MarkerError::HostNotReady);
        }
        let current = self.host.generation();
        if generation != current {
            return Err(MarkerError::StaleGeneration {
                stale: generation,
                current,
            });
        }

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.generation == current {
                    self.host
                        .surface()
                        .move_overlay(entry.overlay, boat.position)?;
                    entry.boat = boat;
                } else {
                    // Old handles died with their style; release defensively
                    // and build fresh ones.
                    let surface = self.host.surface();
                    surface.destroy_popup(entry.popup);
                    surface.destroy_overlay(entry.overlay);
                    let (overlay, popup) = self.create_handles(key, &boat)?;
                    *entry = MarkerEntry {
                        overlay,
                        popup,
                        boat,
                        generation: current,
                    };
                }
            }
            Entry::Vacant(vacant) => {
                let (overlay, popup) = self.create_handles(key, &boat)?;
                vacant.insert(MarkerEntry {
                    overlay,
                    popup,
                    boat,
                    generation: current,
                });
            }
        }
        tracing::debug!(?key, "marker upserted");
        Ok(())
    }

    /// Overlay plus its (hidden) popup, atomically: if the popup cannot be
    /// created the overlay is released too, never left dangling.
    fn create_handles(
        &self,
        key: MarkerKey,
        boat: &BoatPosition,
    ) -> Result<(OverlayId, PopupId), MarkerError> {
        let surface = self.host.surface();
        let descriptor = self.descriptor(key, boat);
        let overlay = surface.create_overlay(boat.position, &descriptor)?;
        let popup = match surface.create_popup(overlay, &boat.owner) {
            Ok(popup) => popup,
            Err(err) => {
                surface.destroy_overlay(overlay);
                return Err(err.into());
            }
        };
        Ok((overlay, popup))
    }

    fn descriptor(&self, key: MarkerKey, boat: &BoatPosition) -> OverlayDescriptor {
        let glyph = match key {
            MarkerKey::OwnBoat => OWN_BOAT_GLYPH.to_string(),
            MarkerKey::Friend(_) => boat.avatar.clone(),
        };
        OverlayDescriptor {
            glyph,
            label: boat.owner.clone(),
            night: self.night.load(Ordering::Relaxed),
        }
    }

    /// Release the marker for `key`. Idempotent; unknown keys are a no-op.
    pub fn remove(&self, key: MarkerKey) {
        if let Some((_, entry)) = self.entries.remove(&key) {
            let surface = self.host.surface();
            surface.destroy_popup(entry.popup);
            surface.destroy_overlay(entry.overlay);
            tracing::debug!(?key, "marker removed");
        }
    }

    /// Release every marker. Used on logout and map teardown.
    pub fn clear_all(&self) {
        let keys: Vec<MarkerKey> = self.entries.iter().map(|e| *e.key()).collect();
        for key in keys {
            self.remove(key);
        }
    }

    /// Release friend markers only; the own-boat marker stays.
    pub fn clear_friends(&self) {
        for key in self.friend_keys() {
            self.remove(key);
        }
    }

    /// Rebuild every live entry's handles on the current style generation,
    /// at unchanged coordinates. Call after the ready signal that follows a
    /// style swap.
    pub fn resync(&self) -> Result<(), MarkerError> {
        if !self.host.is_ready() {
            return Err(MarkerError::HostNotReady);
        }
        let current = self.host.generation();
        let surface = self.host.surface();
        let keys: Vec<MarkerKey> = self.entries.iter().map(|e| *e.key()).collect();
        for key in keys {
            let Some(mut entry) = self.entries.get_mut(&key) else {
                continue;
            };
            if entry.generation == current {
                continue;
            }
            surface.destroy_popup(entry.popup);
            surface.destroy_overlay(entry.overlay);
            match self.create_handles(key, &entry.boat) {
                Ok((overlay, popup)) => {
                    entry.overlay = overlay;
                    entry.popup = popup;
                    entry.generation = current;
                }
                Err(err) => {
                    // Don't keep an entry with no visible overlay behind it.
                    tracing::warn!(?key, error = %err, "marker lost during style resync");
                    drop(entry);
                    self.entries.remove(&key);
                }
            }
        }
        tracing::debug!(generation = current, count = self.entries.len(), "markers resynced");
        Ok(())
    }

    /// Pointer entered the overlay: show its popup. Racing a removal is
    /// fine; a vanished key is ignored.
    pub fn pointer_enter(&self, key: MarkerKey) {
        if let Some(entry) = self.entries.get(&key) {
            if let Err(err) = self.host.surface().set_popup_visible(entry.popup, true) {
                tracing::debug!(?key, error = %err, "hover popup unavailable");
            }
        }
    }

    /// Pointer left the overlay: hide its popup.
    pub fn pointer_leave(&self, key: MarkerKey) {
        if let Some(entry) = self.entries.get(&key) {
            if let Err(err) = self.host.surface().set_popup_visible(entry.popup, false) {
                tracing::debug!(?key, error = %err, "hover popup unavailable");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: MarkerKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn friend_keys(&self) -> Vec<MarkerKey> {
        self.entries
            .iter()
            .map(|e| *e.key())
            .filter(MarkerKey::is_friend)
            .collect()
    }

    /// Current coordinate of a marker, if registered.
    pub fn position_of(&self, key: MarkerKey) -> Option<GeoPoint> {
        self.entries.get(&key).map(|e| e.boat.position)
    }
}
