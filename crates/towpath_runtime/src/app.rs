//! Map screen wiring
//!
//! Everything whose lifetime matches one mounted map view: the host, the
//! marker registry, the friend poller and the selection panel. `mount`
//! builds them in dependency order, `unmount` tears them down in reverse so
//! no late callback ever touches a dead viewport.

use std::sync::Arc;

use anyhow::Result;
use towpath_client::{BoatSource, FriendBoatSource};
use towpath_core::geo::DEFAULT_ZOOM;
use towpath_core::{MapView, MarkerKey, SelectedFeature, SharedSession, Theme};
use towpath_map::host::MapHost;
use towpath_map::layers::{waterway_layers, StyleDocument};
use towpath_map::selection::{FeatureSelection, SelectionChange};
use towpath_map::surface::OverlaySurface;
use towpath_markers::poller::{FriendPoller, PollerHandle};
use towpath_markers::registry::MarkerRegistry;
use towpath_services::Settings;

pub struct App<B, S>
where
    B: FriendBoatSource + BoatSource,
    S: OverlaySurface,
{
    settings: Settings,
    host: Arc<MapHost<S>>,
    registry: Arc<MarkerRegistry<S>>,
    poller: Arc<FriendPoller<B, S>>,
    poller_handle: Option<PollerHandle>,
    selection: FeatureSelection,
    theme: Theme,
}

impl<B, S> App<B, S>
where
    B: FriendBoatSource + BoatSource,
    S: OverlaySurface,
{
    /// Bring the map up: resolve the initial center, load the style, add
    /// the waterway layers, place the own-boat marker, start polling.
    pub async fn mount(
        settings: Settings,
        session: SharedSession,
        source: Arc<B>,
        surface: Arc<S>,
        theme: Theme,
    ) -> Result<Self> {
        // The own-boat lookup finishes before the viewport exists, so the
        // first visible center is already the right one. Fetch trouble
        // degrades to the fallback center, never to an error screen.
        let own_boat = if session.is_authenticated() {
            match source.own_boat().await {
                Ok(boat) => boat,
                Err(err) => {
                    tracing::warn!(error = %err, "own boat lookup failed; using fallback center");
                    None
                }
            }
        } else {
            None
        };

        let view = own_boat
            .as_ref()
            .map(|boat| MapView::new(boat.position, DEFAULT_ZOOM))
            .unwrap_or_default();

        let (name, url) = settings.style_for(theme);
        let host = Arc::new(MapHost::initialize(
            surface,
            view,
            &StyleDocument::new(name, url),
        )?);
        let (tiles, layers) = waterway_layers(&settings.map.waterway_tiles);
        host.add_waterways(&tiles, &layers)?;

        let registry = Arc::new(MarkerRegistry::new(Arc::clone(&host), theme));
        if let Some(boat) = own_boat {
            // A marker that will not place is a map without the boat on
            // it, not a map that refuses to open.
            if let Err(err) = registry.upsert(MarkerKey::OwnBoat, boat) {
                tracing::warn!(error = %err, "could not place own boat marker");
            }
        }

        let poller = Arc::new(FriendPoller::new(
            source,
            Arc::clone(&registry),
            session,
            settings.poll_period(),
        ));
        let poller_handle = Some(poller.start());

        Ok(Self {
            settings,
            host,
            registry,
            poller,
            poller_handle,
            selection: FeatureSelection::new(),
            theme,
        })
    }

    /// Swap day/night style and rebuild everything the swap discarded.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        if theme == self.theme {
            return Ok(());
        }
        let (name, url) = self.settings.style_for(theme);
        self.host.change_style(&StyleDocument::new(name, url))?;
        let (tiles, layers) = waterway_layers(&self.settings.map.waterway_tiles);
        self.host.add_waterways(&tiles, &layers)?;
        self.registry.set_theme(theme);
        self.registry.resync()?;
        self.theme = theme;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// A click on the map, with whichever selectable feature was hit.
    pub fn click(&mut self, hit: Option<SelectedFeature>) -> SelectionChange {
        self.selection.click(hit)
    }

    pub fn selection(&self) -> &FeatureSelection {
        &self.selection
    }

    pub fn host(&self) -> &Arc<MapHost<S>> {
        &self.host
    }

    pub fn registry(&self) -> &Arc<MarkerRegistry<S>> {
        &self.registry
    }

    /// Tear the screen down: poller first, then overlays, then the host.
    pub fn unmount(mut self) {
        if let Some(handle) = self.poller_handle.take() {
            self.poller.stop(handle);
        }
        self.selection.reset();
        self.registry.clear_all();
        self.host.teardown();
    }
}
