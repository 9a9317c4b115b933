//! Towpath Markers
//!
//! Keeps rendered boat overlays in sync with three moving targets: the
//! session (login/logout), the map style (every swap kills all overlay
//! handles), and the backend's idea of where friends' boats are (polled).
//!
//! - [`registry`]: one overlay + hover popup per boat key, generation-aware
//! - [`poller`]: periodic full reconciliation of friend markers

pub mod poller;
pub mod registry;

pub use poller::{FriendPoller, PollerHandle, RefreshOutcome, DEFAULT_POLL_PERIOD};
pub use registry::{MarkerError, MarkerRegistry};
