//! Friend-location poller
//!
//! Periodically fetches friends' boat positions and reconciles the registry
//! against them: upsert what the server reports, remove what it no longer
//! does. A failed fetch changes nothing and waits for the next tick; there
//! is no retry or backoff, positions move slowly and the next tick is at
//! most one period away.
//!
//! Refreshes never overlap: one task runs them sequentially and missed
//! ticks are skipped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use towpath_client::{ClientError, FriendBoatSource};
use towpath_core::{MarkerKey, SharedSession};
use towpath_map::surface::OverlaySurface;

use crate::registry::{MarkerError, MarkerRegistry};

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(30);

/// Floor for configured periods; `tokio::time::interval` panics on zero.
const MIN_POLL_PERIOD: Duration = Duration::from_secs(1);

/// What a single refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Reconciliation applied.
    Applied {
        added: usize,
        updated: usize,
        removed: usize,
    },
    /// No session; nothing fetched, nothing touched.
    SkippedNoSession,
    /// The style generation changed mid-fetch; results discarded.
    SkippedStale,
    /// Fetch failed; registry left as it was.
    Failed,
    /// Token rejected: session and markers cleared, the loop should stop.
    SessionLost,
}

/// Handle to a running poll loop. Dropping it does not stop the loop; pass
/// it back to [`FriendPoller::stop`].
#[derive(Debug)]
pub struct PollerHandle {
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    fn idle() -> Self {
        Self { task: None }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

pub struct FriendPoller<B, S>
where
    B: FriendBoatSource,
    S: OverlaySurface,
{
    source: Arc<B>,
    registry: Arc<MarkerRegistry<S>>,
    session: SharedSession,
    period: Duration,
}

impl<B, S> FriendPoller<B, S>
where
    B: FriendBoatSource,
    S: OverlaySurface,
{
    pub fn new(
        source: Arc<B>,
        registry: Arc<MarkerRegistry<S>>,
        session: SharedSession,
        period: Duration,
    ) -> Self {
        Self {
            source,
            registry,
            session,
            period: period.max(MIN_POLL_PERIOD),
        }
    }

    /// One reconciliation cycle. Never issues a fetch without a session.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.session.is_authenticated() {
            return RefreshOutcome::SkippedNoSession;
        }

        // Anything fetched now belongs to this style generation; if the
        // style swaps while the request is in flight the results are stale.
        let generation = self.registry.host().generation();

        match self.source.friends_boats().await {
            Ok(boats) => self.reconcile(generation, boats),
            Err(ClientError::Unauthorized) => {
                // Expired token: behave as logged out.
                tracing::info!("friend poll rejected; clearing session and markers");
                self.session.logout();
                self.registry.clear_all();
                RefreshOutcome::SessionLost
            }
            Err(err) => {
                tracing::warn!(error = %err, "friend poll failed; keeping markers as they are");
                RefreshOutcome::Failed
            }
        }
    }

    fn reconcile(
        &self,
        generation: u64,
        boats: Vec<towpath_client::FriendBoat>,
    ) -> RefreshOutcome {
        let mut seen: HashSet<MarkerKey> = HashSet::with_capacity(boats.len());
        let mut added = 0;
        let mut updated = 0;

        for boat in boats {
            let key = boat.marker_key();
            seen.insert(key);
            let existed = self.registry.contains(key);
            match self
                .registry
                .upsert_at(generation, key, boat.into_position())
            {
                Ok(()) => {
                    if existed {
                        updated += 1;
                    } else {
                        added += 1;
                    }
                }
                Err(MarkerError::StaleGeneration { .. }) | Err(MarkerError::HostNotReady) => {
                    tracing::debug!("discarding friend positions from a stale style generation");
                    return RefreshOutcome::SkippedStale;
                }
                Err(err) => {
                    tracing::warn!(?key, error = %err, "could not place friend marker");
                }
            }
        }

        let mut removed = 0;
        for key in self.registry.friend_keys() {
            if !seen.contains(&key) {
                self.registry.remove(key);
                removed += 1;
            }
        }

        tracing::debug!(added, updated, removed, "friend markers reconciled");
        RefreshOutcome::Applied {
            added,
            updated,
            removed,
        }
    }

    /// Refresh immediately, then on every period tick. Without a session
    /// this starts nothing, same as [`stop`](Self::stop) having run.
    pub fn start(self: &Arc<Self>) -> PollerHandle {
        if !self.session.is_authenticated() {
            // Behaves as a stop: nothing scheduled, friend markers gone.
            tracing::info!("friend poller not started: no session");
            self.registry.clear_friends();
            return PollerHandle::idle();
        }
        let poller = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(poller.period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // First tick completes immediately.
                ticks.tick().await;
                if poller.refresh().await == RefreshOutcome::SessionLost {
                    tracing::info!("friend poller stopping: session lost");
                    break;
                }
            }
        });
        tracing::info!(period_secs = self.period.as_secs(), "friend poller started");
        PollerHandle { task: Some(task) }
    }

    /// Cancel the poll loop and release friend markers. The own-boat
    /// marker is untouched. Safe to call with an idle handle.
    pub fn stop(&self, mut handle: PollerHandle) {
        if let Some(task) = handle.task.take() {
            task.abort();
            tracing::info!("friend poller stopped");
        }
        self.registry.clear_friends();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use towpath_client::FriendBoat;
    use towpath_core::{BoatPosition, GeoPoint, MapView, SessionStore, Theme};
    use towpath_map::headless::HeadlessSurface;
    use towpath_map::host::MapHost;
    use towpath_map::layers::StyleDocument;

    fn style(name: &str) -> StyleDocument {
        StyleDocument::new(name, format!("https://tiles.example/styles/{name}"))
    }

    fn friend_boat(user_id: i64, username: &str, lon: f64, lat: f64) -> FriendBoat {
        FriendBoat {
            id: user_id * 100,
            name: format!("{username}'s boat"),
            latitude: lat,
            longitude: lon,
            user_id,
            user_avatar: "🦆".to_string(),
            user_username: username.to_string(),
            share_location_with_friends: true,
        }
    }

    /// Scriptable in-memory friend-boat source.
    struct FakeSource {
        boats: Mutex<Vec<FriendBoat>>,
        calls: AtomicUsize,
        fail_next: AtomicBool,
        unauthorized: AtomicBool,
    }

    impl FakeSource {
        fn with(boats: Vec<FriendBoat>) -> Self {
            Self {
                boats: Mutex::new(boats),
                calls: AtomicUsize::new(0),
                fail_next: AtomicBool::new(false),
                unauthorized: AtomicBool::new(false),
            }
        }

        fn set_boats(&self, boats: Vec<FriendBoat>) {
            *self.boats.lock().unwrap() = boats;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FriendBoatSource for FakeSource {
        async fn friends_boats(&self) -> Result<Vec<FriendBoat>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unauthorized.load(Ordering::SeqCst) {
                return Err(ClientError::Unauthorized);
            }
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 503,
                    detail: "unavailable".to_string(),
                });
            }
            Ok(self.boats.lock().unwrap().clone())
        }
    }

    /// Source that never resolves, for in-flight cancellation tests.
    struct StallSource {
        calls: AtomicUsize,
    }

    impl FriendBoatSource for StallSource {
        async fn friends_boats(&self) -> Result<Vec<FriendBoat>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    fn fixture(
        boats: Vec<FriendBoat>,
    ) -> (
        Arc<FriendPoller<FakeSource, HeadlessSurface>>,
        Arc<FakeSource>,
        Arc<MarkerRegistry<HeadlessSurface>>,
        SharedSession,
    ) {
        fixture_with_period(boats, DEFAULT_POLL_PERIOD)
    }

    fn fixture_with_period(
        boats: Vec<FriendBoat>,
        period: Duration,
    ) -> (
        Arc<FriendPoller<FakeSource, HeadlessSurface>>,
        Arc<FakeSource>,
        Arc<MarkerRegistry<HeadlessSurface>>,
        SharedSession,
    ) {
        let host = Arc::new(
            MapHost::initialize(
                Arc::new(HeadlessSurface::new()),
                MapView::default(),
                &style("day"),
            )
            .unwrap(),
        );
        let registry = Arc::new(MarkerRegistry::new(host, Theme::Day));
        let session: SharedSession = Arc::new(SessionStore::new());
        session.login("tok");
        let source = Arc::new(FakeSource::with(boats));
        let poller = Arc::new(FriendPoller::new(
            Arc::clone(&source),
            Arc::clone(&registry),
            Arc::clone(&session),
            period,
        ));
        (poller, source, registry, session)
    }

    #[tokio::test]
    async fn refresh_reconciles_added_moved_and_removed_friends() {
        let (poller, source, registry, _session) = fixture(vec![
            friend_boat(1, "mallard", -2.25, 51.34),
            friend_boat(2, "heron", -2.26, 51.35),
        ]);

        let outcome = poller.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                added: 2,
                updated: 0,
                removed: 0
            }
        );
        assert!(registry.contains(MarkerKey::Friend(1)));
        assert!(registry.contains(MarkerKey::Friend(2)));

        // Friend 1 unfriended, friend 2 unchanged, friend 3 appears.
        source.set_boats(vec![
            friend_boat(2, "heron", -2.26, 51.35),
            friend_boat(3, "coot", -2.27, 51.36),
        ]);
        let outcome = poller.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                added: 1,
                updated: 1,
                removed: 1
            }
        );
        assert!(!registry.contains(MarkerKey::Friend(1)));
        assert!(registry.contains(MarkerKey::Friend(2)));
        assert!(registry.contains(MarkerKey::Friend(3)));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn refresh_without_session_never_fetches() {
        let (poller, source, registry, session) = fixture(vec![friend_boat(1, "mallard", -2.25, 51.34)]);
        session.logout();

        let outcome = poller.refresh().await;
        assert_eq!(outcome, RefreshOutcome::SkippedNoSession);
        assert_eq!(source.calls(), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_registry_unchanged() {
        let (poller, source, registry, _session) = fixture(vec![friend_boat(1, "mallard", -2.25, 51.34)]);
        poller.refresh().await;
        assert_eq!(registry.len(), 1);
        let before = registry.position_of(MarkerKey::Friend(1));

        source.fail_next.store(true, Ordering::SeqCst);
        source.set_boats(vec![]);
        let outcome = poller.refresh().await;
        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.position_of(MarkerKey::Friend(1)), before);
    }

    #[tokio::test]
    async fn unauthorized_fetch_clears_session_and_markers() {
        let (poller, source, registry, session) = fixture(vec![friend_boat(1, "mallard", -2.25, 51.34)]);
        registry
            .upsert(
                MarkerKey::OwnBoat,
                BoatPosition {
                    id: 7,
                    name: "Firefly".into(),
                    owner: "skipper".into(),
                    avatar: "⚓".into(),
                    position: GeoPoint::new(-2.25, 51.34),
                },
            )
            .unwrap();
        poller.refresh().await;

        source.unauthorized.store(true, Ordering::SeqCst);
        let outcome = poller.refresh().await;
        assert_eq!(outcome, RefreshOutcome::SessionLost);
        assert!(!session.is_authenticated());
        assert!(registry.is_empty());

        // Next cycle is a plain no-session skip, no network call.
        let calls = source.calls();
        assert_eq!(poller.refresh().await, RefreshOutcome::SkippedNoSession);
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn style_swap_mid_fetch_discards_results() {
        let (poller, _source, registry, _session) = fixture(vec![friend_boat(1, "mallard", -2.25, 51.34)]);

        // Capture a generation, swap the style, then apply as the poller
        // would with results fetched against the old generation.
        let stale = registry.host().generation();
        registry.host().change_style(&style("night")).unwrap();
        let outcome = poller.reconcile(stale, vec![friend_boat(1, "mallard", -2.25, 51.34)]);
        assert_eq!(outcome, RefreshOutcome::SkippedStale);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_stops_the_poll_loop() {
        let (poller, source, registry, session) = fixture(vec![friend_boat(1, "mallard", -2.25, 51.34)]);
        source.unauthorized.store(true, Ordering::SeqCst);

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!session.is_authenticated());
        assert!(registry.is_empty());

        // The task exits rather than ticking through no-op cycles.
        let calls = source.calls();
        tokio::time::sleep(DEFAULT_POLL_PERIOD * 3).await;
        assert_eq!(source.calls(), calls);
        assert!(!handle.is_active());
        poller.stop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped_to_the_floor() {
        let (poller, source, _registry, _session) =
            fixture_with_period(vec![friend_boat(1, "mallard", -2.25, 51.34)], Duration::ZERO);

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(MIN_POLL_PERIOD + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), 2);
        poller.stop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn start_polls_immediately_and_then_on_period() {
        let (poller, source, registry, _session) = fixture(vec![friend_boat(1, "mallard", -2.25, 51.34)]);

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(registry.len(), 1);

        tokio::time::sleep(DEFAULT_POLL_PERIOD + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), 2);

        poller.stop(handle);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn start_without_session_is_a_no_op() {
        let (poller, source, _registry, session) = fixture(vec![]);
        session.logout();
        let handle = poller.start();
        assert!(!handle.is_active());
        poller.stop(handle);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_mid_fetch_cancels_the_loop() {
        let host = Arc::new(
            MapHost::initialize(
                Arc::new(HeadlessSurface::new()),
                MapView::default(),
                &style("day"),
            )
            .unwrap(),
        );
        let registry = Arc::new(MarkerRegistry::new(host, Theme::Day));
        let session: SharedSession = Arc::new(SessionStore::new());
        session.login("tok");
        let source = Arc::new(StallSource {
            calls: AtomicUsize::new(0),
        });
        let poller = Arc::new(FriendPoller::new(
            Arc::clone(&source),
            Arc::clone(&registry),
            session,
            DEFAULT_POLL_PERIOD,
        ));

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // Unmount while the fetch hangs: no panic, no dangling timer.
        poller.stop(handle);
        tokio::time::sleep(DEFAULT_POLL_PERIOD * 4).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
