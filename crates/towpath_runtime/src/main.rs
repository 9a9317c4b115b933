//! Towpath Runtime
//!
//! Binary that links the app crates and runs a headless map session:
//! restore the session, mount the map centered on the user's boat, keep
//! friend markers fresh until shutdown.

mod app;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use towpath_client::{ApiClient, ClientError};
use towpath_core::SessionStore;
use towpath_map::headless::HeadlessSurface;
use towpath_services::{LocalStore, Settings};

use crate::app::App;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("Towpath v{}", towpath_core::VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let settings = Settings::load(Path::new("towpath.json"))?;
    let store = LocalStore::open("towpath-store.json")?;

    let session = Arc::new(SessionStore::new());
    if let Some(token) = store.token() {
        session.login(token);
    }
    let client = Arc::new(ApiClient::new(&settings.api.base_url, Arc::clone(&session)));

    // Restore identity from the stored token; a 401 means it expired.
    if session.is_authenticated() {
        match client.me().await {
            Ok(profile) => session.apply_profile(profile.into()),
            Err(ClientError::Unauthorized) => {
                tracing::info!("stored token expired");
                session.logout();
                store.set_token(None)?;
            }
            Err(err) => {
                // Transient trouble: carry on logged-in, markers catch up
                // on later fetches.
                tracing::warn!(error = %err, "profile restore failed");
            }
        }
    }

    let theme = store.theme();
    let app = App::mount(
        settings,
        Arc::clone(&session),
        Arc::clone(&client),
        Arc::new(HeadlessSurface::new()),
        theme,
    )
    .await?;

    tracing::info!(
        center = ?app.host().center(),
        zoom = app.host().zoom(),
        theme = ?app.theme(),
        "map mounted; ctrl-c to exit"
    );

    tokio::signal::ctrl_c().await?;

    app.unmount();
    tracing::info!("shut down cleanly");
    Ok(())
}
