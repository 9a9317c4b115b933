//! Data-source seams consumed by the marker layer
//!
//! The registry and poller only need "where are the boats"; these traits
//! carry exactly that, so tests swap the HTTP client for an in-memory fake.

use std::future::Future;

use towpath_core::BoatPosition;

use crate::boats::FriendBoat;
use crate::{ApiClient, ClientError};

/// Source of the current user's friends' boat positions.
pub trait FriendBoatSource: Send + Sync + 'static {
    fn friends_boats(&self)
        -> impl Future<Output = Result<Vec<FriendBoat>, ClientError>> + Send;
}

/// Source of the current user's own boat position, if they have one.
pub trait BoatSource: Send + Sync + 'static {
    fn own_boat(&self) -> impl Future<Output = Result<Option<BoatPosition>, ClientError>> + Send;
}

impl FriendBoatSource for ApiClient {
    async fn friends_boats(&self) -> Result<Vec<FriendBoat>, ClientError> {
        ApiClient::friends_boats(self).await
    }
}

impl BoatSource for ApiClient {
    async fn own_boat(&self) -> Result<Option<BoatPosition>, ClientError> {
        let mut boats = self.my_boats().await?;
        if boats.is_empty() {
            return Ok(None);
        }
        let boat = boats.remove(0);
        let session = self.session();
        Ok(Some(BoatPosition {
            id: boat.id,
            name: boat.name.clone(),
            owner: session.username(),
            avatar: session.avatar(),
            position: boat.position(),
        }))
    }
}
