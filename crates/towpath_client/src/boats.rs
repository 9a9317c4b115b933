//! Boat endpoints: own boat CRUD and friends' boat positions

use serde::{Deserialize, Serialize};
use towpath_core::{BoatPosition, GeoPoint, MarkerKey};

use crate::{ApiClient, ClientError};

/// The user's own boat as the backend stores it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Boat {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub share_location_with_friends: bool,
}

impl Boat {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// Create/update payload for the own boat.
#[derive(Debug, Clone, Serialize)]
pub struct BoatDraft {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub share_location_with_friends: bool,
}

/// A friend's boat from `/boats/friends-boats`: boat plus owner identity.
/// Only boats whose owners enabled location sharing are returned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FriendBoat {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub user_id: i64,
    pub user_avatar: String,
    pub user_username: String,
    pub share_location_with_friends: bool,
}

impl FriendBoat {
    /// Markers are keyed by the owning friend, not the boat row.
    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey::Friend(self.user_id)
    }

    pub fn into_position(self) -> BoatPosition {
        BoatPosition {
            id: self.id,
            name: self.name,
            owner: self.user_username,
            avatar: self.user_avatar,
            position: GeoPoint::new(self.longitude, self.latitude),
        }
    }
}

impl ApiClient {
    /// At most one boat per user in current usage; the API returns a list.
    pub async fn my_boats(&self) -> Result<Vec<Boat>, ClientError> {
        self.get_authed("/boats/my-boats").await
    }

    pub async fn friends_boats(&self) -> Result<Vec<FriendBoat>, ClientError> {
        self.get_authed("/boats/friends-boats").await
    }

    pub async fn create_boat(&self, draft: &BoatDraft) -> Result<Boat, ClientError> {
        self.post_authed("/boats/", draft).await
    }

    pub async fn update_boat(&self, boat_id: i64, draft: &BoatDraft) -> Result<Boat, ClientError> {
        self.put_authed(&format!("/boats/{boat_id}"), draft).await
    }

    pub async fn delete_boat(&self, boat_id: i64) -> Result<serde_json::Value, ClientError> {
        self.delete_authed(&format!("/boats/{boat_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friends_boats_payload_decodes() {
        let payload = r#"[{
            "id": 3,
            "name": "Firefly",
            "latitude": 51.3475,
            "longitude": -2.2507,
            "user_id": 9,
            "user_avatar": "🦆",
            "user_username": "mallard",
            "share_location_with_friends": true
        }]"#;
        let boats: Vec<FriendBoat> = serde_json::from_str(payload).unwrap();
        assert_eq!(boats.len(), 1);
        assert_eq!(boats[0].marker_key(), MarkerKey::Friend(9));

        let position = boats[0].clone().into_position();
        assert_eq!(position.owner, "mallard");
        assert_eq!(position.position, GeoPoint::new(-2.2507, 51.3475));
    }
}
