//! Boat positions and the keys markers are registered under

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// A boat as the marker layer sees it: who owns it and where it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatPosition {
    pub id: i64,
    pub name: String,
    /// Display name of the owner (own username or friend username).
    pub owner: String,
    /// Emoji glyph shown inside the marker.
    pub avatar: String,
    pub position: GeoPoint,
}

/// Registry key for a rendered boat marker.
///
/// The user's own boat gets a dedicated key; friends are keyed by their
/// user id so reconciliation can diff against the friends-boats payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKey {
    OwnBoat,
    Friend(i64),
}

impl MarkerKey {
    pub fn is_friend(&self) -> bool {
        matches!(self, MarkerKey::Friend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friend_keys_are_distinguished_from_own_boat() {
        assert!(MarkerKey::Friend(7).is_friend());
        assert!(!MarkerKey::OwnBoat.is_friend());
        assert_ne!(MarkerKey::Friend(1), MarkerKey::Friend(2));
    }
}
