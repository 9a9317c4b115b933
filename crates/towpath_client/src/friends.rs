//! Friend endpoints: list, search, request, respond, remove
//!
//! Consumed indirectly by the map: accepting a request is what makes a
//! friend's boat show up on the next poll.

use serde::{Deserialize, Serialize};

use crate::{ApiClient, ClientError};

/// Another user as seen through search/list, annotated with any existing
/// friendship between them and the current user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FriendProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub friendship_id: Option<i64>,
    #[serde(default)]
    pub friendship_status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Accept,
    Reject,
}

impl FriendAction {
    fn as_path_segment(self) -> &'static str {
        match self {
            FriendAction::Accept => "accept",
            FriendAction::Reject => "reject",
        }
    }
}

#[derive(Serialize)]
struct FriendRequest {
    friend_id: i64,
}

impl ApiClient {
    pub async fn friends(&self) -> Result<Vec<FriendProfile>, ClientError> {
        self.get_authed("/friends/").await
    }

    pub async fn search_users(&self, username: &str) -> Result<Vec<FriendProfile>, ClientError> {
        self.get_authed(&format!("/friends/search/{username}")).await
    }

    pub async fn send_friend_request(&self, friend_id: i64) -> Result<serde_json::Value, ClientError> {
        self.post_authed("/friends/request", &FriendRequest { friend_id })
            .await
    }

    pub async fn respond_to_request(
        &self,
        friendship_id: i64,
        action: FriendAction,
    ) -> Result<serde_json::Value, ClientError> {
        let path = format!(
            "/friends/respond/{friendship_id}/{}",
            action.as_path_segment()
        );
        self.post_authed(&path, &serde_json::json!({})).await
    }

    pub async fn remove_friend(&self, friendship_id: i64) -> Result<serde_json::Value, ClientError> {
        self.delete_authed(&format!("/friends/{friendship_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_payload_tolerates_missing_friendship() {
        let payload = r#"[
            {"id": 4, "username": "mallard", "avatar": "🦆",
             "friendship_id": 12, "friendship_status": "accepted"},
            {"id": 5, "username": "heron"}
        ]"#;
        let profiles: Vec<FriendProfile> = serde_json::from_str(payload).unwrap();
        assert_eq!(profiles[0].friendship_status.as_deref(), Some("accepted"));
        assert_eq!(profiles[1].friendship_id, None);
    }

    #[test]
    fn respond_actions_map_to_route_segments() {
        assert_eq!(FriendAction::Accept.as_path_segment(), "accept");
        assert_eq!(FriendAction::Reject.as_path_segment(), "reject");
    }
}
