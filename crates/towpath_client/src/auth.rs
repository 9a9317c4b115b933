//! Auth endpoints: register, login, me, update

use serde::{Deserialize, Serialize};
use towpath_core::Profile;

use crate::{ApiClient, ClientError};

/// Bearer token issued by login/register.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Identity as `/auth/me` reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<UserProfile> for Profile {
    fn from(user: UserProfile) -> Self {
        Profile {
            username: user.username,
            avatar: user.avatar.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

impl ApiClient {
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Token, ClientError> {
        self.post_json(
            "/auth/register",
            &RegisterRequest {
                username,
                email,
                password,
            },
        )
        .await
    }

    /// Login is form-encoded (OAuth2 password flow on the backend).
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ClientError> {
        self.post_form("/auth/login", &LoginForm { username, password })
            .await
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.get_authed("/auth/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        self.put_authed("/auth/update", update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_payload_decodes_with_and_without_avatar() {
        let with: UserProfile = serde_json::from_str(
            r#"{"username":"skipper","email":"s@example.com","avatar":"⚓"}"#,
        )
        .unwrap();
        assert_eq!(with.avatar.as_deref(), Some("⚓"));

        let without: UserProfile =
            serde_json::from_str(r#"{"username":"skipper","email":"s@example.com"}"#).unwrap();
        assert_eq!(without.avatar, None);
        let profile: Profile = without.into();
        assert!(profile.avatar.is_empty());
    }

    #[test]
    fn profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            avatar: Some("🛶".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"avatar":"🛶"}"#);
    }
}
