//! Towpath API client
//!
//! Typed, bearer-token-authenticated wrappers over the backend's /auth,
//! /boats and /friends routes. The backend and the tile provider are
//! external collaborators; everything here treats them as black boxes.
//!
//! The [`source`] traits are the seam the marker layer consumes, so its
//! reconciliation logic never touches HTTP in tests.

pub mod auth;
pub mod boats;
pub mod error;
pub mod friends;
pub mod source;

pub use auth::{ProfileUpdate, Token, UserProfile};
pub use boats::{Boat, BoatDraft, FriendBoat};
pub use error::ClientError;
pub use friends::{FriendAction, FriendProfile};
pub use source::{BoatSource, FriendBoatSource};

use serde::de::DeserializeOwned;
use serde::Serialize;
use towpath_core::SharedSession;

/// Client for the Towpath backend API.
///
/// Holds the session store so every authenticated request picks up the
/// current token; a missing token surfaces as [`ClientError::NoSession`]
/// before any network traffic happens.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SharedSession,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SharedSession) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, ClientError> {
        self.session.token().ok_or(ClientError::NoSession)
    }

    pub(crate) async fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn post_authed<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn put_authed<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn delete_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }

    pub(crate) async fn post_form<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        form: &B,
    ) -> Result<T, ClientError> {
        let response = self.http.post(self.url(path)).form(form).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let url = response.url().clone();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        tracing::debug!(%url, "request rejected with 401");
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        let detail = match response.json::<error::ErrorBody>().await {
            Ok(body) => body.detail,
            Err(err) => {
                tracing::warn!(%url, error = %err, "error body was not the expected shape");
                status.to_string()
            }
        };
        tracing::warn!(%url, status = status.as_u16(), %detail, "request failed");
        return Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        });
    }
    tracing::debug!(%url, status = status.as_u16(), "request ok");
    Ok(response.json::<T>().await?)
}
