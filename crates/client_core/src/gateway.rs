use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use shared::{
    domain::{PhotoSelection, PlaceId, UserProfile},
    protocol::{DailyMenuPayload, Envelope},
};
use tracing::debug;

use crate::{
    error::{GatewayError, GatewayResult},
    session::SessionContext,
};

/// REST calls the screens depend on. Every response body is an envelope;
/// implementations must branch on `ro` before trusting `data`, surfacing
/// business rejections and session expiry as typed errors.
#[async_trait]
pub trait RequestGateway: Send + Sync {
    async fn fetch_menu(
        &self,
        place_id: PlaceId,
        session_id: Option<&str>,
    ) -> GatewayResult<DailyMenuPayload>;
    async fn fetch_profile(&self) -> GatewayResult<UserProfile>;
    async fn update_profile(&self, profile: &UserProfile) -> GatewayResult<()>;
    /// Returns the URI of the stored avatar.
    async fn upload_avatar(&self, photo: &PhotoSelection) -> GatewayResult<String>;
}

/// reqwest-backed gateway. Transport status is checked first
/// (`error_for_status`), then the body envelope; the session id of the
/// ambient session context is attached to authenticated calls.
pub struct HttpRequestGateway {
    http: Client,
    base_url: String,
    session: SessionContext,
}

impl HttpRequestGateway {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.session_id() {
            Some(sid) => request.query(&[("sid", sid)]),
            None => request,
        }
    }

    fn unwrap_data<T>(envelope: Envelope<T>, call: &str) -> GatewayResult<T> {
        envelope.ro.to_result()?;
        envelope
            .data
            .ok_or_else(|| GatewayError::Malformed(format!("{call} envelope has no data")))
    }
}

#[async_trait]
impl RequestGateway for HttpRequestGateway {
    async fn fetch_menu(
        &self,
        place_id: PlaceId,
        session_id: Option<&str>,
    ) -> GatewayResult<DailyMenuPayload> {
        let mut request = self
            .http
            .get(format!("{}/food/daily", self.base_url))
            .query(&[("placeId", place_id.0.to_string())]);
        if let Some(sid) = session_id {
            request = request.query(&[("sid", sid)]);
        }

        let envelope: Envelope<DailyMenuPayload> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(place_id = place_id.0, "gateway: daily menu response received");
        Self::unwrap_data(envelope, "daily menu")
    }

    async fn fetch_profile(&self) -> GatewayResult<UserProfile> {
        let request = self.with_session(self.http.get(format!("{}/user/profile", self.base_url)));
        let envelope: Envelope<UserProfile> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::unwrap_data(envelope, "profile")
    }

    async fn update_profile(&self, profile: &UserProfile) -> GatewayResult<()> {
        let request = self
            .with_session(self.http.post(format!("{}/user/profile", self.base_url)))
            .json(profile);
        let envelope: Envelope<serde_json::Value> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope.ro.to_result()?;
        Ok(())
    }

    async fn upload_avatar(&self, photo: &PhotoSelection) -> GatewayResult<String> {
        let mut request = self
            .with_session(self.http.post(format!("{}/user/avatar", self.base_url)))
            .body(photo.bytes.clone());
        if let Some(file_name) = &photo.file_name {
            request = request.query(&[("fileName", file_name)]);
        }
        if let Some(mime_type) = &photo.mime_type {
            request = request.header(CONTENT_TYPE, mime_type);
        }

        let envelope: Envelope<String> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::unwrap_data(envelope, "avatar upload")
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
