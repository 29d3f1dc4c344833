//! HTTP gateway for the `/api/v1/user/dashboard/layout` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use fibervision_core::types::Timestamp;
use fibervision_core::widgets::WidgetConfig;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::gateway::{LayoutGateway, LayoutSnapshot};

const LAYOUT_PATH: &str = "/api/v1/user/dashboard/layout";

/// HTTP request timeout for a single call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the API lives and who is calling it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, e.g. `http://localhost:3000`. A trailing slash is ignored.
    pub base_url: String,
    /// Access token sent as `Authorization: Bearer ...`.
    pub access_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutBody {
    layout: Vec<WidgetConfig>,
    version: i32,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

#[derive(Serialize)]
struct SaveBody<'a> {
    layout: &'a [WidgetConfig],
}

#[derive(Deserialize)]
struct SaveReply {
    version: i32,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the API server with [`reqwest`].
pub struct RemoteGateway {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RemoteGateway {
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Swap the access token after a refresh.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.config.access_token = token;
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let url = format!("{}{LAYOUT_PATH}", self.config.base_url);
        let builder = self.client.request(method, url);
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a non-success response to an error. Successful responses pass
    /// through unchanged.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthenticated);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        Err(GatewayError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl LayoutGateway for RemoteGateway {
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError> {
        let response = self.request(reqwest::Method::GET).send().await?;
        let body: LayoutBody = Self::ensure_success(response).await?.json().await?;
        Ok(LayoutSnapshot {
            widgets: body.layout,
            version: body.version,
            updated_at: body.updated_at,
        })
    }

    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError> {
        let response = self
            .request(reqwest::Method::PUT)
            .json(&SaveBody { layout: widgets })
            .send()
            .await?;
        let reply: SaveReply = Self::ensure_success(response).await?.json().await?;
        tracing::debug!(version = reply.version, widgets = widgets.len(), "Layout saved remotely");
        Ok(reply.version)
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        let response = self.request(reqwest::Method::DELETE).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
