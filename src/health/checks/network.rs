//! Network ping check

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::health::check::{CheckResult, CheckValue, SelfCheck};
use crate::health::error::CheckError;

/// Response returned by a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Request/response surface the network check pings
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, path: &str) -> Result<TransportResponse, CheckError>;
}

/// [`Transport`] over HTTP GET
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CheckError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, CheckError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str) -> Result<TransportResponse, CheckError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(%url, status, bytes = body.len(), "Ping response");
        Ok(TransportResponse { status, body })
    }
}

/// Sends a ping and looks for a `message` field in the JSON body
///
/// Transport and decode errors are caught and described in the verdict text
/// unless `propagate_errors` is set, in which case they make the check error.
pub struct NetworkCheck<T> {
    transport: T,
    path: String,
    propagate_errors: bool,
}

impl<T: Transport> NetworkCheck<T> {
    pub fn new(transport: T, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            propagate_errors: false,
        }
    }

    pub fn propagate_errors(mut self, propagate: bool) -> Self {
        self.propagate_errors = propagate;
        self
    }

    async fn ping(&self) -> CheckResult {
        let response = self.transport.send(&self.path).await?;
        let payload: serde_json::Value = serde_json::from_str(&response.body)?;
        if payload.get("message").is_some() {
            Ok(CheckValue::ok("OK"))
        } else {
            Ok(CheckValue::failed("No message"))
        }
    }
}

impl NetworkCheck<HttpTransport> {
    pub fn from_config(config: &NetworkConfig) -> Result<Self, CheckError> {
        Ok(Self::new(HttpTransport::from_config(config)?, config.ping_path.clone())
            .propagate_errors(config.propagate_errors))
    }
}

#[async_trait]
impl<T: Transport> SelfCheck for NetworkCheck<T> {
    fn name(&self) -> &str {
        "Network"
    }

    fn description(&self) -> Option<&str> {
        Some("Pings the backend and expects a JSON body with a message")
    }

    async fn run(&self) -> CheckResult {
        match self.ping().await {
            Err(err) if !self.propagate_errors => Ok(CheckValue::failed(format!("Error: {err}"))),
            result => result,
        }
    }
}
