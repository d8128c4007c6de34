//! # Hospadm Gateways
//!
//! `reqwest` implementations of the core's boundary ports: catalogs, FUA
//! authorizations, diagnosis-coding verification, the order-record backend
//! and the admission document pack.
//!
//! All gateways share one [`reqwest::Client`] (connection pooling, request
//! timeout) plus a [`GatewayConfig`] carrying the backend base URL and the
//! session's bearer token.

pub mod catalog;
pub mod diagnosis;
pub mod documents;
pub mod fua;
pub mod orders;

pub use catalog::HttpCatalog;
pub use diagnosis::HttpDiagnosisVerification;
pub use documents::HttpAdmissionDocuments;
pub use fua::HttpFuaAuthorizations;
pub use orders::HttpOrderRecords;

use hospadm_core::GatewayError;
use std::time::Duration;

/// Connection settings shared by every gateway.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    base_url: String,
    auth_token: Option<String>,
}

impl GatewayConfig {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Build the shared HTTP client. The timeout applies per request; the
/// workflow treats an expired call like any other transport failure.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Transport(e.to_string()))
}

pub(crate) fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

pub(crate) fn payload(e: impl std::fmt::Display) -> GatewayError {
    GatewayError::Payload(e.to_string())
}

pub(crate) fn authorize(
    req: reqwest::RequestBuilder,
    cfg: &GatewayConfig,
) -> reqwest::RequestBuilder {
    match &cfg.auth_token {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

/// Convert a non-success response into [`GatewayError::Rejected`], surfacing
/// the backend's own message where one is available.
pub(crate) async fn into_rejected(resp: reqwest::Response) -> GatewayError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    GatewayError::Rejected {
        status,
        message: extract_message(&body),
    }
}

/// Backends answer errors either as `{"message": "..."}` or as plain text.
pub(crate) fn extract_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrBody {
        message: String,
    }
    match serde_json::from_str::<ErrBody>(body) {
        Ok(parsed) if !parsed.message.trim().is_empty() => parsed.message,
        _ => body.trim().to_owned(),
    }
}
