//! Remote service gateway
//!
//! Blocking HTTP GET against the exoMAST API. Every body passes through
//! [`check_response`] before a decoder sees it.

use crate::error::{ExomastError, Result};
use exomast_common::config::ServiceSettings;
use reqwest::StatusCode;
use std::time::Duration;

const USER_AGENT: &str = concat!("exomast/", env!("CARGO_PKG_VERSION"));

/// Marker the service embeds in bodies when it fails internally
const INTERNAL_ERROR_MARKER: &str = "Internal Server Error";

/// Source of raw response bodies
///
/// Implementations classify transport-level failures; body-level checks
/// happen in [`fetch_checked`].
pub trait Gateway {
    fn get(&self, url: &str) -> Result<String>;
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

impl<G: Gateway + ?Sized> Gateway for Box<G> {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

/// reqwest-backed gateway
pub struct HttpGateway {
    http_client: reqwest::blocking::Client,
}

impl HttpGateway {
    /// Build a gateway; `None` leaves requests without a deadline
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ExomastError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }

    pub fn from_settings(settings: &ServiceSettings) -> Result<Self> {
        Self::new(settings.timeout)
    }
}

impl Gateway for HttpGateway {
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .map_err(|e| ExomastError::Network(format!("{}: {}", url, e)))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ExomastError::NotFound(url.to_string()));
        }

        let body = response
            .text()
            .map_err(|e| ExomastError::Decode(format!("{}: body is not text: {}", url, e)))?;

        if !status.is_success() {
            return Err(ExomastError::service(url, format!("HTTP {}: {}", status, body)));
        }

        Ok(body)
    }
}

/// Reject bodies carrying the server's internal-error marker
pub fn check_response(url: &str, body: &str) -> Result<()> {
    if body.contains(INTERNAL_ERROR_MARKER) {
        tracing::warn!(url = %url, "exoMAST API reported an internal server error");
        return Err(ExomastError::service(url, body.trim()));
    }
    Ok(())
}

/// GET `url` and run the body check
pub fn fetch_checked<G: Gateway + ?Sized>(gateway: &G, url: &str) -> Result<String> {
    let body = gateway.get(url)?;
    check_response(url, &body)?;
    Ok(body)
}
