//! HTTP transport to the TV's embedded control server.
//!
//! The TV speaks plain HTTP on port 8080: no TLS, no redirects, no session
//! cookies.  Each request is self-contained (method, URL, headers, body), so
//! one [`HttpTransport`] may be shared freely between the connect loop and
//! concurrent key dispatches without locking.
//!
//! Only the HTTP status code of a response is meaningful to the protocol;
//! bodies are dropped unread.

pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use netcast_core::protocol;
use tracing::trace;

use crate::application::connection::{TransportError, TvTransport};

/// Builds the control URL for `ip` and an endpoint path.
fn control_url(ip: &str, path: &str) -> String {
    format!("http://{ip}:{}{path}", protocol::CONTROL_PORT)
}

/// Production transport backed by a shared [`reqwest::Client`].
///
/// Timeouts are applied per request rather than on the client, because the
/// liveness probe (~1.5 s) and command posts (~2.0 s) use different budgets.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a fresh connection pool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TvTransport for HttpTransport {
    async fn post(
        &self,
        ip: &str,
        path: &str,
        token: Option<&str>,
        body: String,
        timeout: Duration,
    ) -> Result<u16, TransportError> {
        let url = control_url(ip, path);
        trace!(%url, "POST");

        let mut request = self
            .client
            .post(&url)
            .timeout(timeout)
            .header(reqwest::header::CONTENT_TYPE, protocol::CONTENT_TYPE)
            .body(body);
        if let Some(token) = token {
            request = request.header(protocol::AUTH_HEADER, token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        Ok(response.status().as_u16())
    }

    async fn get(
        &self,
        ip: &str,
        path: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<u16, TransportError> {
        let url = control_url(ip, path);
        trace!(%url, "GET");

        let mut request = self.client.get(&url).timeout(timeout);
        if let Some(token) = token {
            request = request.header(protocol::AUTH_HEADER, token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        Ok(response.status().as_u16())
    }
}

/// Collapses reqwest's error surface into the protocol-level taxonomy.
///
/// Everything here is recoverable from the loop's point of view; the split
/// exists so logs distinguish "TV off / wrong network" from programmer error.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() {
        TransportError::InvalidAddress(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_url_embeds_ip_port_and_path() {
        assert_eq!(
            control_url("192.168.1.50", protocol::PAIRING_PATH),
            "http://192.168.1.50:8080/udap/api/pairing"
        );
    }

    #[test]
    fn test_control_url_keeps_query_string_paths() {
        assert_eq!(
            control_url("10.0.0.7", protocol::LIVENESS_PATH),
            "http://10.0.0.7:8080/udap/api/data?target=volume_info"
        );
    }

    #[tokio::test]
    async fn test_get_with_unparseable_address_maps_to_transport_error() {
        // A hostname with spaces can never form a valid URL, so this fails
        // deterministically without touching the network.
        let transport = HttpTransport::new();
        let result = transport
            .get("not an ip", "/udap/api/pairing", None, Duration::from_millis(500))
            .await;
        assert!(result.is_err(), "expected a transport error, got {result:?}");
    }
}
