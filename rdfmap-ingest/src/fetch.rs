//! Blocking HTTP fetch for remote vocabularies.
//!
//! Remote import is a synchronous call on the request path: the only bound
//! on a hung remote is the configured timeouts and redirect cap. There is
//! no retry policy, queuing, or cancellation here.

use crate::error::ImportErrorKind;
use reqwest::blocking::Client;
use reqwest::header;
use reqwest::redirect::Policy;
use std::time::Duration;

/// HTTP client configuration for vocabulary imports.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Maximum time for the whole request, body included.
    pub request_timeout: Duration,
    /// Maximum redirects followed before the fetch fails.
    pub max_redirects: usize,
    /// User-Agent header sent to vocabulary hosts.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_redirects: 8,
            user_agent: format!("rdfmap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub(crate) fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .redirect(Policy::limited(config.max_redirects))
        .user_agent(config.user_agent.clone())
        .build()
}

/// GET `url`, negotiating an RDF serialization.
///
/// Returns the body and the response content type. `strict` pins the
/// Accept header to RDF/XML for hosts that ignore negotiation.
pub(crate) fn fetch(
    client: &Client,
    url: &str,
    strict: bool,
) -> Result<(Vec<u8>, Option<String>), ImportErrorKind> {
    let response = client
        .get(url)
        .header(header::ACCEPT, crate::format::RdfFormat::accept_header(strict))
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(ImportErrorKind::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = response.bytes()?.to_vec();
    tracing::debug!(
        url,
        bytes = body.len(),
        content_type = content_type.as_deref().unwrap_or("-"),
        "fetched vocabulary source"
    );
    Ok((body, content_type))
}
