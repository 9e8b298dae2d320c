//! Shared JSON-over-HTTP plumbing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use reqwest::Url;

use crate::error::{NetError, Result};

/// Parse a service base URL, making sure relative joins append to its path.
pub(crate) fn parse_base(url: &str) -> Result<Url> {
    let normalized = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };
    Url::parse(&normalized).map_err(|e| NetError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Host and port of a service URL (port defaults per scheme).
pub fn host_and_port(url: &str) -> Result<(String, u16)> {
    let parsed = parse_base(url)?;
    let host = parsed.host_str().ok_or_else(|| NetError::InvalidUrl {
        url: url.to_string(),
        reason: "missing host".to_string(),
    })?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| NetError::InvalidUrl {
            url: url.to_string(),
            reason: "missing port".to_string(),
        })?;
    Ok((host.to_string(), port))
}

/// POST `body` as JSON to `base/path` and decode the JSON reply.
///
/// Non-2xx replies become [`NetError::Status`]; the body is not inspected.
pub(crate) async fn post_json<Req, Resp>(
    client: &reqwest::Client,
    base: &Url,
    path: &str,
    operation: &'static str,
    body: &Req,
) -> Result<Resp>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let url = base.join(path).map_err(|e| NetError::InvalidUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })?;

    debug!(operation, url = %url, "POST");

    let response = client.post(url).json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NetError::Status {
            operation,
            status: status.as_u16(),
        });
    }

    Ok(response.json::<Resp>().await?)
}
