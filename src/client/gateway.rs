//! Gateway module
//!
//! Provides `Gateway` for making requests to the extraction service.
//! Every request is resolved beneath the single configured origin.

use super::GatewayError;
use crate::config::BackendConfig;
use eyre::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, header::CONTENT_TYPE, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

/// Thin transport wrapper around a `reqwest::Client` bound to one origin.
///
/// Paths are given as segment lists so identifiers containing reserved
/// characters are percent-encoded rather than spliced into the URL.
///
/// # Example
/// ```no_run
/// use qdi_ps_client::client::Gateway;
/// use qdi_ps_client::config::BackendConfig;
///
/// # async fn example() -> eyre::Result<()> {
/// let config = BackendConfig::parse("http://localhost:8000")?;
/// let gateway = Gateway::try_new(&config)?;
///
/// let body: serde_json::Value = gateway.get_json(&["info", "supported"]).await?;
/// let url = gateway.download_url("task_settings.csv")?;
/// assert_eq!(url.as_str(), "http://localhost:8000/download/task_settings.csv");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Gateway {
    client: Client,
    origin: Url,
}

impl Gateway {
    /// Create a new Gateway for the configured origin.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn try_new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("qdips/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            origin: config.origin().clone(),
        })
    }

    /// Get the backend origin.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolve path segments beneath the origin.
    ///
    /// Empty, `.` and `..` segments are rejected: the URL must name exactly
    /// the path that was asked for.
    pub fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, GatewayError> {
        let segments: Vec<&str> = segments.into_iter().collect();
        if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(GatewayError::InvalidPath(segments.join("/")));
        }

        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidEndpoint(self.origin.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of the "download artifact" operation for one identifier.
    ///
    /// Identifiers may name nested paths; each `/`-separated part becomes its
    /// own encoded segment.
    pub fn download_url(&self, identifier: &str) -> Result<Url, GatewayError> {
        self.endpoint(std::iter::once("download").chain(identifier.split('/')))
    }

    /// GET a path and decode its JSON object body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(segments.iter().copied())?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let body = read_body(response, &url).await?;
        decode_object(&url, &body)
    }

    /// POST a multipart form to a path and decode its JSON object body.
    pub async fn post_multipart_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: multipart::Form,
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(segments.iter().copied())?;
        log::trace!("Sending request with form-data");
        let response = self
            .send(self.client.post(url.clone()).multipart(form), &url)
            .await?;
        let body = read_body(response, &url).await?;
        decode_object(&url, &body)
    }

    /// Fetch the raw content of an artifact.
    ///
    /// The service reports a missing artifact in-band, as a `200` JSON body
    /// `{"error": "..."}`; that is returned as [`GatewayError::Reported`].
    pub async fn download(&self, identifier: &str) -> Result<Vec<u8>, GatewayError> {
        let url = self.download_url(identifier)?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let body = read_body(response, &url).await?;
        if is_json && let Some(message) = reported_error(&body) {
            return Err(GatewayError::Reported {
                url: url.to_string(),
                message,
            });
        }
        Ok(body)
    }

    /// Send a request, mapping transport failures and non-2xx statuses.
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, GatewayError> {
        log::debug!("Requesting {}", url);
        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        log::debug!("{} responded with {}", url, status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(response)
    }
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.origin)
    }
}

async fn read_body(response: Response, url: &Url) -> Result<Vec<u8>, GatewayError> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|source| GatewayError::Transport {
            url: url.to_string(),
            source,
        })
}

/// The `error` member of a JSON object body, if there is one
fn reported_error(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// Deserialize a list field, treating `null` the same as an absent field.
///
/// Use together with `#[serde(default)]`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a body that must be a JSON object.
///
/// Absent fields are left to the target type's serde defaults; an empty body,
/// invalid JSON, or a non-object value is a malformed response.
pub(crate) fn decode_object<T: DeserializeOwned>(
    url: &Url,
    body: &[u8],
) -> Result<T, GatewayError> {
    let malformed = |reason: String| GatewayError::MalformedResponse {
        url: url.to_string(),
        reason,
    };

    let value: Value = serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        let found = match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        return Err(malformed(format!("expected a JSON object, found {}", found)));
    }
    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}
