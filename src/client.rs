//! InfluxDB HTTP write client.
//!
//! This module provides the `HttpClient` type, which encodes points with a
//! [`LineProtocolWriter`] and posts the batch to the server's `/write` endpoint.

use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::point::Point;
use crate::precision::Precision;
use crate::writer::LineProtocolWriter;

/// Header carrying the server version in `/ping` responses.
const VERSION_HEADER: &str = "X-Influxdb-Version";

/// InfluxDB HTTP write client.
///
/// Derived transport state (the write URL, the authorization header and the underlying
/// `reqwest::Client`) is computed in one place, shared by [`new`](Self::new),
/// [`reconfigure`](Self::reconfigure) and [`rebuild`](Self::rebuild).
///
/// # Example
///
/// ```ignore
/// use influxdb_line_writer::{ClientConfig, HttpClient, Point};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = HttpClient::new(ClientConfig::new("telemetry"))?;
///
///     let point = Point::builder("temperature")?
///         .tag("room", "kitchen")?
///         .field("celsius", 21.5)
///         .timestamp(chrono::Utc::now())
///         .build();
///
///     client.write([&point]).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    config: ClientConfig,
    transport: Transport,
}

/// State derived from a [`ClientConfig`].
#[derive(Clone, Debug)]
struct Transport {
    http: reqwest::Client,
    write_url: Url,
    ping_url: Url,
    authorization: Option<HeaderValue>,
}

impl Transport {
    fn build(config: &ClientConfig) -> Result<Self> {
        let (write_url, ping_url) = build_urls(config)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout_duration()?)
            .build()?;
        let authorization = match &config.credentials {
            Some(c) => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", c.username, c.password));
                let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
                    .map_err(|e| Error::Config {
                        message: format!("invalid credentials: {}", e),
                    })?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        debug!(url = %write_url, auth = authorization.is_some(), "built transport state");
        Ok(Self {
            http,
            write_url,
            ping_url,
            authorization,
        })
    }

    fn post(&self, body: String) -> reqwest::RequestBuilder {
        let request = self
            .http
            .post(self.write_url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body);
        self.authorize(request)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.authorization {
            Some(auth) => request.header(AUTHORIZATION, auth.clone()),
            None => request,
        }
    }
}

impl HttpClient {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Self::prepare(&config)?,
            config,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the URL batches are posted to.
    pub fn write_url(&self) -> &Url {
        &self.transport.write_url
    }

    /// Apply `change` to a copy of the configuration, validate it, and rebuild.
    ///
    /// On error the client keeps its previous configuration.
    pub fn reconfigure(&mut self, change: impl FnOnce(&mut ClientConfig)) -> Result<()> {
        let mut config = self.config.clone();
        change(&mut config);
        self.transport = Self::prepare(&config)?;
        self.config = config;
        Ok(())
    }

    /// Recompute the write URL, authorization header and HTTP client from the configuration.
    pub fn rebuild(&mut self) -> Result<()> {
        self.transport = Self::prepare(&self.config)?;
        Ok(())
    }

    fn prepare(config: &ClientConfig) -> Result<Transport> {
        config.validate()?;
        Transport::build(config)
    }

    /// Encode `points` and post them as one batch.
    ///
    /// Encoding errors are returned before any request is made. An empty iterator sends
    /// nothing.
    pub async fn write<'a, I>(&self, points: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut writer = LineProtocolWriter::new(self.config.precision);
        writer.write_all(points)?;
        self.write_batch(&writer).await
    }

    /// Post an already encoded batch.
    ///
    /// The batch must have been encoded at the configured precision.
    pub async fn write_batch(&self, batch: &LineProtocolWriter) -> Result<()> {
        if batch.precision() != self.config.precision {
            return Err(Error::Config {
                message: format!(
                    "batch precision '{}' does not match client precision '{}'",
                    batch.precision(),
                    self.config.precision
                ),
            });
        }
        if batch.is_empty() {
            return Ok(());
        }

        debug!(
            lines = batch.line_count(),
            bytes = batch.len(),
            database = %self.config.database,
            "posting batch"
        );

        let response = self
            .transport
            .post(batch.render().to_string())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error = match status {
            StatusCode::BAD_REQUEST => Error::BadRequest(response_body(response).await),
            StatusCode::NOT_FOUND => Error::NotFound(response_body(response).await),
            StatusCode::INTERNAL_SERVER_ERROR => Error::Server(response_body(response).await),
            _ => match response.error_for_status() {
                Err(e) => Error::Http(e),
                Ok(_) => Error::Server(format!("unexpected status {}", status)),
            },
        };
        warn!(status = status.as_u16(), error = %error, "batch rejected");
        Err(error)
    }

    /// Ping the server and return its version.
    pub async fn ping(&self) -> Result<String> {
        let request = self.transport.http.get(self.transport.ping_url.clone());
        let response = self
            .transport
            .authorize(request)
            .send()
            .await?
            .error_for_status()?;
        let version = response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::MissingHeader(VERSION_HEADER.to_string()))?;
        Ok(version.to_string())
    }
}

/// Read the response body as the server's diagnostic, empty if it cannot be read.
async fn response_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

/// Build the `/write` and `/ping` URLs for `config`.
///
/// Nanosecond is the server's default precision, so it is left off the query string.
fn build_urls(config: &ClientConfig) -> Result<(Url, Url)> {
    let base = format!("http://{}:{}/", host_for_url(&config.server), config.port);
    let base = Url::parse(&base).map_err(|e| Error::Config {
        message: format!("invalid server '{}': {}", config.server, e),
    })?;

    let mut write_url = base.join("write").map_err(|e| Error::Config {
        message: format!("invalid write URL: {}", e),
    })?;
    {
        let mut query = write_url.query_pairs_mut();
        query.append_pair("db", &config.database);
        if config.precision != Precision::Nanosecond {
            query.append_pair("precision", config.precision.code());
        }
    }

    let ping_url = base.join("ping").map_err(|e| Error::Config {
        message: format!("invalid ping URL: {}", e),
    })?;
    Ok((write_url, ping_url))
}

/// Bracket bare IPv6 addresses so they can be embedded in a URL.
fn host_for_url(server: &str) -> String {
    if server.contains(':') && !server.starts_with('[') {
        format!("[{}]", server)
    } else {
        server.to_string()
    }
}
