use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::{NtopngError, Result};

/// Per-call request parameters
///
/// Values are strings, integers, or `Value::Null` for parameters that are
/// deliberately absent. Null entries are kept in the mapping so a
/// [`RestClient`] implementation sees exactly what was requested; how an
/// absent parameter is put on the wire is the transport's decision.
pub type Params = serde_json::Map<String, Value>;

/// Transport capability required by [`Historical`](crate::Historical)
///
/// ntopng exposes its REST v2 surface through plain GET endpoints (query
/// string parameters) and POST endpoints (JSON body). Implementations own
/// everything below that line: connections, authentication, timeouts,
/// retries. Both methods return the raw decoded JSON response without
/// inspecting it.
pub trait RestClient: Send + Sync {
    /// Issue a GET request against `path`, encoding `params` into the query string
    fn request(
        &self,
        path: &str,
        params: Option<Params>,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Issue a POST request against `path`, sending `params` as a JSON body
    fn post_request(
        &self,
        path: &str,
        params: Option<Params>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// HTTP client for an ntopng instance
///
/// # Example
///
/// ```rust,no_run
/// use ntopng_historical_api::NtopngClient;
/// use url::Url;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NtopngClient::new(
///     Url::parse("http://localhost:3000")?,
///     Duration::from_secs(10),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NtopngClient {
    client: ClientWithMiddleware,
    base_url: Url,
}

impl NtopngClient {
    /// Create a new ntopng client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the ntopng instance (e.g., `http://localhost:3000`)
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NtopngError::BuildHttpClient)?;

        let client = ClientBuilder::new(client).build();

        Ok(Self { client, base_url })
    }

    /// Create a new client with a custom reqwest middleware client
    ///
    /// This is where authentication, retry, or logging middleware plugs in.
    pub fn with_client(client: ClientWithMiddleware, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base_url.join(path).expect("Valid URL path")
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await.map_err(NtopngError::Request)?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NtopngError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(NtopngError::ReadBody)?;
        serde_json::from_str(&body).map_err(NtopngError::Decode)
    }
}

impl RestClient for NtopngClient {
    fn request(
        &self,
        path: &str,
        params: Option<Params>,
    ) -> impl Future<Output = Result<Value>> + Send {
        async move {
            let url = self.endpoint(path);
            debug!(url = %url, "GET request to ntopng");

            // Null params are absent on the wire but stay in the mapping
            // handed to us, so only non-null entries become query pairs.
            let pairs: Vec<(String, String)> = params
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(name, value)| query_value(&value).map(|v| (name, v)))
                .collect();

            self.execute(self.client.get(url).query(&pairs)).await
        }
    }

    fn post_request(
        &self,
        path: &str,
        params: Option<Params>,
    ) -> impl Future<Output = Result<Value>> + Send {
        async move {
            let url = self.endpoint(path);
            debug!(url = %url, "POST request to ntopng");

            let body = Value::Object(params.unwrap_or_default());
            self.execute(self.client.post(url).json(&body)).await
        }
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
