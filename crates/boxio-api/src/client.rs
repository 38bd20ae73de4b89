//! Box API HTTP client
//!
//! Wraps `reqwest::Client` with endpoint construction for the content,
//! upload and token hosts, bearer authentication, and automatic handling of
//! HTTP 429 responses.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use boxio_api::client::BoxClient;
//! use boxio_core::config::Settings;
//!
//! # fn example() -> Result<(), boxio_api::BoxApiError> {
//! let client = BoxClient::new(&Settings::default())?;
//! assert_eq!(client.api_base_url(), "https://api.box.com/2.0");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use boxio_core::config::Settings;
use boxio_core::domain::AccessToken;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::BoxApiError;

/// Default retry-after duration when the header is missing
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Longest Retry-After we are willing to honour
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Maximum number of retries for 429 responses
const MAX_RETRIES: u32 = 3;

/// HTTP client for Box API calls
#[derive(Debug, Clone)]
pub struct BoxClient {
    client: Client,
    api_base_url: String,
    upload_base_url: String,
    token_url: String,
    page_size: u32,
}

impl BoxClient {
    /// Creates a client from runtime settings
    pub fn new(settings: &Settings) -> Result<Self, BoxApiError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .user_agent(concat!("boxio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: settings.upload_base_url.trim_end_matches('/').to_string(),
            token_url: settings.token_url.clone(),
            page_size: settings.page_size,
        })
    }

    /// Creates a client whose hosts all live under `base_url` (useful for testing)
    ///
    /// The token endpoint becomes `{base_url}/oauth2/token`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            token_url: format!("{base}/oauth2/token"),
            upload_base_url: base.clone(),
            api_base_url: base,
            page_size: Settings::default().page_size,
        }
    }

    /// Overrides the listing page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Authenticated request against the content API
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/folders/0")
    /// * `token` - Access token of the current session
    pub fn request(&self, method: Method, path: &str, token: &AccessToken) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client.request(method, url).bearer_auth(token.as_str())
    }

    /// Authenticated request against the upload API
    pub fn upload_request(&self, path: &str, token: &AccessToken) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client.post(url).bearer_auth(token.as_str())
    }

    /// Unauthenticated POST to the token endpoint
    pub(crate) fn token_request(&self) -> RequestBuilder {
        self.client.post(&self.token_url)
    }

    /// Sends a request built by `build`, retrying on HTTP 429
    ///
    /// The builder closure is called once per attempt. Non-success statuses
    /// other than 429 are converted into [`BoxApiError`].
    pub async fn execute_with_retry<F>(&self, what: &str, build: F) -> Result<Response, BoxApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        for attempt in 0..=MAX_RETRIES {
            let response = build().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .map(parse_retry_after)
                    .unwrap_or(DEFAULT_RETRY_AFTER);

                if attempt >= MAX_RETRIES {
                    warn!(what, attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(BoxApiError::TooManyRequests { retry_after });
                }

                info!(
                    what,
                    attempt,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Received 429, backing off"
                );
                tokio::time::sleep(retry_after).await;
                continue;
            }

            if !status.is_success() {
                debug!(what, status = status.as_u16(), "Request failed");
                return Err(BoxApiError::from_response(response).await);
            }

            if attempt > 0 {
                info!(what, attempt, "Request succeeded after retry");
            }
            return Ok(response);
        }

        Err(BoxApiError::TooManyRequests {
            retry_after: DEFAULT_RETRY_AFTER,
        })
    }
}

/// Parses a `Retry-After` value given in seconds, capped at five minutes
fn parse_retry_after(value: &str) -> Duration {
    match value.trim().parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds).min(MAX_RETRY_AFTER),
        Err(_) => {
            warn!(value, "Could not parse Retry-After header, using default");
            DEFAULT_RETRY_AFTER
        }
    }
}
