//! Retrying Web API client.
//!
//! Issues authenticated request/response calls against the platform's
//! synchronous API and mints Socket Mode connection URLs.
//!
//! # Request Format
//!
//! | Method | Encoding |
//! |--------|----------|
//! | `GET` | `data` as URL query string, no body |
//! | `POST` | `data` as JSON body, `Content-Type: application/json; charset=utf-8` |
//!
//! Every request carries `Authorization: Bearer <token>`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default Web API base endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api/";

/// Total attempts for a call that keeps failing transiently.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Method that mints a Socket Mode connection URL.
const CONNECTIONS_OPEN: &str = "apps.connections.open";

/// Query flag appended to connection URLs in debug mode.
const DEBUG_RECONNECTS: (&str, &str) = ("debug_reconnects", "true");

/// Content type for POST bodies.
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Error string used when `ok: false` carries no `error` field.
const UNKNOWN_ERROR: &str = "unknown_error";

// ============================================================================
// HttpMethod
// ============================================================================

/// HTTP verb used for a Web API call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    /// Query-string encoded, no body.
    Get,
    /// JSON body.
    #[default]
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

// ============================================================================
// ApiClient
// ============================================================================

/// Web API client.
///
/// Cheap to clone; clones share the underlying connection pool. Hand a
/// clone to the event handler to call the API while processing events.
///
/// # Example
///
/// ```no_run
/// use socket_mode_bot::{ApiClient, HttpMethod};
/// use serde_json::json;
///
/// # async fn example() -> socket_mode_bot::Result<()> {
/// let api = ApiClient::new("xoxb-...")?;
/// api.call("chat.postMessage", &json!({"channel": "C1", "text": "hi"})).await?;
///
/// let user = api
///     .call_with("users.info", &json!({"user": "U1"}), None, HttpMethod::Get)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: String,
    app_token: Option<String>,
    debug: bool,
    max_attempts: u32,
    retry_delay: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_app_token", &self.app_token.is_some())
            .field("debug", &self.debug)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ApiClient - Constructor
// ============================================================================

impl ApiClient {
    /// Creates a client authenticated with the primary token.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = Client::builder().build().map_err(Error::Http)?;

        Ok(Self {
            http,
            base_url: Url::parse(DEFAULT_API_BASE_URL)?,
            token: token.into(),
            app_token: None,
            debug: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Sets the app-level token used to mint connection URLs.
    #[inline]
    #[must_use]
    pub fn with_app_token(mut self, app_token: impl Into<String>) -> Self {
        self.app_token = Some(app_token.into());
        self
    }

    /// Overrides the API base endpoint.
    ///
    /// A trailing `/` is added when missing so that method names join
    /// below the base path.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if `base_url` does not parse
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    /// Enables debug mode: reconnect-debug flag on connection URLs and a
    /// dump of GET responses.
    #[inline]
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overrides the retry policy for transient network failures.
    ///
    /// `max_attempts` counts the first try and is clamped to at least 1.
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }
}

// ============================================================================
// ApiClient - Public API
// ============================================================================

impl ApiClient {
    /// Returns `true` if an app-level token is configured.
    #[inline]
    #[must_use]
    pub fn has_app_token(&self) -> bool {
        self.app_token.is_some()
    }

    /// Returns the API base endpoint.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Calls `method` with the primary token over POST.
    ///
    /// # Errors
    ///
    /// - [`Error::Api`] if the response has `ok: false`
    /// - [`Error::Network`] if all attempts failed transiently
    /// - [`Error::Http`] / [`Error::Json`] on other failures
    pub async fn call(&self, method: &str, data: &Value) -> Result<Value> {
        self.call_with(method, data, None, HttpMethod::Post).await
    }

    /// Calls `method` with an explicit token and HTTP verb.
    ///
    /// `token` defaults to the primary token when `None`.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn call_with(
        &self,
        method: &str,
        data: &Value,
        token: Option<&str>,
        http_method: HttpMethod,
    ) -> Result<Value> {
        let token = token.unwrap_or(&self.token);

        retry_transient(self.max_attempts, self.retry_delay, move |attempt| {
            self.call_once(method, data, token, http_method, attempt)
        })
        .await
    }

    /// Mints a fresh Socket Mode connection URL with the app-level token.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no app-level token is configured
    /// - [`Error::Protocol`] if the response carries no usable `url`
    /// - Any error of [`call`](Self::call)
    pub async fn open_connection_url(&self) -> Result<Url> {
        let app_token = self
            .app_token
            .as_deref()
            .ok_or_else(|| Error::config("app-level token is required to open connections"))?;

        let response = self
            .call_with(CONNECTIONS_OPEN, &json!({}), Some(app_token), HttpMethod::Post)
            .await?;

        let url = response
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol(format!("{CONNECTIONS_OPEN} response has no url")))?;

        let mut url = Url::parse(url)?;
        if self.debug {
            url.query_pairs_mut()
                .append_pair(DEBUG_RECONNECTS.0, DEBUG_RECONNECTS.1);
        }

        Ok(url)
    }
}

// ============================================================================
// ApiClient - Request Execution
// ============================================================================

impl ApiClient {
    /// Performs a single attempt.
    async fn call_once(
        &self,
        method: &str,
        data: &Value,
        token: &str,
        http_method: HttpMethod,
        attempt: u32,
    ) -> Result<Value> {
        let request = self.build_request(method, data, token, http_method)?;
        debug!(method, %http_method, attempt, "Web API call");

        let response = self.http.execute(request).await?;
        let body = response.bytes().await?;
        let json: Value = serde_json::from_slice(&body)?;

        if self.debug && http_method == HttpMethod::Get {
            info!(method, response = %json, "Web API GET response");
        }

        check_ok(json)
    }

    /// Builds the HTTP request for one call.
    pub(crate) fn build_request(
        &self,
        method: &str,
        data: &Value,
        token: &str,
        http_method: HttpMethod,
    ) -> Result<reqwest::Request> {
        let mut url = self.base_url.join(method)?;

        let builder = match http_method {
            HttpMethod::Get => {
                encode_query(&mut url, data);
                self.http.get(url)
            }
            HttpMethod::Post => self
                .http
                .post(url)
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(serde_json::to_vec(data)?),
        };

        builder
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .build()
            .map_err(Error::Http)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Runs `op` up to `max_attempts` times while it fails transiently.
///
/// `op` receives the one-based attempt number. Non-transient errors and
/// the last transient error are returned as is.
pub(crate) async fn retry_transient<T, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "Transient Web API failure, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Fails with [`Error::Api`] unless the response has `ok: true`.
fn check_ok(json: Value) -> Result<Value> {
    if json.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(json);
    }

    let error = json
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ERROR);
    Err(Error::api(error))
}

/// Form-encodes the top-level entries of `data` into the query string.
fn encode_query(url: &mut Url, data: &Value) {
    let Some(fields) = data.as_object() else {
        return;
    };
    if fields.is_empty() {
        return;
    }

    let mut query = url.query_pairs_mut();
    for (key, value) in fields {
        match value {
            Value::Null => {
                query.append_key_only(key);
            }
            Value::Array(items) => {
                for item in items {
                    query.append_pair(key, &query_value(item));
                }
            }
            other => {
                query.append_pair(key, &query_value(other));
            }
        }
    }
}

/// Renders a scalar for the query string.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
