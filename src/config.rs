//! Fetch configuration.
//!
//! `FetchConfig` controls the production HTTP client used by
//! [`StepFetcher::from_config`](crate::StepFetcher::from_config). It has
//! sensible defaults via [`Default`] and a fluent [`FetchConfig::builder()`]
//! with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use step_fetch::FetchConfig;
//! let cfg = FetchConfig::default();
//! assert_eq!(cfg.max_redirects, 10);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use std::time::Duration;
//! use step_fetch::FetchConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = FetchConfig::builder()
//!     .user_agent("model-merger/2.0")
//!     .timeout(Duration::from_secs(30))
//!     .max_redirects(3)
//!     .build()?; // returns Result<FetchConfig, FetchConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `user_agent`: `User-Agent` header sent with every request.
//! - `timeout`: Optional whole-request timeout, body read included (default: none).
//!   Expiry is reported as a network or body error.
//! - `connect_timeout`: Timeout for establishing the connection.
//! - `max_redirects`: Redirects to follow (`0` disables following).
//! - `accept`: Optional `Accept` header value.
//! - `compression`: Transparent gzip/brotli/deflate decoding.
//!
//! # Errors
//!
//! Builder validation returns [`FetchConfigError`] for an empty or malformed
//! user agent, a malformed `accept` value, or zero timeouts.

use std::fmt;
use std::time::Duration;

use http::HeaderValue;

const DEFAULT_USER_AGENT: &str = concat!("step-fetch/", env!("CARGO_PKG_VERSION"));
const DEFAULT_ACCEPT: &str = "model/step, application/step, text/plain, */*";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub max_redirects: usize,
    pub accept: Option<String>,
    pub compression: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            connect_timeout: Some(Duration::from_secs(10)),
            max_redirects: 10,
            accept: Some(DEFAULT_ACCEPT.to_string()),
            compression: true,
        }
    }
}

impl FetchConfig {
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::default()
    }
}

/// Builder for [`FetchConfig`].
#[derive(Debug, Clone, Default)]
pub struct FetchConfigBuilder {
    inner: FetchConfig,
}

impl FetchConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut FetchConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn timeout(self, t: Duration) -> Self { self.map(|c| c.timeout = Some(t)) }
    pub fn no_timeout(self) -> Self { self.map(|c| c.timeout = None) }
    pub fn connect_timeout(self, t: Duration) -> Self { self.map(|c| c.connect_timeout = Some(t)) }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }
    pub fn accept<S: Into<String>>(self, accept: S) -> Self { self.map(|c| c.accept = Some(accept.into())) }
    pub fn no_accept(self) -> Self { self.map(|c| c.accept = None) }
    pub fn compression(self, on: bool) -> Self { self.map(|c| c.compression = on) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut FetchConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<FetchConfig, FetchConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum FetchConfigError {
    EmptyUserAgent,
    InvalidHeaderValue { name: &'static str, value: String },
    ZeroTimeout,
    ZeroConnectTimeout,
}

impl fmt::Display for FetchConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty"),
            FetchConfigError::InvalidHeaderValue { name, value } =>
                write!(f, "{name} value {value:?} is not a valid HTTP header value"),
            FetchConfigError::ZeroTimeout =>
                write!(f, "timeout must be greater than zero"),
            FetchConfigError::ZeroConnectTimeout =>
                write!(f, "connect_timeout must be greater than zero"),
        }
    }
}
impl std::error::Error for FetchConfigError {}

fn validate(c: &FetchConfig) -> Result<(), FetchConfigError> {
    if c.user_agent.trim().is_empty() {
        return Err(FetchConfigError::EmptyUserAgent);
    }
    if HeaderValue::from_str(&c.user_agent).is_err() {
        return Err(FetchConfigError::InvalidHeaderValue {
            name: "user_agent",
            value: c.user_agent.clone(),
        });
    }
    if let Some(accept) = &c.accept {
        if HeaderValue::from_str(accept).is_err() {
            return Err(FetchConfigError::InvalidHeaderValue {
                name: "accept",
                value: accept.clone(),
            });
        }
    }
    if c.timeout == Some(Duration::ZERO) {
        return Err(FetchConfigError::ZeroTimeout);
    }
    if c.connect_timeout == Some(Duration::ZERO) {
        return Err(FetchConfigError::ZeroConnectTimeout);
    }
    Ok(())
}
