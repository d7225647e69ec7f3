//! Client configuration and the per-call exchange configuration derived from
//! it.

use std::time::Duration;

use crate::auth::{bearer_token, PersistedState};
use crate::error::RequestError;

pub const BASE_URL_ENV: &str = "ERP_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "ERP_REQUEST_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub with_credentials: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            with_credentials: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `ERP_API_BASE_URL` (required) and `ERP_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, RequestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RequestError> {
        let base = lookup(BASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| RequestError::InvalidConfig(format!("{BASE_URL_ENV} is not set")))?;
        let mut config = Self::new(base.trim());
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    RequestError::InvalidConfig(format!(
                        "{TIMEOUT_ENV} must be a positive number of seconds, got {raw:?}"
                    ))
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the configuration for one exchange from the freshest auth
    /// state.
    pub fn resolve<S: PersistedState + ?Sized>(&self, state: &S) -> ExchangeConfig {
        ExchangeConfig {
            base_url: self.api_base_url.trim_end_matches('/').to_string(),
            with_credentials: self.with_credentials,
            bearer: bearer_token(state),
        }
    }
}

/// Immutable configuration for a single exchange. Built at the start of each
/// operation and passed into the request builder; nothing here is shared
/// between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub with_credentials: bool,
    pub bearer: Option<String>,
}

impl ExchangeConfig {
    pub fn anonymous(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            with_credentials: true,
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}
