//! Chat session configuration.
//!
//! Base URLs are passed in explicitly rather than looked up from ambient
//! globals. `from_env` exists for binaries; library callers and tests build
//! a `ChatConfig` directly or through [`ChatConfig::from_lookup`].

/// Fixed path of the assistant's websocket endpoint.
pub const ASK_PATH: &str = "/rag/ws/ask";

/// Fixed path of the "who am I" endpoint used by the auth precheck.
pub const AUTH_ME_PATH: &str = "/auth/me";

/// Text shown in the placeholder message while an answer is pending.
pub const DEFAULT_PLACEHOLDER: &str = "Reasoning";

/// Name of the cookie the backend authenticates websocket and REST calls with.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {var}; set it or pass the matching flag")]
    Missing { var: &'static str },
    #[error("invalid base URL `{0}`: expected an http(s) or ws(s) scheme")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// REST base, e.g. `https://pharmacy.example/api`.
    pub api_base: String,
    /// Websocket base, e.g. `wss://pharmacy.example/api`.
    pub ws_base: String,
    /// Value of the `access_token` cookie, when the caller is logged in.
    pub access_token: Option<String>,
    pub placeholder: String,
}

impl ChatConfig {
    /// Build a config from explicit bases.
    ///
    /// When `ws_base` is `None` it is derived from `api_base` by swapping
    /// `http` for `ws` and `https` for `wss`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when a base has an unsupported scheme.
    pub fn new(api_base: &str, ws_base: Option<&str>) -> Result<Self, ConfigError> {
        let api_base = normalize_http_base(api_base)?;
        let ws_base = match ws_base {
            Some(raw) => normalize_ws_base(raw)?,
            None => ws_base_from_http(&api_base)?,
        };

        Ok(Self { api_base, ws_base, access_token: None, placeholder: DEFAULT_PLACEHOLDER.to_owned() })
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.access_token = (!token.is_empty()).then_some(token);
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        if !placeholder.trim().is_empty() {
            self.placeholder = placeholder;
        }
        self
    }

    /// Build config from environment variables.
    ///
    /// Required:
    /// - `MEDTRACK_API_BASE`
    ///
    /// Optional:
    /// - `MEDTRACK_WS_BASE`: derived from the API base when absent
    /// - `MEDTRACK_ACCESS_TOKEN`
    /// - `MEDTRACK_PLACEHOLDER`: default `Reasoning`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the API base is missing or a base is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ChatConfig::from_env`] but reads variables through `lookup`.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// See [`ChatConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = get("MEDTRACK_API_BASE").ok_or(ConfigError::Missing { var: "MEDTRACK_API_BASE" })?;
        let ws_base = get("MEDTRACK_WS_BASE");

        let mut config = Self::new(&api_base, ws_base.as_deref())?;
        if let Some(token) = get("MEDTRACK_ACCESS_TOKEN") {
            config = config.with_access_token(token);
        }
        if let Some(placeholder) = get("MEDTRACK_PLACEHOLDER") {
            config = config.with_placeholder(placeholder);
        }
        Ok(config)
    }

    /// Full websocket URL of the ask endpoint.
    #[must_use]
    pub fn ask_url(&self) -> String {
        format!("{}{ASK_PATH}", self.ws_base)
    }

    /// Full URL of the auth precheck endpoint.
    #[must_use]
    pub fn auth_me_url(&self) -> String {
        format!("{}{AUTH_ME_PATH}", self.api_base)
    }

    /// `Cookie` header value carrying the access token, if any.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .map(|token| format!("{ACCESS_TOKEN_COOKIE}={token}"))
    }
}

fn normalize_http_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

fn normalize_ws_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        return Ok(trimmed.to_owned());
    }
    ws_base_from_http(trimmed)
}

fn ws_base_from_http(base: &str) -> Result<String, ConfigError> {
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}"));
    }

    Err(ConfigError::InvalidBaseUrl(base.to_owned()))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
