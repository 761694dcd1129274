//! Configuration management for the Mailchimp MCP Server
//!
//! Everything is read from environment variables. The account region is
//! checked against a fixed allow-list before it is spliced into the API
//! host name, so a hostile value can never redirect requests elsewhere.

use std::fmt;
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::mailchimp::retry::{
    RetryConfig, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
};

/// Transport the MCP server speaks on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// HTTP with Server-Sent Events
    Sse,
}

/// Configuration for the Mailchimp MCP Server
#[derive(Clone)]
pub struct Config {
    /// Mailchimp API key
    pub api_key: String,

    /// Data centre (account region), always one of `ALLOWED_DATA_CENTERS`
    pub data_center: String,

    /// Whether write tools are advertised and callable
    pub writes_enabled: bool,

    /// Selected transport
    pub transport: TransportMode,

    /// SSE bind host
    pub host: String,

    /// SSE listen port
    pub port: u16,

    /// Exact CORS origins; empty means localhost only
    pub cors_origins: Vec<String>,

    /// Retry behaviour of the API client
    pub retry: RetryConfig,

    /// Per-request timeout of the API client
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("MAILCHIMP_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar {
                var: "MAILCHIMP_API_KEY".to_string(),
            })?;

        let data_center = resolve_data_center(lookup("MAILCHIMP_DC").as_deref(), &api_key);

        let writes_enabled = lookup("MAILCHIMP_ENABLE_WRITES")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let transport = match lookup("MCP_TRANSPORT").as_deref().map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("sse") => TransportMode::Sse,
            _ if lookup("MCP_SSE").map(|v| is_truthy(&v)).unwrap_or(false) => TransportMode::Sse,
            _ => TransportMode::Stdio,
        };

        let host = lookup("MCP_HOST").unwrap_or_else(|| transport::DEFAULT_HOST.to_string());

        let port = lookup("MCP_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(transport::DEFAULT_PORT);

        let cors_origins = lookup("MCP_CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let retry = RetryConfig::new(
            parse_or(&lookup, "MAILCHIMP_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            parse_or(&lookup, "MAILCHIMP_RETRY_INITIAL_MS", DEFAULT_INITIAL_DELAY_MS)?,
            parse_or(&lookup, "MAILCHIMP_RETRY_MAX_MS", DEFAULT_MAX_DELAY_MS)?,
        )?;

        let request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "MAILCHIMP_TIMEOUT_SECS",
            mailchimp::DEFAULT_TIMEOUT_SECS,
        )?);

        Ok(Self {
            api_key,
            data_center,
            writes_enabled,
            transport,
            host,
            port,
            cors_origins,
            retry,
            request_timeout,
        })
    }

    /// Base URL of the Mailchimp Marketing API for this account
    pub fn api_base_url(&self) -> String {
        mailchimp::api_base_url(&self.data_center)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("data_center", &self.data_center)
            .field("writes_enabled", &self.writes_enabled)
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Pick the data centre: explicit value, then the API key suffix, then the default.
/// Anything not on the allow-list is ignored.
pub fn resolve_data_center(explicit: Option<&str>, api_key: &str) -> String {
    if let Some(dc) = explicit.map(|d| d.trim().to_ascii_lowercase()) {
        if is_allowed_data_center(&dc) {
            return dc;
        }
        tracing::warn!(
            data_center = %dc,
            "Ignoring data centre not on the allow-list, using {}",
            mailchimp::DEFAULT_DATA_CENTER
        );
        return mailchimp::DEFAULT_DATA_CENTER.to_string();
    }

    match api_key.rsplit_once('-') {
        Some((_, suffix)) if is_allowed_data_center(&suffix.to_ascii_lowercase()) => {
            suffix.to_ascii_lowercase()
        }
        _ => mailchimp::DEFAULT_DATA_CENTER.to_string(),
    }
}

/// Whether `dc` is one of `us1`..`us21`
pub fn is_allowed_data_center(dc: &str) -> bool {
    mailchimp::ALLOWED_DATA_CENTERS.contains(&dc)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidConfig {
                message: format!("{} is not a valid number: {:?}", var, raw),
            }
            .into()
        }),
    }
}

/// Mailchimp API constants
pub mod mailchimp {
    /// Region used when none is configured or the configured one is rejected
    pub const DEFAULT_DATA_CENTER: &str = "us1";

    /// Known Mailchimp data centres
    pub const ALLOWED_DATA_CENTERS: &[&str] = &[
        "us1", "us2", "us3", "us4", "us5", "us6", "us7", "us8", "us9", "us10", "us11", "us12",
        "us13", "us14", "us15", "us16", "us17", "us18", "us19", "us20", "us21",
    ];

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Base URL for a data centre
    pub fn api_base_url(data_center: &str) -> String {
        format!("https://{}.api.mailchimp.com/3.0", data_center)
    }
}

/// Transport constants
pub mod transport {
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 3000;

    /// Interval between SSE keep-alive comments
    pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

    /// Largest POST body accepted on the SSE endpoint
    pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
}
