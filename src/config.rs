//! Feed client configuration
//!
//! Defaults match the stock SecMon deployment (backend on `localhost:8001`, 3 s reconnect
//! delay, 100 events kept). Every value can be overridden from the environment:
//!
//! - `SECMON_API_URL`: backend base URL
//! - `SECMON_WS_URL`: live feed URL (default: derived from the API URL, `/ws/feed`)
//! - `SECMON_RECONNECT_MS`: delay before a reconnect attempt
//! - `SECMON_LOG_CAPACITY`: number of events kept client-side
//! - `SECMON_SNAPSHOT_LIMIT`: `limit` passed to `/api/events`
//! - `SECMON_HTTP_TIMEOUT_SECS`: REST request timeout
//! - `SECMON_CONNECT_TIMEOUT_SECS`: deadline for one live feed handshake
//! - `SECMON_RELAY_ADDR`: bind address of the consumer relay

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::backend::with_trailing_slash;
use crate::error::{FeedError, FeedResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);
pub const DEFAULT_LOG_CAPACITY: usize = 100;
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 50;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:8090";

/// Path of the live feed endpoint, relative to the backend base URL
const FEED_PATH: &str = "ws/feed";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Backend base URL for REST reads
    pub api_url: Url,
    /// WebSocket URL of the live feed
    pub ws_url: Url,
    pub reconnect_delay: Duration,
    /// Maximum number of events held in the client-side log
    pub log_capacity: usize,
    pub snapshot_limit: usize,
    pub http_timeout: Duration,
    /// A feed handshake that takes longer counts as failed and is retried
    pub connect_timeout: Duration,
    pub relay_addr: SocketAddr,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let api_url = Url::parse(DEFAULT_API_URL).expect("default API URL is valid");
        let ws_url = feed_url_for(&api_url).expect("default API URL has a host");
        Self {
            api_url,
            ws_url,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            relay_addr: DEFAULT_RELAY_ADDR.parse().expect("default relay address is valid"),
        }
    }
}

impl FeedConfig {
    /// Build a config pointing at a backend base URL, feed URL derived from it
    pub fn with_api_url(api_url: &str) -> FeedResult<Self> {
        let api_url = Url::parse(api_url)?;
        let ws_url = feed_url_for(&api_url)?;
        Ok(Self {
            api_url,
            ws_url,
            ..Default::default()
        })
    }

    /// Load the config from process environment variables
    pub fn from_env() -> FeedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config from an arbitrary key lookup
    ///
    /// URLs that fail to parse are errors; numeric values that fail to parse are logged
    /// and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> FeedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("SECMON_API_URL") {
            Some(url) => Self::with_api_url(url.trim())?,
            None => Self::default(),
        };

        if let Some(ws) = lookup("SECMON_WS_URL") {
            let ws_url = Url::parse(ws.trim())?;
            if !matches!(ws_url.scheme(), "ws" | "wss") {
                return Err(FeedError::Config(format!(
                    "SECMON_WS_URL must use ws:// or wss://, got {}",
                    ws_url.scheme()
                )));
            }
            config.ws_url = ws_url;
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "SECMON_RECONNECT_MS") {
            config.reconnect_delay = Duration::from_millis(ms);
        }

        if let Some(capacity) = parse_var::<usize>(&lookup, "SECMON_LOG_CAPACITY") {
            if capacity == 0 {
                warn!("SECMON_LOG_CAPACITY must be positive, keeping {}", config.log_capacity);
            } else {
                config.log_capacity = capacity;
            }
        }

        if let Some(limit) = parse_var::<usize>(&lookup, "SECMON_SNAPSHOT_LIMIT") {
            config.snapshot_limit = limit;
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "SECMON_HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "SECMON_CONNECT_TIMEOUT_SECS") {
            if secs == 0 {
                warn!("SECMON_CONNECT_TIMEOUT_SECS must be positive, keeping {:?}", config.connect_timeout);
            } else {
                config.connect_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(addr) = parse_var::<SocketAddr>(&lookup, "SECMON_RELAY_ADDR") {
            config.relay_addr = addr;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}

/// Derive the live feed URL from the backend base URL (`http` -> `ws`, `https` -> `wss`),
/// keeping host, port and any path prefix
pub fn feed_url_for(api_url: &Url) -> FeedResult<Url> {
    let scheme = match api_url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(FeedError::Config(format!(
                "unsupported backend URL scheme: {}",
                other
            )))
        }
    };
    if api_url.host_str().is_none() {
        return Err(FeedError::Config(format!("backend URL has no host: {}", api_url)));
    }

    let mut base = with_trailing_slash(api_url.clone());
    base.set_scheme(scheme)
        .map_err(|_| FeedError::Config(format!("cannot derive feed URL from {}", api_url)))?;
    Ok(base.join(FEED_PATH)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FeedConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8001/");
        assert_eq!(config.ws_url.as_str(), "ws://localhost:8001/ws/feed");
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.log_capacity, 100);
        assert_eq!(config.relay_addr.port(), 8090);
    }

    #[test]
    fn test_env_overrides() {
        let config = FeedConfig::from_lookup(lookup_from(&[
            ("SECMON_API_URL", "https://secmon.internal:9443"),
            ("SECMON_RECONNECT_MS", "500"),
            ("SECMON_LOG_CAPACITY", "25"),
            ("SECMON_SNAPSHOT_LIMIT", "200"),
            ("SECMON_CONNECT_TIMEOUT_SECS", "3"),
            ("SECMON_RELAY_ADDR", "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert_eq!(config.ws_url.as_str(), "wss://secmon.internal:9443/ws/feed");
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
        assert_eq!(config.log_capacity, 25);
        assert_eq!(config.snapshot_limit, 200);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.relay_addr.port(), 9000);
    }

    #[test]
    fn test_explicit_ws_url() {
        let config = FeedConfig::from_lookup(lookup_from(&[(
            "SECMON_WS_URL",
            "ws://10.0.0.2:8001/ws/feed",
        )]))
        .unwrap();
        assert_eq!(config.ws_url.host_str(), Some("10.0.0.2"));
        assert_eq!(config.api_url.as_str(), "http://localhost:8001/");
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = FeedConfig::from_lookup(lookup_from(&[
            ("SECMON_RECONNECT_MS", "soon"),
            ("SECMON_LOG_CAPACITY", "0"),
            ("SECMON_CONNECT_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert_eq!(config.log_capacity, DEFAULT_LOG_CAPACITY);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn test_feed_url_keeps_path_prefix() {
        let config = FeedConfig::with_api_url("https://gw.example/secmon").unwrap();
        assert_eq!(config.ws_url.as_str(), "wss://gw.example/secmon/ws/feed");

        let config = FeedConfig::with_api_url("http://10.0.0.2:8001/").unwrap();
        assert_eq!(config.ws_url.as_str(), "ws://10.0.0.2:8001/ws/feed");
    }

    #[test]
    fn test_bad_urls_are_errors() {
        assert!(FeedConfig::from_lookup(lookup_from(&[("SECMON_API_URL", "not a url")])).is_err());
        assert!(FeedConfig::from_lookup(lookup_from(&[(
            "SECMON_WS_URL",
            "http://localhost/ws/feed"
        )]))
        .is_err());
        assert!(FeedConfig::with_api_url("ftp://localhost").is_err());
    }
}
