//! Backend endpoint resolution

use crowd_monitor_shared::{CrowdMonitorError, MonitorResult};
use url::Url;

/// URLs of the backend's push channel and REST endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoints {
    base: Url,
}

impl BackendEndpoints {
    pub fn new(server_url: &str) -> MonitorResult<Self> {
        let base = Url::parse(server_url).map_err(|e| CrowdMonitorError::InvalidConfig {
            message: format!("invalid server url {server_url:?}: {e}"),
            field: Some("server_url".to_string()),
        })?;

        match base.scheme() {
            "http" | "https" => Ok(Self { base }),
            other => Err(CrowdMonitorError::InvalidConfig {
                message: format!("unsupported scheme {other:?}, expected http or https"),
                field: Some("server_url".to_string()),
            }),
        }
    }

    /// `ws://host/ws` for http, `wss://host/ws` for https
    pub fn push_channel(&self) -> String {
        let mut url = self.base.clone();
        let scheme = if self.base.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always a valid special-scheme swap
        let _ = url.set_scheme(scheme);
        url.set_path("/ws");
        url.set_query(None);
        url.to_string()
    }

    pub fn config(&self) -> String {
        self.join("/api/config")
    }

    pub fn perf(&self) -> String {
        self.join("/api/perf")
    }

    fn join(&self, path: &str) -> String {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(None);
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_http() {
        let endpoints = BackendEndpoints::new("http://localhost:8000").unwrap();
        assert_eq!(endpoints.push_channel(), "ws://localhost:8000/ws");
        assert_eq!(endpoints.config(), "http://localhost:8000/api/config");
        assert_eq!(endpoints.perf(), "http://localhost:8000/api/perf");
    }

    #[test]
    fn test_https_uses_secure_socket() {
        let endpoints = BackendEndpoints::new("https://crowd.example.com/dashboard").unwrap();
        assert_eq!(endpoints.push_channel(), "wss://crowd.example.com/ws");
        assert_eq!(endpoints.config(), "https://crowd.example.com/api/config");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(BackendEndpoints::new("not a url").is_err());
        assert!(matches!(
            BackendEndpoints::new("ftp://example.com"),
            Err(CrowdMonitorError::InvalidConfig { .. })
        ));
    }
}
