//! Realtime document store loader
//!
//! Reads each snapshot with a plain `GET <base>/<path>.json`, optionally
//! authenticated with a database secret or ID token passed as `auth`.

use async_trait::async_trait;
use parkstat_core::error::{ParkstatError, Result};
use parkstat_core::provider::SnapshotSource;
use parkstat_core::snapshot::SnapshotKind;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable holding the database base URL
pub const DB_URL_ENV: &str = "PARKSTAT_DB_URL";

/// Environment variable holding the database auth token
pub const DB_AUTH_ENV: &str = "PARKSTAT_DB_AUTH";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Snapshot source backed by the realtime document store
pub struct RtdbSource {
    base_url: Url,
    auth: Option<String>,
    client: reqwest::Client,
}

impl RtdbSource {
    /// Create a source for the database at `base_url`
    pub fn new(base_url: &str, auth: Option<String>) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ParkstatError::Config(format!(
                "No database URL configured. Pass --db-url or set {DB_URL_ENV}"
            )));
        }

        // A trailing slash makes `Url::join` append instead of replace
        let base_url = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| ParkstatError::Config(format!("Invalid database URL '{trimmed}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ParkstatError::Config(format!(
                "Unsupported database URL scheme '{}'",
                base_url.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ParkstatError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            auth: auth.filter(|a| !a.trim().is_empty()),
            client,
        })
    }

    /// REST URL of a snapshot, without credentials
    pub fn snapshot_url(&self, kind: SnapshotKind) -> Result<Url> {
        self.base_url
            .join(&format!("{}.json", kind.path()))
            .map_err(|e| ParkstatError::upstream(kind, e.to_string()))
    }
}

#[async_trait]
impl SnapshotSource for RtdbSource {
    fn name(&self) -> &str {
        "rtdb"
    }

    async fn fetch_raw(&self, kind: SnapshotKind) -> Result<Value> {
        let mut url = self.snapshot_url(kind)?;
        debug!("Fetching {} from {}", kind, url);
        if let Some(auth) = &self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!("Request for {} failed: {}", kind, e);
            ParkstatError::upstream(kind, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Store answered {} for {}", status, kind);
            return Err(ParkstatError::upstream(kind, format!("HTTP {status}")));
        }

        response.json::<Value>().await.map_err(|e| {
            ParkstatError::upstream(kind, format!("unreadable body: {}", e.without_url()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_urls() {
        let source = RtdbSource::new("https://lot-a.example.com/", None).unwrap();
        assert_eq!(
            source
                .snapshot_url(SnapshotKind::Transactions)
                .unwrap()
                .as_str(),
            "https://lot-a.example.com/transactions.json"
        );
        assert_eq!(
            source.snapshot_url(SnapshotKind::Layout).unwrap().as_str(),
            "https://lot-a.example.com/configurations/layout/floors.json"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let source = RtdbSource::new("http://localhost:9000/lots/north", None).unwrap();
        assert_eq!(
            source.snapshot_url(SnapshotKind::UserDirectory).unwrap().as_str(),
            "http://localhost:9000/lots/north/users.json"
        );
    }

    #[test]
    fn test_missing_url_is_config_error() {
        assert!(matches!(
            RtdbSource::new("  ", None),
            Err(ParkstatError::Config(_))
        ));
        assert!(matches!(
            RtdbSource::new("not a url", None),
            Err(ParkstatError::Config(_))
        ));
        assert!(matches!(
            RtdbSource::new("ftp://lot.example.com", None),
            Err(ParkstatError::Config(_))
        ));
    }

    #[test]
    fn test_blank_auth_ignored() {
        let source = RtdbSource::new("https://lot.example.com", Some(" ".into())).unwrap();
        assert!(source.auth.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_upstream_error() {
        // Port 9 (discard) on loopback is not expected to serve HTTP
        let source = RtdbSource::new("http://127.0.0.1:9", Some("secret".into())).unwrap();
        let err = source.fetch_raw(SnapshotKind::Occupancy).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(!err.to_string().contains("secret"));
    }
}
