//! JSON export loader
//!
//! The export is the store's document tree serialized as one JSON file. It is
//! read once per source, on first use, and each snapshot is then located in
//! it by its document path.
//!
//! The file location defaults to `<data_dir>/parkstat/snapshot.json` and can
//! be overridden with the `PARKSTAT_SNAPSHOT` environment variable.

use async_trait::async_trait;
use parkstat_core::error::{ParkstatError, Result};
use parkstat_core::provider::SnapshotSource;
use parkstat_core::snapshot::{SnapshotKind, navigate};
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Environment variable overriding the export location
pub const SNAPSHOT_ENV: &str = "PARKSTAT_SNAPSHOT";

/// Snapshot source backed by a JSON export on disk
pub struct FileSource {
    path: PathBuf,
    document: OnceCell<Value>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: OnceCell::new(),
        }
    }

    /// Create a source from `PARKSTAT_SNAPSHOT`, or the default location
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(SNAPSHOT_ENV)
            && !path.trim().is_empty()
        {
            return Ok(Self::new(path.trim()));
        }

        let path = Self::default_path().ok_or_else(|| {
            ParkstatError::Config(format!(
                "Cannot determine data directory. Pass --snapshot or set {SNAPSHOT_ENV}"
            ))
        })?;
        Ok(Self::new(path))
    }

    /// Default export location under the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("parkstat").join("snapshot.json"))
    }

    async fn document(&self, kind: SnapshotKind) -> Result<&Value> {
        self.document
            .get_or_try_init(|| async {
                let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                    ParkstatError::upstream(kind, format!("{}: {}", self.path.display(), e))
                })?;
                let document: Value = serde_json::from_str(&content).map_err(|e| {
                    ParkstatError::upstream(kind, format!("{}: {}", self.path.display(), e))
                })?;
                info!("Loaded snapshot export {}", self.path.display());
                Ok::<_, ParkstatError>(document)
            })
            .await
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_raw(&self, kind: SnapshotKind) -> Result<Value> {
        let document = self.document(kind).await?;
        let value = navigate(document, kind.path());
        if value.is_null() {
            debug!("Export has no data at {}", kind.path());
        }
        Ok(value.clone())
    }
}
