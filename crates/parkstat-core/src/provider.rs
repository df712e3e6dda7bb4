//! Snapshot source trait
//!
//! Each provider crate (remote store, file export) implements
//! [`SnapshotSource`] so the report pipeline can run against any of them with
//! generic code. Implementors only supply [`SnapshotSource::fetch_raw`]; the
//! typed fetches and the concurrent [`SnapshotSource::fetch_all`] are built on
//! top of it.

use crate::error::Result;
use crate::snapshot::{
    SnapshotKind, parse_layout, parse_occupancy, parse_transactions, parse_user_directory,
};
use crate::types::{LayoutCapacity, OccupancySlotState, Transaction, UserDirectory};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// The four input snapshots of one report, fetched independently
#[derive(Debug, Clone, Default)]
pub struct Snapshots {
    pub transactions: Vec<Transaction>,
    pub occupancy: Vec<OccupancySlotState>,
    pub directory: UserDirectory,
    pub layout: LayoutCapacity,
}

/// Trait for snapshot providers
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the raw document at the snapshot's path
    ///
    /// Any failure must be reported as
    /// [`ParkstatError::UpstreamFetch`](crate::error::ParkstatError::UpstreamFetch).
    async fn fetch_raw(&self, kind: SnapshotKind) -> Result<Value>;

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let raw = self.fetch_raw(SnapshotKind::Transactions).await?;
        Ok(parse_transactions(raw))
    }

    async fn fetch_occupancy(&self) -> Result<Vec<OccupancySlotState>> {
        let raw = self.fetch_raw(SnapshotKind::Occupancy).await?;
        Ok(parse_occupancy(raw))
    }

    async fn fetch_user_directory(&self) -> Result<UserDirectory> {
        let raw = self.fetch_raw(SnapshotKind::UserDirectory).await?;
        Ok(parse_user_directory(raw))
    }

    async fn fetch_layout(&self) -> Result<LayoutCapacity> {
        let raw = self.fetch_raw(SnapshotKind::Layout).await?;
        Ok(parse_layout(raw))
    }

    /// Fetch all four snapshots concurrently
    ///
    /// The first failure aborts the whole fetch; no partial set is returned.
    async fn fetch_all(&self) -> Result<Snapshots> {
        let (transactions, occupancy, directory, layout) = futures::try_join!(
            self.fetch_transactions(),
            self.fetch_occupancy(),
            self.fetch_user_directory(),
            self.fetch_layout(),
        )?;

        debug!(
            "Fetched from {}: {} transactions, {} slots, {} users, {} floors",
            self.name(),
            transactions.len(),
            occupancy.len(),
            directory.len(),
            layout.floors.len()
        );

        Ok(Snapshots {
            transactions,
            occupancy,
            directory,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParkstatError;
    use serde_json::json;

    struct StaticSource {
        fail: Option<SnapshotKind>,
    }

    #[async_trait]
    impl SnapshotSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_raw(&self, kind: SnapshotKind) -> Result<Value> {
            if self.fail == Some(kind) {
                return Err(ParkstatError::upstream(kind, "unreachable"));
            }
            Ok(match kind {
                SnapshotKind::Transactions => json!({"t1": {"amountPaid": 20}}),
                SnapshotKind::Occupancy => json!({"A1": {"status": "OCCUPIED"}}),
                SnapshotKind::UserDirectory => json!({"u1": {"isPWD": true}}),
                SnapshotKind::Layout => json!([{"carSlots": 3}]),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let snapshots = StaticSource { fail: None }.fetch_all().await.unwrap();
        assert_eq!(snapshots.transactions.len(), 1);
        assert_eq!(snapshots.occupancy.len(), 1);
        assert_eq!(snapshots.directory.len(), 1);
        assert_eq!(snapshots.layout.totals().car, 3);
    }

    #[tokio::test]
    async fn test_fetch_all_fails_as_a_whole() {
        for kind in SnapshotKind::ALL {
            let err = StaticSource { fail: Some(kind) }
                .fetch_all()
                .await
                .unwrap_err();
            match err {
                ParkstatError::UpstreamFetch { kind: failed, .. } => assert_eq!(failed, kind),
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
