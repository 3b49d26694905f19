//! Record source collaborator: live CRM fetch and snapshot cache.
//!
//! The pipeline asks this crate for the full raw record set exactly once
//! per run. Live mode authenticates against the CRM, pulls every record
//! flagged visible-on-website, and refreshes the snapshot cache; offline
//! mode reads the snapshot instead of the network.

mod cache;
mod crm;

use std::path::Path;

use tracing::{info, instrument};

use fieldpress_shared::{AppConfig, RawRecord, Result};

pub use cache::{Snapshot, load_snapshot, store_snapshot};
pub use crm::CrmClient;

/// Fetch the raw record set, either live or from the snapshot cache.
///
/// A successful live fetch always rewrites the snapshot, so the most
/// recent live run is what offline mode replays.
#[instrument(skip(config))]
pub fn fetch_raw_records(
    config: &AppConfig,
    offline: bool,
    cache_path: &Path,
) -> Result<Vec<RawRecord>> {
    if offline {
        let snapshot = cache::load_snapshot(cache_path)?;
        info!(
            count = snapshot.records.len(),
            fetched_at = %snapshot.fetched_at,
            "loaded records from snapshot cache"
        );
        Ok(snapshot.records)
    } else {
        let client = CrmClient::login(&config.crm)?;
        let records = client.fetch_visible_records(&config.crm.object)?;
        cache::store_snapshot(cache_path, &records)?;
        info!(count = records.len(), "fetched records from CRM");
        Ok(records)
    }
}
