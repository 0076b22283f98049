use bookkeeper_directory::directory::seed::SeedReaders;
use bookkeeper_directory::directory::{DirectorySeed, DirectorySnapshot, SeedError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the CSV export in `seed_dir`, or the bundled sample when none is configured.
pub(crate) fn load_snapshot(seed_dir: Option<&Path>) -> Result<DirectorySnapshot, SeedError> {
    match seed_dir {
        Some(dir) => DirectorySeed::from_dir(dir)?.into_snapshot(),
        None => {
            info!("no seed directory configured, using bundled sample directory");
            sample_snapshot()
        }
    }
}

/// A small directory spanning all three entities of Bosnia and Herzegovina.
pub(crate) fn sample_snapshot() -> Result<DirectorySnapshot, SeedError> {
    let readers = SeedReaders {
        entities: Cursor::new(include_str!("../seed/entities.csv")),
        cantons: Cursor::new(include_str!("../seed/cantons.csv")),
        cities: Cursor::new(include_str!("../seed/cities.csv")),
        categories: Cursor::new(include_str!("../seed/service_categories.csv")),
        profiles: Cursor::new(include_str!("../seed/profiles.csv")),
        memberships: Cursor::new(include_str!("../seed/profile_services.csv")),
    };
    DirectorySeed::from_readers(readers)?.into_snapshot()
}
