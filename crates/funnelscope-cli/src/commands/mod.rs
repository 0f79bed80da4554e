pub mod abandonment;
pub mod cohorts;
pub mod completion;
pub mod funnel;
pub mod generate;
pub mod lifetime;
pub mod load;
pub mod metrics;
pub mod report;
pub mod run;
pub mod segments;
pub mod sources;
pub mod tables;
pub mod trends;

use anyhow::{Context, Result};
use funnelscope_core::dataset::{DATASET_FILE, Dataset, DatasetReader};
use funnelscope_store::FunnelStore;
use std::path::Path;

/// Read and validate `dataset.json` from a data directory
pub fn read_dataset(data_dir: &Path) -> Result<Dataset> {
    let path = data_dir.join(DATASET_FILE);
    let dataset = DatasetReader::from_file(&path).with_context(|| {
        format!(
            "Could not read dataset at {} (run `funnelscope generate` first)",
            path.display()
        )
    })?;
    DatasetReader::validate(&dataset)?;
    Ok(dataset)
}

/// Open an existing store, refusing to create an empty one
pub fn open_store(db: &Path) -> Result<FunnelStore> {
    if !db.exists() {
        anyhow::bail!(
            "Database {} does not exist (run `funnelscope load` first)",
            db.display()
        );
    }
    Ok(FunnelStore::open(db)?)
}
