use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::dataset::Dataset;
use funnelscope_store::{FunnelStore, LoadSummary};
use std::path::Path;

/// Replace the store contents with `dataset`
pub fn load_into_store(dataset: &Dataset, db: &Path) -> Result<LoadSummary> {
    let mut store = FunnelStore::open(db)?;
    Ok(store.load(dataset)?)
}

pub fn execute(data_dir: &Path, db: &Path, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let summary = load_into_store(&dataset, db)?;

    match format {
        OutputFormat::Json => crate::print_json(&summary)?,
        OutputFormat::Table => {
            println!("Table,Rows");
            println!("sessions,{}", summary.sessions);
            println!("events,{}", summary.events);
        }
        OutputFormat::Pretty => {
            use console::style;
            println!(
                "{} Loaded {} sessions and {} events into {}",
                style("✓").green(),
                summary.sessions,
                summary.events,
                db.display()
            );
        }
    }

    Ok(())
}
