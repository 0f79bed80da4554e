use crate::OutputFormat;
use anyhow::Result;
use std::path::Path;

/// Output locations of the full pipeline
pub struct RunPaths<'a> {
    pub data_dir: &'a Path,
    pub db: &'a Path,
    pub reports_dir: &'a Path,
}

/// Generate, load, analyze and report in one pass
pub fn execute(
    count: usize,
    seed: Option<u64>,
    tables_path: Option<&Path>,
    paths: RunPaths<'_>,
    format: OutputFormat,
) -> Result<()> {
    let seed = super::generate::resolve_seed(seed);
    let pretty = format == OutputFormat::Pretty;

    tracing::info!("Step 1/4: generating {} sessions (seed {})", count, seed);
    let tables = super::generate::load_tables(tables_path)?;
    let dataset = super::generate::generate_dataset(count, seed, &tables, pretty)?;
    let files = super::generate::save_dataset(&dataset, paths.data_dir)?;

    tracing::info!("Step 2/4: loading into {}", paths.db.display());
    let loaded = super::load::load_into_store(&dataset, paths.db)?;

    tracing::info!("Step 3/4: analyzing funnel");
    let funnel = super::funnel::analyze_funnel(&dataset.sessions);

    tracing::info!("Step 4/4: writing reports");
    let store = super::open_store(paths.db)?;
    let (data, plan) = super::report::collect(&dataset.sessions, &store)?;
    let reports = crate::report::write_reports(&data, &plan, paths.reports_dir)?;

    match format {
        OutputFormat::Json => crate::print_json(&serde_json::json!({
            "dataset": files,
            "loaded": loaded,
            "funnel": funnel,
            "reports": reports,
        }))?,
        OutputFormat::Table => {
            println!("Metric,Value");
            println!("Seed,{}", seed);
            println!("Sessions,{}", loaded.sessions);
            println!("Events,{}", loaded.events);
            println!(
                "Overall Conversion Rate (%),{:.2}",
                funnel.metrics.overall_conversion_rate
            );
            println!("Bottlenecks,{}", funnel.bottlenecks.len());
            println!("Reports,{}", paths.reports_dir.display());
        }
        OutputFormat::Pretty => {
            use console::style;
            println!(
                "{} Generated {} sessions and {} events (seed {})",
                style("✓").green(),
                files.sessions,
                files.events,
                seed
            );
            println!("{} Loaded into {}", style("✓").green(), paths.db.display());
            super::funnel::output_pretty(&funnel);
            super::report::print_files(&reports, format)?;
        }
    }

    Ok(())
}
