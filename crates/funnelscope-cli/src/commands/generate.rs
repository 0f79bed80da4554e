use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::SimulationTables;
use funnelscope_core::dataset::{DATASET_FILE, Dataset, DatasetWriter};
use funnelscope_core::simulate::{EventExpander, SessionGenerator};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a generated dataset was written
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFiles {
    pub seed: u64,
    pub sessions: usize,
    pub events: usize,
    pub dataset: PathBuf,
    pub sessions_csv: PathBuf,
    pub events_csv: PathBuf,
}

/// Load simulation tables from a JSON file, or use the built-in defaults
pub fn load_tables(path: Option<&Path>) -> Result<SimulationTables> {
    match path {
        Some(path) => {
            tracing::info!("Using simulation tables from {}", path.display());
            Ok(SimulationTables::from_file(path)?)
        }
        None => Ok(SimulationTables::default()),
    }
}

/// Generate sessions and their event log with a seeded generator
pub fn generate_dataset(
    count: usize,
    seed: u64,
    tables: &SimulationTables,
    show_progress: bool,
) -> Result<Dataset> {
    let generator = SessionGenerator::new(tables)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let bar = if show_progress {
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        bar.set_message("Generating sessions");
        bar
    } else {
        ProgressBar::hidden()
    };

    let sessions = generator.generate_with_progress(count, &mut rng, |done| {
        bar.set_position(done as u64);
    })?;
    bar.finish_and_clear();

    let events = EventExpander::new().expand(&sessions, &mut rng);

    Ok(Dataset::new(sessions, events).with_seed(seed))
}

/// Write the dataset JSON and both CSV exports into `data_dir`
pub fn save_dataset(dataset: &Dataset, data_dir: &Path) -> Result<GeneratedFiles> {
    let dataset_path = data_dir.join(DATASET_FILE);
    DatasetWriter::to_file(dataset, &dataset_path)?;
    let (sessions_csv, events_csv) = DatasetWriter::to_csv(dataset, data_dir)?;

    Ok(GeneratedFiles {
        seed: dataset.seed.unwrap_or_default(),
        sessions: dataset.sessions.len(),
        events: dataset.events.len(),
        dataset: dataset_path,
        sessions_csv,
        events_csv,
    })
}

/// Seed to use when none was supplied
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..u64::MAX))
}

pub fn execute(
    count: usize,
    seed: Option<u64>,
    tables_path: Option<&Path>,
    data_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    let seed = resolve_seed(seed);
    tracing::info!("Generating {} sessions with seed {}", count, seed);

    let tables = load_tables(tables_path)?;
    let dataset = generate_dataset(count, seed, &tables, format == OutputFormat::Pretty)?;
    let files = save_dataset(&dataset, data_dir)?;

    match format {
        OutputFormat::Json => crate::print_json(&files)?,
        OutputFormat::Table => output_table(&files),
        OutputFormat::Pretty => output_pretty(&files),
    }

    Ok(())
}

fn output_pretty(files: &GeneratedFiles) {
    use console::style;

    println!("\n{}", style("Dataset Generated").bold().cyan());
    println!("  Sessions:  {}", style(files.sessions).green());
    println!("  Events:    {}", style(files.events).green());
    println!("  Seed:      {}", files.seed);
    println!("\n{}", style("Files:").bold());
    println!("  {}", files.dataset.display());
    println!("  {}", files.sessions_csv.display());
    println!("  {}", files.events_csv.display());
    println!();
}

fn output_table(files: &GeneratedFiles) {
    println!("Metric,Value");
    println!("Sessions,{}", files.sessions);
    println!("Events,{}", files.events);
    println!("Seed,{}", files.seed);
    println!("Dataset,{}", files.dataset.display());
}
