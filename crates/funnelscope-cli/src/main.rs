use anyhow::Result;
use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use funnelscope_cli::OutputFormat;
use funnelscope_cli::commands;
use funnelscope_core::analysis::{SegmentDimension, TrendPeriod};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "funnelscope")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Generate synthetic e-commerce sessions and analyze their conversion funnel",
    long_about = "Funnelscope simulates visitor journeys through a five-stage purchase funnel, \
                  stores them in SQLite, and reports on conversion, drop-off, segments and \
                  bottlenecks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Directory holding dataset.json and the CSV exports
    #[arg(long, global = true, env = "FUNNELSCOPE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// SQLite database file
    #[arg(long, global = true, env = "FUNNELSCOPE_DB", default_value = "database/ecommerce.db")]
    db: PathBuf,

    /// Directory for generated reports
    #[arg(long, global = true, env = "FUNNELSCOPE_REPORTS_DIR", default_value = "reports")]
    reports_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic session dataset
    Generate {
        /// Number of sessions
        #[arg(short = 'n', long, default_value_t = 15000)]
        count: usize,

        /// Random seed; a fresh one is drawn when omitted
        #[arg(long, env = "FUNNELSCOPE_SEED")]
        seed: Option<u64>,

        /// JSON file overriding the built-in simulation tables
        #[arg(long, value_name = "FILE")]
        tables: Option<PathBuf>,
    },

    /// Load the generated dataset into the SQLite store
    Load,

    /// Overall KPIs and revenue metrics from the store
    Metrics,

    /// Conversion funnel and bottlenecks
    Funnel,

    /// Traffic source and device performance from the store
    Sources,

    /// Cart abandonment and time to conversion
    Abandonment,

    /// Performance grouped by a session attribute
    Segments {
        /// Attribute to group by
        #[arg(long, default_value = "traffic_source", value_parser = segment_dimension_parser())]
        by: SegmentDimension,
    },

    /// Conversion trends over time
    Trends {
        /// Bucket size (daily or weekly)
        #[arg(long, default_value = "daily", value_parser = trend_period_parser())]
        period: TrendPeriod,
    },

    /// Users grouped by first visit date
    Cohorts,

    /// Customer lifetime metrics
    Lifetime,

    /// Write business insights, SQL catalog and recommendations
    Report,

    /// Run the complete pipeline: generate, load, analyze, report
    Run {
        /// Number of sessions
        #[arg(short = 'n', long, default_value_t = 15000)]
        count: usize,

        /// Random seed; a fresh one is drawn when omitted
        #[arg(long, env = "FUNNELSCOPE_SEED")]
        seed: Option<u64>,

        /// JSON file overriding the built-in simulation tables
        #[arg(long, value_name = "FILE")]
        tables: Option<PathBuf>,
    },

    /// Print the built-in simulation tables as JSON
    Tables,

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    Bash:
        funnelscope completion --shell bash > ~/.local/share/bash-completion/completions/funnelscope

    Zsh:
        funnelscope completion --shell zsh > ~/.zfunc/_funnelscope
        # Add to ~/.zshrc: fpath=(~/.zfunc $fpath)

    Fish:
        funnelscope completion --shell fish > ~/.config/fish/completions/funnelscope.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

/// Listing the names lets shell completions offer them
fn segment_dimension_parser() -> impl TypedValueParser<Value = SegmentDimension> {
    PossibleValuesParser::new(SegmentDimension::ALL.map(|d| d.as_str()))
        .try_map(|s: String| s.parse::<SegmentDimension>())
}

fn trend_period_parser() -> impl TypedValueParser<Value = TrendPeriod> {
    PossibleValuesParser::new([
        PossibleValue::new("daily").alias("day"),
        PossibleValue::new("weekly").alias("week"),
    ])
    .try_map(|s: String| s.parse::<TrendPeriod>())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let format = cli.format;
    let data_dir = cli.data_dir.as_path();
    let db = cli.db.as_path();
    let reports_dir = cli.reports_dir.as_path();

    match cli.command {
        Commands::Generate {
            count,
            seed,
            tables,
        } => commands::generate::execute(count, seed, tables.as_deref(), data_dir, format),
        Commands::Load => commands::load::execute(data_dir, db, format),
        Commands::Metrics => commands::metrics::execute(db, format),
        Commands::Funnel => commands::funnel::execute(data_dir, format),
        Commands::Sources => commands::sources::execute(db, format),
        Commands::Abandonment => commands::abandonment::execute(data_dir, format),
        Commands::Segments { by } => commands::segments::execute(data_dir, by, format),
        Commands::Trends { period } => commands::trends::execute(data_dir, period, format),
        Commands::Cohorts => commands::cohorts::execute(data_dir, format),
        Commands::Lifetime => commands::lifetime::execute(data_dir, format),
        Commands::Report => commands::report::execute(data_dir, db, reports_dir, format),
        Commands::Run {
            count,
            seed,
            tables,
        } => commands::run::execute(
            count,
            seed,
            tables.as_deref(),
            commands::run::RunPaths {
                data_dir,
                db,
                reports_dir,
            },
            format,
        ),
        Commands::Tables => commands::tables::execute(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "funnelscope=debug,funnelscope_cli=debug,funnelscope_core=debug,\
             funnelscope_insights=debug,funnelscope_store=debug",
        )
    } else {
        EnvFilter::new("funnelscope=info,funnelscope_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
