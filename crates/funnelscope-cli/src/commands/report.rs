use crate::OutputFormat;
use crate::report::{InsightsData, ReportFiles, write_reports};
use anyhow::Result;
use funnelscope_core::Session;
use funnelscope_core::analysis::{AnalysisReport, Analyzer, SegmentAnalyzer, SegmentDimension};
use funnelscope_insights::{ActionItem, BottleneckRules, build_action_plan, identify_bottlenecks};
use funnelscope_store::FunnelStore;
use std::path::Path;

/// Gather store aggregates and in-memory analyses into report inputs
pub fn collect(
    sessions: &[Session],
    store: &FunnelStore,
) -> Result<(InsightsData, Vec<ActionItem>)> {
    let analysis = AnalysisReport::build(sessions);
    let bottlenecks = identify_bottlenecks(&analysis.funnel, &BottleneckRules::default());
    let devices = SegmentAnalyzer::new(SegmentDimension::Device).analyze(sessions);
    let plan = build_action_plan(
        &bottlenecks,
        &analysis.traffic_sources,
        &analysis.cart_abandonment,
        &devices,
    );

    let data = InsightsData {
        generated_at: chrono::Local::now().naive_local(),
        overall: store.overall_metrics()?,
        funnel: store.conversion_funnel()?,
        sources: store.traffic_source_performance()?,
        cart: store.cart_abandonment()?,
        bottlenecks,
        peak_times: analysis.peak_times,
        lifetime: analysis.lifetime,
    };

    Ok((data, plan))
}

/// Write all reports for the dataset in `data_dir` and the store at `db`
pub fn generate_reports(data_dir: &Path, db: &Path, reports_dir: &Path) -> Result<ReportFiles> {
    let dataset = super::read_dataset(data_dir)?;
    let store = super::open_store(db)?;
    let (data, plan) = collect(&dataset.sessions, &store)?;
    write_reports(&data, &plan, reports_dir)
}

pub fn execute(data_dir: &Path, db: &Path, reports_dir: &Path, format: OutputFormat) -> Result<()> {
    let files = generate_reports(data_dir, db, reports_dir)?;
    print_files(&files, format)
}

pub(crate) fn print_files(files: &ReportFiles, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => crate::print_json(files)?,
        OutputFormat::Table => {
            println!("Report,Path");
            println!("insights,{}", files.insights.display());
            println!("queries,{}", files.queries.display());
            println!("recommendations,{}", files.recommendations.display());
        }
        OutputFormat::Pretty => {
            use console::style;
            println!("\n{}", style("Reports Written").bold().cyan());
            for path in [&files.insights, &files.queries, &files.recommendations] {
                println!("  {} {}", style("✓").green(), path.display());
            }
            println!();
        }
    }
    Ok(())
}
