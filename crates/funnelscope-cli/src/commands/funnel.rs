use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::Session;
use funnelscope_core::analysis::{Analyzer, FunnelAnalyzer, FunnelMetrics, StageRow};
use funnelscope_insights::{Bottleneck, BottleneckRules, identify_bottlenecks};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct FunnelReport {
    pub metrics: FunnelMetrics,
    pub stages: Vec<StageRow>,
    pub bottlenecks: Vec<Bottleneck>,
}

/// Funnel metrics and ranked bottlenecks for a session collection
pub fn analyze_funnel(sessions: &[Session]) -> FunnelReport {
    let metrics = FunnelAnalyzer.analyze(sessions);
    let bottlenecks = identify_bottlenecks(&metrics, &BottleneckRules::default());
    FunnelReport {
        stages: metrics.stages(),
        metrics,
        bottlenecks,
    }
}

pub fn execute(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let report = analyze_funnel(&dataset.sessions);

    match format {
        OutputFormat::Json => crate::print_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

pub(crate) fn output_pretty(report: &FunnelReport) {
    use console::style;

    println!("\n{}", style("Conversion Funnel").bold().cyan());
    println!("{}", style("=================").cyan());

    for row in &report.stages {
        println!(
            "  {:<18} {:>8}  ({:>6.2}%)",
            row.stage.as_str(),
            row.count,
            row.percent_of_total
        );
        if row.drop_off > 0.0 {
            println!("  {:<18} {}", "", style(format!("drop-off {:.2}%", row.drop_off)).dim());
        }
    }

    let m = &report.metrics;
    println!("\n{}", style("Stage Conversion:").bold());
    println!("  Landing → Product:    {:.2}%", m.landing_to_product_rate);
    println!("  Product → Cart:       {:.2}%", m.product_to_cart_rate);
    println!("  Cart → Checkout:      {:.2}%", m.cart_to_checkout_rate);
    println!("  Checkout → Purchase:  {:.2}%", m.checkout_to_purchase_rate);
    println!(
        "  Overall:              {}",
        style(format!("{:.2}%", m.overall_conversion_rate)).green().bold()
    );

    println!("\n{}", style("Bottlenecks:").bold());
    if report.bottlenecks.is_empty() {
        println!("  {}", style("No bottlenecks detected").green());
    }
    for (i, b) in report.bottlenecks.iter().enumerate() {
        let severity = match b.severity {
            funnelscope_insights::Severity::Critical => style(b.severity.as_str()).red().bold(),
            funnelscope_insights::Severity::High => style(b.severity.as_str()).yellow(),
            funnelscope_insights::Severity::Medium => style(b.severity.as_str()).dim(),
        };
        println!(
            "  {}. [{}] {} ({:.1}% drop-off)",
            i + 1,
            severity,
            b.stage(),
            b.drop_off_rate
        );
        println!("     {}", style(&b.recommendation).dim());
    }
    println!();
}

fn output_table(report: &FunnelReport) {
    println!("Stage,Count,Percent of Total,Drop-off");
    for row in &report.stages {
        println!(
            "{},{},{:.2},{:.2}",
            row.stage.as_str(),
            row.count,
            row.percent_of_total,
            row.drop_off
        );
    }
}
