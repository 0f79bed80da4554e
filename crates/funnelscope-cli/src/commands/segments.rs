use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::analysis::{Analyzer, SegmentAnalyzer, SegmentDimension};
use std::path::Path;

pub fn execute(data_dir: &Path, by: SegmentDimension, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let rows = SegmentAnalyzer::new(by).analyze(&dataset.sessions);

    match format {
        OutputFormat::Json => crate::print_json(&rows)?,
        OutputFormat::Table => {
            println!(
                "{},Sessions,Conversions,Conversion Rate,Bounce Rate,Revenue,ROI,Revenue per Session",
                by
            );
            for r in &rows {
                println!(
                    "{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2}",
                    funnelscope_core::dataset::csv_field(&r.segment),
                    r.sessions,
                    r.conversions,
                    r.conversion_rate,
                    r.bounce_rate,
                    r.revenue,
                    r.roi,
                    r.revenue_per_session
                );
            }
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style(format!("Segments by {}", by)).bold().cyan());
            println!(
                "  {:<16} {:>8} {:>8} {:>8} {:>14} {:>10}",
                "Segment", "Sessions", "CR %", "Bounce %", "Revenue", "Rev/Sess"
            );
            for r in &rows {
                println!(
                    "  {:<16} {:>8} {:>8.2} {:>8.2} {:>14.2} {:>10.2}",
                    r.segment,
                    r.sessions,
                    r.conversion_rate,
                    r.bounce_rate,
                    r.revenue,
                    r.revenue_per_session
                );
            }
            println!();
        }
    }

    Ok(())
}
