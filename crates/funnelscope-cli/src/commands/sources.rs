use crate::OutputFormat;
use anyhow::Result;
use funnelscope_store::queries::{DeviceRow, SegmentPerformanceRow, TrafficSourceRow};
use serde::Serialize;
use std::path::Path;

/// Source x device pairs need more sessions than this to rank
pub const MIN_SEGMENT_SESSIONS: i64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub sources: Vec<TrafficSourceRow>,
    pub devices: Vec<DeviceRow>,
    pub top_segments: Vec<SegmentPerformanceRow>,
}

pub fn query_channels(db: &Path) -> Result<ChannelReport> {
    let store = super::open_store(db)?;
    Ok(ChannelReport {
        sources: store.traffic_source_performance()?,
        devices: store.device_performance()?,
        top_segments: store.top_converting_segments(MIN_SEGMENT_SESSIONS)?,
    })
}

pub fn execute(db: &Path, format: OutputFormat) -> Result<()> {
    let report = query_channels(db)?;

    match format {
        OutputFormat::Json => crate::print_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &ChannelReport) {
    use console::style;

    println!("\n{}", style("Traffic Source Performance").bold().cyan());
    println!("{}", style("==========================").cyan());
    println!(
        "  {:<16} {:>8} {:>11} {:>8} {:>14} {:>10}",
        "Source", "Sessions", "Conversions", "CR %", "Revenue", "ROI %"
    );
    for s in &report.sources {
        println!(
            "  {:<16} {:>8} {:>11} {:>8.2} {:>14.2} {:>10}",
            s.traffic_source,
            s.sessions,
            s.conversions,
            s.conversion_rate,
            s.total_revenue,
            s.roi_percent
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }

    println!("\n{}", style("Devices:").bold());
    for d in &report.devices {
        println!(
            "  {:<10} {:>8} sessions  {:>6.2}% CR  {:>6.1} s avg",
            d.device, d.sessions, d.conversion_rate, d.avg_duration
        );
    }

    if !report.top_segments.is_empty() {
        println!("\n{}", style("Top Converting Segments:").bold());
        for (i, seg) in report.top_segments.iter().enumerate() {
            println!(
                "  {}. {} / {}: {:.2}% ({} sessions)",
                i + 1,
                seg.traffic_source,
                seg.device,
                seg.conversion_rate,
                seg.sessions
            );
        }
    }
    println!();
}

fn output_table(report: &ChannelReport) {
    println!("Source,Sessions,Conversions,Conversion Rate,Bounce Rate,Revenue,Ad Spend,ROI,Revenue per Session");
    for s in &report.sources {
        println!(
            "{},{},{},{:.2},{:.2},{:.2},{:.2},{},{:.2}",
            s.traffic_source,
            s.sessions,
            s.conversions,
            s.conversion_rate,
            s.bounce_rate,
            s.total_revenue,
            s.total_ad_spend,
            s.roi_percent.map(|r| format!("{:.2}", r)).unwrap_or_default(),
            s.revenue_per_session
        );
    }
}
