use crate::OutputFormat;
use anyhow::Result;
use funnelscope_store::queries::{OverallMetrics, RevenueMetrics};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub overall: OverallMetrics,
    pub revenue: RevenueMetrics,
}

pub fn query_metrics(db: &Path) -> Result<MetricsReport> {
    let store = super::open_store(db)?;
    Ok(MetricsReport {
        overall: store.overall_metrics()?,
        revenue: store.revenue_metrics()?,
    })
}

pub fn execute(db: &Path, format: OutputFormat) -> Result<()> {
    let report = query_metrics(db)?;

    match format {
        OutputFormat::Json => crate::print_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn roi_text(roi: Option<f64>) -> String {
    roi.map(|r| format!("{:.2}%", r))
        .unwrap_or_else(|| "n/a".to_string())
}

fn output_pretty(report: &MetricsReport) {
    use console::style;

    let o = &report.overall;
    let r = &report.revenue;

    println!("\n{}", style("Key Performance Indicators").bold().cyan());
    println!("{}", style("==========================").cyan());
    println!("  Total Sessions:       {}", o.total_sessions);
    println!("  Unique Users:         {}", o.unique_users);
    println!("  Conversions:          {}", o.conversions);
    println!(
        "  Conversion Rate:      {}",
        style(format!("{:.2}%", o.conversion_rate)).green()
    );
    println!("  Bounce Rate:          {:.2}%", o.bounce_rate);
    println!("  Avg Session Duration: {:.2} s", o.avg_session_duration);
    println!("  Avg Pages/Session:    {:.2}", o.avg_pages_per_session);
    println!("  Total Revenue:        ₹{:.2}", o.total_revenue);
    println!("  Total Ad Spend:       ₹{:.2}", o.total_ad_spend);
    println!("  ROI:                  {}", roi_text(o.overall_roi));

    println!("\n{}", style("Revenue:").bold());
    println!("  Orders:               {}", r.total_orders);
    if let Some(aov) = r.avg_order_value {
        println!("  Avg Order Value:      ₹{:.2}", aov);
    }
    if let (Some(min), Some(max)) = (r.min_order_value, r.max_order_value) {
        println!("  Order Value Range:    ₹{:.2} - ₹{:.2}", min, max);
    }
    println!("  Revenue/Session:      ₹{:.2}", r.revenue_per_session);
    println!("  Revenue/User:         ₹{:.2}", r.revenue_per_user);
    println!();
}

fn output_table(report: &MetricsReport) {
    let o = &report.overall;
    println!("Metric,Value");
    println!("Total Sessions,{}", o.total_sessions);
    println!("Unique Users,{}", o.unique_users);
    println!("Conversions,{}", o.conversions);
    println!("Conversion Rate (%),{:.2}", o.conversion_rate);
    println!("Bounce Rate (%),{:.2}", o.bounce_rate);
    println!("Total Revenue,{:.2}", o.total_revenue);
    println!("Total Ad Spend,{:.2}", o.total_ad_spend);
    println!("ROI (%),{}", o.overall_roi.map(|r| format!("{:.2}", r)).unwrap_or_default());
    println!("Orders,{}", report.revenue.total_orders);
}
