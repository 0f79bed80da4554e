use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::analysis::{
    Analyzer, CartAbandonment, CartAbandonmentAnalyzer, TimeToConversion,
    TimeToConversionAnalyzer,
};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct AbandonmentReport {
    pub cart: CartAbandonment,
    pub time_to_conversion: Option<TimeToConversion>,
}

pub fn execute(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let report = AbandonmentReport {
        cart: CartAbandonmentAnalyzer.analyze(&dataset.sessions),
        time_to_conversion: TimeToConversionAnalyzer.analyze(&dataset.sessions),
    };

    match format {
        OutputFormat::Json => crate::print_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &AbandonmentReport) {
    use console::style;

    let cart = &report.cart;
    println!("\n{}", style("Cart Abandonment").bold().cyan());
    println!("{}", style("================").cyan());
    println!("  Carts Created:    {}", cart.total_carts);
    println!("  Abandoned:        {}", style(cart.abandoned_carts).red());
    println!("  Completed:        {}", style(cart.completed_carts).green());
    println!("  Abandonment Rate: {:.2}%", cart.abandonment_rate);

    println!("\n{}", style("Abandoned by Source:").bold());
    for (source, count) in &cart.by_source {
        println!("  {:<16} {}", source, count);
    }
    println!("\n{}", style("Abandoned by Device:").bold());
    for (device, count) in &cart.by_device {
        println!("  {:<16} {}", device, count);
    }

    println!("\n{}", style("Time to Conversion:").bold());
    match &report.time_to_conversion {
        Some(t) => {
            println!("  Average:  {:.1} s", t.avg_seconds);
            println!("  Median:   {:.1} s", t.median_seconds);
            println!("  Range:    {} - {} s", t.min_seconds, t.max_seconds);
            println!("  < 2 min:  {:.1}%", t.under_2_min);
            println!("  2-5 min:  {:.1}%", t.from_2_to_5_min);
            println!("  5-10 min: {:.1}%", t.from_5_to_10_min);
            println!("  > 10 min: {:.1}%", t.over_10_min);
        }
        None => println!("  {}", style("No conversions").dim()),
    }
    println!();
}

fn output_table(report: &AbandonmentReport) {
    println!("Metric,Value");
    println!("Carts Created,{}", report.cart.total_carts);
    println!("Abandoned Carts,{}", report.cart.abandoned_carts);
    println!("Completed Carts,{}", report.cart.completed_carts);
    println!("Abandonment Rate (%),{:.2}", report.cart.abandonment_rate);
    for (source, count) in &report.cart.by_source {
        println!("Abandoned via {},{}", source, count);
    }
}
