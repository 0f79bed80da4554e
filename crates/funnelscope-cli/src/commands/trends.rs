use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::analysis::{Analyzer, TrendAnalyzer, TrendPeriod, Trends};
use std::path::Path;

pub fn execute(data_dir: &Path, period: TrendPeriod, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let trends = TrendAnalyzer::new(period).analyze(&dataset.sessions);

    match format {
        OutputFormat::Json => crate::print_json(&trends)?,
        OutputFormat::Table => output_table(&trends),
        OutputFormat::Pretty => {
            use console::style;
            println!("\n{}", style(format!("Conversion Trends ({})", period)).bold().cyan());
            output_table(&trends);
            println!();
        }
    }

    Ok(())
}

fn output_table(trends: &Trends) {
    match trends {
        Trends::Daily(rows) => {
            println!("Date,Sessions,Conversions,Revenue,Carts,Checkouts,Conversion Rate,Cart Abandonment");
            for r in rows {
                println!(
                    "{},{},{},{:.2},{},{},{:.2},{:.2}",
                    r.date,
                    r.sessions,
                    r.conversions,
                    r.revenue,
                    r.carts,
                    r.checkouts,
                    r.conversion_rate,
                    r.cart_abandonment
                );
            }
        }
        Trends::Weekly(rows) => {
            println!("Week,Sessions,Conversions,Revenue,Conversion Rate");
            for r in rows {
                println!(
                    "{},{},{},{:.2},{:.2}",
                    r.label(),
                    r.sessions,
                    r.conversions,
                    r.revenue,
                    r.conversion_rate
                );
            }
        }
    }
}
