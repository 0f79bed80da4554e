use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::analysis::{Analyzer, CohortAnalyzer};
use std::path::Path;

pub fn execute(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let cohorts = CohortAnalyzer.analyze(&dataset.sessions);

    match format {
        OutputFormat::Json => crate::print_json(&cohorts)?,
        OutputFormat::Table => {
            println!("Cohort Date,Users,Sessions,Conversions,Revenue,Conversion Rate,Revenue per User");
            for c in &cohorts {
                println!(
                    "{},{},{},{},{:.2},{:.2},{:.2}",
                    c.cohort_date,
                    c.users,
                    c.sessions,
                    c.conversions,
                    c.revenue,
                    c.conversion_rate,
                    c.revenue_per_user
                );
            }
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style("Cohorts by First Visit").bold().cyan());
            println!(
                "  {:<12} {:>6} {:>9} {:>8} {:>12}",
                "Cohort", "Users", "Sessions", "CR %", "Rev/User"
            );
            for c in &cohorts {
                println!(
                    "  {:<12} {:>6} {:>9} {:>8.2} {:>12.2}",
                    c.cohort_date.to_string(),
                    c.users,
                    c.sessions,
                    c.conversion_rate,
                    c.revenue_per_user
                );
            }
            println!();
        }
    }

    Ok(())
}
