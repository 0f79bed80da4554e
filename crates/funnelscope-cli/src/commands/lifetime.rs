use crate::OutputFormat;
use anyhow::Result;
use funnelscope_core::analysis::{Analyzer, LifetimeAnalyzer};
use std::path::Path;

pub fn execute(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let dataset = super::read_dataset(data_dir)?;
    let lifetime = LifetimeAnalyzer.analyze(&dataset.sessions);

    match format {
        OutputFormat::Json => crate::print_json(&lifetime)?,
        OutputFormat::Table => {
            println!("Metric,Value");
            println!("Users,{}", lifetime.users);
            println!("Avg Sessions per User,{:.2}", lifetime.avg_sessions_per_user);
            println!("Avg Purchases per User,{:.2}", lifetime.avg_purchases_per_user);
            println!("Avg Revenue per User,{:.2}", lifetime.avg_revenue_per_user);
            println!("Avg Days Active,{:.2}", lifetime.avg_days_active);
            println!("One-time Buyers,{}", lifetime.segments.one_time_buyers);
            println!("Repeat Buyers,{}", lifetime.segments.repeat_buyers);
            println!("High-value Customers,{}", lifetime.segments.high_value_customers);
            println!("Estimated CLV,{:.2}", lifetime.estimated_clv);
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style("Customer Lifetime").bold().cyan());
            println!("{}", style("=================").cyan());
            println!("  Users:                  {}", lifetime.users);
            println!("  Avg Sessions per User:  {:.2}", lifetime.avg_sessions_per_user);
            println!("  Avg Purchases per User: {:.2}", lifetime.avg_purchases_per_user);
            println!("  Avg Revenue per User:   ₹{:.2}", lifetime.avg_revenue_per_user);
            println!("  Avg Days Active:        {:.2}", lifetime.avg_days_active);
            println!(
                "  Estimated CLV:          {}",
                style(format!("₹{:.2}", lifetime.estimated_clv)).green()
            );
            println!("\n{}", style("Customer Segments:").bold());
            println!("  One-time Buyers:      {}", lifetime.segments.one_time_buyers);
            println!("  Repeat Buyers:        {}", lifetime.segments.repeat_buyers);
            println!("  High-value Customers: {}", lifetime.segments.high_value_customers);
            println!();
        }
    }

    Ok(())
}
