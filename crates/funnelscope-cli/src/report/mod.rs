//! Report writers.
//!
//! Rendering is pure (`render_*` returns a `String`) so it can be tested without
//! touching disk; [`write_reports`] puts the three artifacts into a directory.

mod insights;
mod recommendations;

pub use insights::{InsightsData, render_insights};
pub use recommendations::render_recommendations;

use anyhow::{Context, Result};
use funnelscope_insights::ActionItem;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const INSIGHTS_FILE: &str = "business_insights.md";
pub const QUERIES_FILE: &str = "analytical_queries.sql";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.csv";

#[derive(Debug, Clone, Serialize)]
pub struct ReportFiles {
    pub insights: PathBuf,
    pub queries: PathBuf,
    pub recommendations: PathBuf,
}

/// Write the insights document, SQL catalog and recommendations sheet
pub fn write_reports(
    data: &InsightsData,
    plan: &[ActionItem],
    reports_dir: &Path,
) -> Result<ReportFiles> {
    fs::create_dir_all(reports_dir)
        .with_context(|| format!("Failed to create {}", reports_dir.display()))?;

    let files = ReportFiles {
        insights: reports_dir.join(INSIGHTS_FILE),
        queries: reports_dir.join(QUERIES_FILE),
        recommendations: reports_dir.join(RECOMMENDATIONS_FILE),
    };

    write_file(&files.insights, &render_insights(data, plan))?;
    write_file(&files.queries, &funnelscope_store::render_catalog())?;
    write_file(&files.recommendations, &render_recommendations(plan))?;

    tracing::info!("Reports written to {}", reports_dir.display());
    Ok(files)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}
