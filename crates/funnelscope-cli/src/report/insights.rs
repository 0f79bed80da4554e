use chrono::NaiveDateTime;
use funnelscope_core::analysis::{CustomerLifetime, PeakTimes};
use funnelscope_insights::{ActionItem, Bottleneck};
use funnelscope_store::queries::{
    CartAbandonmentRow, FunnelStageRow, OverallMetrics, TrafficSourceRow,
};

/// Everything the insights document draws on
#[derive(Debug, Clone)]
pub struct InsightsData {
    pub generated_at: NaiveDateTime,
    pub overall: OverallMetrics,
    pub funnel: Vec<FunnelStageRow>,
    pub sources: Vec<TrafficSourceRow>,
    pub cart: CartAbandonmentRow,
    pub bottlenecks: Vec<Bottleneck>,
    pub peak_times: PeakTimes,
    pub lifetime: CustomerLifetime,
}

/// Render the markdown business insights document
pub fn render_insights(data: &InsightsData, plan: &[ActionItem]) -> String {
    let o = &data.overall;
    let mut out = String::new();

    out.push_str("# E-Commerce Funnel Analysis - Business Insights\n");
    out.push_str("## Executive Summary Report\n");
    out.push_str(&format!(
        "**Generated:** {}\n\n---\n\n",
        data.generated_at.format("%B %d, %Y at %I:%M %p")
    ));

    out.push_str("## Key Performance Indicators\n\n");
    out.push_str("| Metric | Value |\n|--------|-------|\n");
    out.push_str(&format!("| **Total Sessions** | {} |\n", thousands(o.total_sessions)));
    out.push_str(&format!("| **Unique Users** | {} |\n", thousands(o.unique_users)));
    out.push_str(&format!("| **Conversions** | {} |\n", thousands(o.conversions)));
    out.push_str(&format!("| **Conversion Rate** | {:.2}% |\n", o.conversion_rate));
    out.push_str(&format!("| **Bounce Rate** | {:.2}% |\n", o.bounce_rate));
    out.push_str(&format!("| **Total Revenue** | ₹{:.2} |\n", o.total_revenue));
    out.push_str(&format!("| **ROI** | {} |\n\n---\n\n", percent_or_na(o.overall_roi)));

    out.push_str("## Conversion Funnel Analysis\n\n### Funnel Performance\n");
    for row in &data.funnel {
        out.push_str(&format!(
            "- **{}**: {} users ({:.2}%)\n",
            row.stage,
            thousands(row.users),
            row.percentage
        ));
        if row.drop_off > 0.0 {
            out.push_str(&format!("  - Drop-off: {:.2}%\n", row.drop_off));
        }
    }
    out.push_str(&format!(
        "\n### Overall Conversion Rate: {:.2}%\n\n---\n\n",
        o.conversion_rate
    ));

    out.push_str("## Critical Bottlenecks Identified\n\n");
    if data.bottlenecks.is_empty() {
        out.push_str("No stage transition is below its alert threshold.\n\n");
    }
    for (i, b) in data.bottlenecks.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n", i + 1, b.stage()));
        out.push_str(&format!("- **Drop-off Rate:** {:.1}%\n", b.drop_off_rate));
        out.push_str(&format!("- **Severity:** {}\n", b.severity.as_str()));
        out.push_str(&format!("- **Recommendation:** {}\n\n", b.recommendation));
    }
    out.push_str("---\n\n");

    out.push_str("## Traffic Source Performance\n\n");
    out.push_str("| Source | Sessions | Conversion Rate | ROI | Revenue |\n");
    out.push_str("|--------|----------|-----------------|-----|---------|\n");
    for s in &data.sources {
        out.push_str(&format!(
            "| {} | {} | {:.2}% | {} | ₹{:.2} |\n",
            s.traffic_source,
            thousands(s.sessions),
            s.conversion_rate,
            percent_or_na(s.roi_percent),
            s.total_revenue
        ));
    }
    out.push_str("\n---\n\n");

    let c = &data.cart;
    out.push_str("## Cart Abandonment\n\n");
    out.push_str(&format!("- Carts created: {}\n", thousands(c.carts_created)));
    out.push_str(&format!("- Abandoned: {}\n", thousands(c.carts_abandoned)));
    out.push_str(&format!("- Purchased: {}\n", thousands(c.carts_purchased)));
    out.push_str(&format!("- Abandonment rate: {:.2}%\n\n---\n\n", c.abandonment_rate));

    let p = &data.peak_times;
    out.push_str("## Peak Performance Times\n\n");
    out.push_str(&format!("- Peak traffic hour: {}\n", hour_or_na(p.peak_traffic_hour)));
    out.push_str(&format!(
        "- Peak conversion hour: {}\n",
        hour_or_na(p.peak_conversion_hour)
    ));
    out.push_str(&format!(
        "- Peak revenue hour: {}\n\n---\n\n",
        hour_or_na(p.peak_revenue_hour)
    ));

    let l = &data.lifetime;
    out.push_str("## Customer Lifetime\n\n");
    out.push_str(&format!("- Avg sessions per user: {:.2}\n", l.avg_sessions_per_user));
    out.push_str(&format!("- Avg revenue per user: ₹{:.2}\n", l.avg_revenue_per_user));
    out.push_str(&format!(
        "- Repeat buyers: {} of {} users\n",
        l.segments.repeat_buyers, l.users
    ));
    out.push_str(&format!("- Estimated annual CLV: ₹{:.2}\n\n---\n\n", l.estimated_clv));

    out.push_str("## Strategic Recommendations\n\n");
    out.push_str("| Priority | Category | Issue | Current | Recommendation | Impact |\n");
    out.push_str("|----------|----------|-------|---------|----------------|--------|\n");
    for item in plan {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            item.priority,
            item.category,
            item.issue,
            item.current_rate,
            item.recommendation,
            item.expected_impact
        ));
    }

    out.push_str("\n---\n\n");
    out.push_str(&format!(
        "*This analysis is based on {} sessions.*\n",
        thousands(o.total_sessions)
    ));

    out
}

fn percent_or_na(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn hour_or_na(hour: Option<u32>) -> String {
    hour.map(|h| format!("{:02}:00", h))
        .unwrap_or_else(|| "n/a".to_string())
}

/// `15000` -> `15,000`
fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
