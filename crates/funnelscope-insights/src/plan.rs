use crate::bottleneck::{Bottleneck, Severity};
use funnelscope_core::analysis::{CartAbandonment, SegmentRow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bottleneck items taken into the plan
const MAX_BOTTLENECK_ITEMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Medium,
    High,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Impact::Medium => "Medium",
            Impact::High => "High",
        })
    }
}

/// One row of the recommendations sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: String,
    pub category: String,
    pub issue: String,
    pub current_rate: String,
    pub recommendation: String,
    pub expected_impact: Impact,
}

/// Prioritized recommendations, `P1` first.
///
/// `sources` and `devices` are segment rows by traffic source and device. The
/// best source is the one with the most conversions, first row on ties.
pub fn build_action_plan(
    bottlenecks: &[Bottleneck],
    sources: &[SegmentRow],
    cart: &CartAbandonment,
    devices: &[SegmentRow],
) -> Vec<ActionItem> {
    let mut drafts: Vec<(String, String, String, String, Impact)> = Vec::new();

    for b in bottlenecks.iter().take(MAX_BOTTLENECK_ITEMS) {
        let impact = if b.severity >= Severity::High {
            Impact::High
        } else {
            Impact::Medium
        };
        drafts.push((
            "Conversion Optimization".into(),
            format!("High drop-off at {}", b.stage()),
            format!("{:.1}% drop-off", b.drop_off_rate),
            b.recommendation.clone(),
            impact,
        ));
    }

    let best = sources.iter().fold(None::<&SegmentRow>, |best, row| match best {
        Some(b) if b.conversions >= row.conversions => Some(b),
        _ => Some(row),
    });
    if let Some(best) = best {
        drafts.push((
            "Marketing Optimization".into(),
            "Maximize high-performing channels".into(),
            format!("{:.2}% CR", best.conversion_rate),
            format!(
                "Increase budget for {} (best ROI: {:.2}%)",
                best.segment, best.roi
            ),
            Impact::High,
        ));
    }

    drafts.push((
        "Cart Recovery".into(),
        "High cart abandonment".into(),
        format!("{:.1}% abandonment", cart.abandonment_rate),
        "Implement cart recovery email campaigns within 1 hour and 24 hours of abandonment"
            .into(),
        Impact::High,
    ));

    if let Some(mobile) = devices.iter().find(|d| d.segment == "Mobile") {
        drafts.push((
            "Mobile Optimization".into(),
            "Mobile conversion gap".into(),
            format!("{:.2}% mobile CR", mobile.conversion_rate),
            "Optimize mobile checkout flow, implement one-click payment options".into(),
            Impact::Medium,
        ));
    }

    drafts.push((
        "Customer Retention".into(),
        "Increase repeat purchases".into(),
        "Variable".into(),
        "Launch loyalty program, send personalized product recommendations".into(),
        Impact::Medium,
    ));

    tracing::debug!("Action plan built with {} items", drafts.len());

    drafts
        .into_iter()
        .enumerate()
        .map(
            |(i, (category, issue, current_rate, recommendation, expected_impact))| ActionItem {
                priority: format!("P{}", i + 1),
                category,
                issue,
                current_rate,
                recommendation,
                expected_impact,
            },
        )
        .collect()
}
