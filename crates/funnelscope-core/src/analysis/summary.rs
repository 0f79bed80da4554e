use super::{Analyzer, percent, roi};
use crate::model::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Headline KPIs of a session collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_sessions: usize,
    pub unique_users: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub bounce_rate: f64,
    pub avg_session_duration: f64,
    pub avg_pages_per_session: f64,
    pub total_revenue: f64,
    pub total_ad_spend: f64,
    pub overall_roi: f64,
    pub date_range: Option<(String, String)>,
}

pub struct SummaryAnalyzer;

impl Analyzer for SummaryAnalyzer {
    type Output = OverallSummary;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        tracing::debug!("Computing overall summary");

        let total = sessions.len();
        if total == 0 {
            return OverallSummary::default();
        }

        let users: HashSet<u64> = sessions.iter().map(|s| s.user_id).collect();
        let conversions = sessions.iter().filter(|s| s.completed_purchase).count();
        let bounces = sessions.iter().filter(|s| s.bounced()).count();
        let total_duration: u64 = sessions
            .iter()
            .map(|s| u64::from(s.session_duration_seconds))
            .sum();
        let total_pages: u64 = sessions.iter().map(|s| u64::from(s.pages_viewed)).sum();
        let total_revenue: f64 = sessions.iter().map(|s| s.revenue).sum();
        let total_ad_spend: f64 = sessions.iter().map(|s| s.ad_spend).sum();

        let first = sessions.iter().map(|s| s.timestamp).min();
        let last = sessions.iter().map(|s| s.timestamp).max();
        let date_range = first.zip(last).map(|(f, l)| (f.to_string(), l.to_string()));

        tracing::info!(
            "Summary complete: {} sessions, {} unique users",
            total,
            users.len()
        );

        OverallSummary {
            total_sessions: total,
            unique_users: users.len(),
            conversions,
            conversion_rate: percent(conversions as f64, total as f64),
            bounce_rate: percent(bounces as f64, total as f64),
            avg_session_duration: total_duration as f64 / total as f64,
            avg_pages_per_session: total_pages as f64 / total as f64,
            total_revenue,
            total_ad_spend,
            overall_roi: roi(total_revenue, total_ad_spend),
            date_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::session;
    use crate::model::FunnelStage;

    #[test]
    fn test_summary_figures() {
        let sessions = vec![
            session(1, 1, FunnelStage::Landing),
            session(2, 1, FunnelStage::Purchase),
            session(3, 2, FunnelStage::AddToCart),
            session(4, 3, FunnelStage::Landing),
        ];
        let summary = SummaryAnalyzer.analyze(&sessions);

        assert_eq!(summary.total_sessions, 4);
        assert_eq!(summary.unique_users, 3);
        assert_eq!(summary.conversions, 1);
        assert_eq!(summary.conversion_rate, 25.0);
        assert_eq!(summary.bounce_rate, 50.0);
        assert_eq!(summary.total_revenue, 1000.0);
        assert_eq!(summary.total_ad_spend, 10.0);
        assert_eq!(summary.overall_roi, 9900.0);
        assert_eq!(summary.avg_session_duration, 115.0);
        assert!(summary.date_range.is_some());
    }

    #[test]
    fn test_empty_summary() {
        let summary = SummaryAnalyzer.analyze(&[]);
        assert_eq!(summary, OverallSummary::default());
    }
}
