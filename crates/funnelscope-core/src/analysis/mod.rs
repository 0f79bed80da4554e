mod abandonment;
mod cohort;
mod conversion_time;
mod funnel;
mod lifetime;
mod segment;
mod summary;
mod timing;

pub use abandonment::{CartAbandonment, CartAbandonmentAnalyzer};
pub use cohort::{CohortAnalyzer, CohortRow};
pub use conversion_time::{TimeToConversion, TimeToConversionAnalyzer};
pub use funnel::{FunnelAnalyzer, FunnelMetrics, StageRow, Transition};
pub use lifetime::{CustomerLifetime, CustomerSegments, LifetimeAnalyzer};
pub use segment::{SegmentAnalyzer, SegmentDimension, SegmentRow};
pub use summary::{OverallSummary, SummaryAnalyzer};
pub use timing::{
    DailyTrend, HourlyRow, PeakTimes, PeakTimesAnalyzer, TrendAnalyzer, TrendPeriod, Trends,
    WeeklyTrend,
};

use crate::model::Session;
use serde::{Deserialize, Serialize};

/// Every in-memory analysis of one session collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: OverallSummary,
    pub funnel: FunnelMetrics,
    pub cart_abandonment: CartAbandonment,
    pub time_to_conversion: Option<TimeToConversion>,
    pub traffic_sources: Vec<SegmentRow>,
    pub peak_times: PeakTimes,
    pub lifetime: CustomerLifetime,
}

impl AnalysisReport {
    pub fn build(sessions: &[Session]) -> Self {
        Self {
            summary: SummaryAnalyzer.analyze(sessions),
            funnel: FunnelAnalyzer.analyze(sessions),
            cart_abandonment: CartAbandonmentAnalyzer.analyze(sessions),
            time_to_conversion: TimeToConversionAnalyzer.analyze(sessions),
            traffic_sources: SegmentAnalyzer::new(SegmentDimension::TrafficSource)
                .analyze(sessions),
            peak_times: PeakTimesAnalyzer.analyze(sessions),
            lifetime: LifetimeAnalyzer.analyze(sessions),
        }
    }
}

pub trait Analyzer {
    type Output;

    fn analyze(&self, sessions: &[Session]) -> Self::Output;
}

/// `part / whole * 100`, or zero when `whole` is zero
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

/// Return on ad spend as a percentage, zero when nothing was spent
pub fn roi(revenue: f64, ad_spend: f64) -> f64 {
    if ad_spend == 0.0 {
        0.0
    } else {
        (revenue - ad_spend) / ad_spend * 100.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Median of an already sorted slice
pub(crate) fn median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len().is_multiple_of(2) {
        let mid = sorted.len() / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{FunnelStage, Session};
    use chrono::{NaiveDate, NaiveDateTime};

    pub fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    /// A session that reached `deepest`, with revenue set when it purchased
    pub fn session(id: u64, user: u64, deepest: FunnelStage) -> Session {
        let purchased = deepest == FunnelStage::Purchase;
        Session {
            session_id: id,
            user_id: user,
            timestamp: at(1, 10),
            traffic_source: "Google Ads".to_string(),
            device: "Mobile".to_string(),
            location: "Mumbai".to_string(),
            category: "Books".to_string(),
            is_returning: false,
            landed: true,
            viewed_product: deepest >= FunnelStage::ProductView,
            added_to_cart: deepest >= FunnelStage::AddToCart,
            started_checkout: deepest >= FunnelStage::CheckoutStart,
            completed_purchase: purchased,
            session_duration_seconds: if purchased { 400 } else { 20 },
            pages_viewed: if purchased { 6 } else { 1 },
            revenue: if purchased { 1000.0 } else { 0.0 },
            ad_spend: 2.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_roi_guard_zero() {
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(percent(1.0, 4.0), 25.0);
        assert_eq!(roi(100.0, 0.0), 0.0);
        assert_eq!(roi(150.0, 50.0), 200.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[1.0, 3.0, 9.0]), 3.0);
        assert_eq!(median(&[1.0, 3.0, 5.0, 9.0]), 4.0);
    }

    #[test]
    fn test_report_on_empty_input() {
        let report = AnalysisReport::build(&[]);
        assert_eq!(report.summary.total_sessions, 0);
        assert_eq!(report.funnel.overall_conversion_rate, 0.0);
        assert!(report.time_to_conversion.is_none());
        assert!(report.traffic_sources.is_empty());
    }
}
