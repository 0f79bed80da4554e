use super::{Analyzer, percent, roi, round2};
use crate::model::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Categorical column sessions can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentDimension {
    TrafficSource,
    Device,
    Location,
    Category,
    CustomerType,
    DayOfWeek,
    Hour,
}

impl SegmentDimension {
    pub const ALL: [SegmentDimension; 7] = [
        SegmentDimension::TrafficSource,
        SegmentDimension::Device,
        SegmentDimension::Location,
        SegmentDimension::Category,
        SegmentDimension::CustomerType,
        SegmentDimension::DayOfWeek,
        SegmentDimension::Hour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentDimension::TrafficSource => "traffic_source",
            SegmentDimension::Device => "device",
            SegmentDimension::Location => "location",
            SegmentDimension::Category => "category",
            SegmentDimension::CustomerType => "customer_type",
            SegmentDimension::DayOfWeek => "day_of_week",
            SegmentDimension::Hour => "hour",
        }
    }

    /// Segment key of a session along this dimension
    pub fn key(&self, session: &Session) -> String {
        match self {
            SegmentDimension::TrafficSource => session.traffic_source.clone(),
            SegmentDimension::Device => session.device.clone(),
            SegmentDimension::Location => session.location.clone(),
            SegmentDimension::Category => session.category.clone(),
            SegmentDimension::CustomerType => {
                if session.is_returning { "Returning" } else { "New" }.to_string()
            }
            SegmentDimension::DayOfWeek => session.day_of_week().to_string(),
            SegmentDimension::Hour => format!("{:02}", session.hour()),
        }
    }
}

impl fmt::Display for SegmentDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentDimension {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| {
                crate::Error::InvalidDataset(format!(
                    "Unknown segment dimension '{}', expected one of: {}",
                    s,
                    Self::ALL.map(|d| d.as_str()).join(", ")
                ))
            })
    }
}

/// Aggregated performance of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub segment: String,
    pub sessions: usize,
    pub conversions: usize,
    pub revenue: f64,
    pub ad_spend: f64,
    pub avg_duration: f64,
    pub avg_pages: f64,
    pub bounces: usize,
    pub conversion_rate: f64,
    pub bounce_rate: f64,
    pub roi: f64,
    pub revenue_per_session: f64,
}

/// Groups sessions by a [`SegmentDimension`], highest revenue first
pub struct SegmentAnalyzer {
    dimension: SegmentDimension,
}

impl SegmentAnalyzer {
    pub fn new(dimension: SegmentDimension) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> SegmentDimension {
        self.dimension
    }
}

#[derive(Default)]
struct Totals {
    sessions: usize,
    conversions: usize,
    revenue: f64,
    ad_spend: f64,
    duration: u64,
    pages: u64,
    bounces: usize,
}

impl Analyzer for SegmentAnalyzer {
    type Output = Vec<SegmentRow>;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        tracing::debug!("Segmenting sessions by {}", self.dimension);

        let mut groups: BTreeMap<String, Totals> = BTreeMap::new();
        for session in sessions {
            let t = groups.entry(self.dimension.key(session)).or_default();
            t.sessions += 1;
            t.conversions += usize::from(session.completed_purchase);
            t.revenue += session.revenue;
            t.ad_spend += session.ad_spend;
            t.duration += u64::from(session.session_duration_seconds);
            t.pages += u64::from(session.pages_viewed);
            t.bounces += usize::from(session.bounced());
        }

        let mut rows: Vec<SegmentRow> = groups
            .into_iter()
            .map(|(segment, t)| {
                let n = t.sessions as f64;
                SegmentRow {
                    segment,
                    sessions: t.sessions,
                    conversions: t.conversions,
                    revenue: t.revenue,
                    ad_spend: t.ad_spend,
                    avg_duration: t.duration as f64 / n,
                    avg_pages: t.pages as f64 / n,
                    bounces: t.bounces,
                    conversion_rate: round2(percent(t.conversions as f64, n)),
                    bounce_rate: round2(percent(t.bounces as f64, n)),
                    roi: round2(roi(t.revenue, t.ad_spend)),
                    revenue_per_session: round2(t.revenue / n),
                }
            })
            .collect();

        // Stable sort keeps alphabetical order among equal revenue
        rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

        tracing::info!("Segment analysis complete: {} segments", rows.len());

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::session;
    use crate::model::FunnelStage;

    #[test]
    fn test_parse_dimension() {
        assert_eq!(
            "traffic-source".parse::<SegmentDimension>().unwrap(),
            SegmentDimension::TrafficSource
        );
        assert_eq!(
            "Day Of Week".parse::<SegmentDimension>().unwrap(),
            SegmentDimension::DayOfWeek
        );
        assert!("browser".parse::<SegmentDimension>().is_err());
    }

    #[test]
    fn test_segment_by_device() {
        let mut sessions = vec![
            session(1, 1, FunnelStage::Purchase),
            session(2, 2, FunnelStage::Landing),
            session(3, 3, FunnelStage::Landing),
            session(4, 4, FunnelStage::ProductView),
        ];
        sessions[2].device = "Desktop".to_string();
        sessions[3].device = "Desktop".to_string();

        let rows = SegmentAnalyzer::new(SegmentDimension::Device).analyze(&sessions);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].segment, "Mobile");
        assert_eq!(rows[0].sessions, 2);
        assert_eq!(rows[0].conversions, 1);
        assert_eq!(rows[0].conversion_rate, 50.0);
        assert_eq!(rows[0].bounce_rate, 50.0);
        assert_eq!(rows[0].revenue_per_session, 500.0);
        assert_eq!(rows[0].roi, 19900.0);

        assert_eq!(rows[1].segment, "Desktop");
        assert_eq!(rows[1].revenue, 0.0);
        assert_eq!(rows[1].bounces, 1);
    }

    #[test]
    fn test_zero_ad_spend_roi() {
        let mut s = session(1, 1, FunnelStage::Purchase);
        s.ad_spend = 0.0;
        s.is_returning = true;
        let rows = SegmentAnalyzer::new(SegmentDimension::CustomerType).analyze(&[s]);
        assert_eq!(rows[0].segment, "Returning");
        assert_eq!(rows[0].roi, 0.0);
    }
}
