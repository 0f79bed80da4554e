use super::{Analyzer, median, percent};
use crate::model::Session;
use serde::{Deserialize, Serialize};

/// Session duration distribution among purchasing sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeToConversion {
    pub avg_seconds: f64,
    pub median_seconds: f64,
    pub min_seconds: u32,
    pub max_seconds: u32,
    pub under_2_min: f64,
    pub from_2_to_5_min: f64,
    pub from_5_to_10_min: f64,
    pub over_10_min: f64,
}

pub struct TimeToConversionAnalyzer;

impl Analyzer for TimeToConversionAnalyzer {
    /// `None` when no session converted
    type Output = Option<TimeToConversion>;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        let mut durations: Vec<u32> = sessions
            .iter()
            .filter(|s| s.completed_purchase)
            .map(|s| s.session_duration_seconds)
            .collect();

        if durations.is_empty() {
            tracing::debug!("No converted sessions, skipping time-to-conversion");
            return None;
        }

        durations.sort_unstable();
        let n = durations.len() as f64;
        let share = |pred: &dyn Fn(u32) -> bool| {
            percent(durations.iter().filter(|&&d| pred(d)).count() as f64, n)
        };
        let sorted: Vec<f64> = durations.iter().map(|&d| f64::from(d)).collect();

        Some(TimeToConversion {
            avg_seconds: sorted.iter().sum::<f64>() / n,
            median_seconds: median(&sorted),
            min_seconds: durations[0],
            max_seconds: durations[durations.len() - 1],
            under_2_min: share(&|d| d < 120),
            from_2_to_5_min: share(&|d| (120..300).contains(&d)),
            from_5_to_10_min: share(&|d| (300..600).contains(&d)),
            over_10_min: share(&|d| d >= 600),
        })
    }
}
