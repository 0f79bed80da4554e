use super::{Analyzer, percent, round2};
use crate::model::Session;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRow {
    pub hour: u32,
    pub sessions: usize,
    pub conversions: usize,
    pub revenue: f64,
    pub conversion_rate: f64,
}

/// Busiest hours of the day. Peaks are `None` for an empty collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakTimes {
    pub peak_traffic_hour: Option<u32>,
    pub peak_conversion_hour: Option<u32>,
    pub peak_revenue_hour: Option<u32>,
    /// Only hours that saw at least one session, ascending
    pub hourly: Vec<HourlyRow>,
}

pub struct PeakTimesAnalyzer;

impl Analyzer for PeakTimesAnalyzer {
    type Output = PeakTimes;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        tracing::debug!("Computing hourly performance");

        let mut buckets: BTreeMap<u32, (usize, usize, f64)> = BTreeMap::new();
        for session in sessions {
            let b = buckets.entry(session.hour()).or_default();
            b.0 += 1;
            b.1 += usize::from(session.completed_purchase);
            b.2 += session.revenue;
        }

        let hourly: Vec<HourlyRow> = buckets
            .into_iter()
            .map(|(hour, (sessions, conversions, revenue))| HourlyRow {
                hour,
                sessions,
                conversions,
                revenue,
                conversion_rate: round2(percent(conversions as f64, sessions as f64)),
            })
            .collect();

        PeakTimes {
            peak_traffic_hour: earliest_max(&hourly, |r| r.sessions as f64),
            peak_conversion_hour: earliest_max(&hourly, |r| r.conversion_rate),
            peak_revenue_hour: earliest_max(&hourly, |r| r.revenue),
            hourly,
        }
    }
}

/// Hour with the largest value; ties go to the earliest hour
fn earliest_max<F>(rows: &[HourlyRow], value: F) -> Option<u32>
where
    F: Fn(&HourlyRow) -> f64,
{
    let mut best: Option<(&HourlyRow, f64)> = None;
    for row in rows {
        let v = value(row);
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((row, v)),
        }
    }
    best.map(|(row, _)| row.hour)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPeriod {
    Daily,
    Weekly,
}

impl TrendPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Daily => "daily",
            TrendPeriod::Weekly => "weekly",
        }
    }
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendPeriod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(TrendPeriod::Daily),
            "weekly" | "week" => Ok(TrendPeriod::Weekly),
            other => Err(crate::Error::InvalidDataset(format!(
                "Unknown trend period '{}', expected daily or weekly",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub sessions: usize,
    pub conversions: usize,
    pub revenue: f64,
    pub carts: usize,
    pub checkouts: usize,
    pub conversion_rate: f64,
    /// Carts not converted the same day, zero on days without carts
    pub cart_abandonment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub iso_year: i32,
    pub iso_week: u32,
    pub sessions: usize,
    pub conversions: usize,
    pub revenue: f64,
    pub conversion_rate: f64,
}

impl WeeklyTrend {
    pub fn label(&self) -> String {
        format!("{}-W{:02}", self.iso_year, self.iso_week)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "period", content = "rows", rename_all = "snake_case")]
pub enum Trends {
    Daily(Vec<DailyTrend>),
    Weekly(Vec<WeeklyTrend>),
}

impl Trends {
    pub fn len(&self) -> usize {
        match self {
            Trends::Daily(rows) => rows.len(),
            Trends::Weekly(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Conversion over calendar days or ISO weeks
pub struct TrendAnalyzer {
    period: TrendPeriod,
}

impl TrendAnalyzer {
    pub fn new(period: TrendPeriod) -> Self {
        Self { period }
    }
}

#[derive(Default)]
struct Bucket {
    sessions: usize,
    conversions: usize,
    revenue: f64,
    carts: usize,
    checkouts: usize,
}

impl Bucket {
    fn add(&mut self, session: &Session) {
        self.sessions += 1;
        self.conversions += usize::from(session.completed_purchase);
        self.revenue += session.revenue;
        self.carts += usize::from(session.added_to_cart);
        self.checkouts += usize::from(session.started_checkout);
    }

    fn conversion_rate(&self) -> f64 {
        round2(percent(self.conversions as f64, self.sessions as f64))
    }
}

impl Analyzer for TrendAnalyzer {
    type Output = Trends;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        tracing::debug!("Computing {} conversion trends", self.period);

        match self.period {
            TrendPeriod::Daily => {
                let mut days: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
                for session in sessions {
                    days.entry(session.date()).or_default().add(session);
                }
                Trends::Daily(
                    days.into_iter()
                        .map(|(date, b)| DailyTrend {
                            date,
                            sessions: b.sessions,
                            conversions: b.conversions,
                            revenue: b.revenue,
                            carts: b.carts,
                            checkouts: b.checkouts,
                            conversion_rate: b.conversion_rate(),
                            cart_abandonment: round2(percent(
                                b.carts.saturating_sub(b.conversions) as f64,
                                b.carts as f64,
                            )),
                        })
                        .collect(),
                )
            }
            TrendPeriod::Weekly => {
                let mut weeks: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();
                for session in sessions {
                    let week = session.date().iso_week();
                    weeks
                        .entry((week.year(), week.week()))
                        .or_default()
                        .add(session);
                }
                Trends::Weekly(
                    weeks
                        .into_iter()
                        .map(|((iso_year, iso_week), b)| WeeklyTrend {
                            iso_year,
                            iso_week,
                            sessions: b.sessions,
                            conversions: b.conversions,
                            revenue: b.revenue,
                            conversion_rate: b.conversion_rate(),
                        })
                        .collect(),
                )
            }
        }
    }
}
