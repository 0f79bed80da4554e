//! Static lookup tables that drive the simulation.
//!
//! A [`SimulationTables`] value is built once (either from [`Default`] or from a
//! JSON file) and handed by reference to the simulator and generator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Base conversion rate used for traffic sources missing from the table
pub const DEFAULT_BASE_RATE: f64 = 0.14;

/// Device multiplier used for devices missing from the table
pub const DEFAULT_DEVICE_MULTIPLIER: f64 = 1.0;

/// Longest accepted trailing window, roughly a century
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// A traffic source with its selection weight, base conversion rate and per-session ad cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub name: String,
    pub weight: u32,
    pub base_conversion_rate: f64,
    pub ad_spend: f64,
}

/// A device class with its selection weight and conversion multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub weight: u32,
    pub multiplier: f64,
}

/// Per-stage continuation probabilities of the funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProbabilities {
    pub view_product: f64,
    pub add_to_cart: f64,
    pub start_checkout: f64,
    /// Scales `base_rate * device_multiplier` into the purchase probability
    pub purchase_multiplier: f64,
}

impl Default for StageProbabilities {
    fn default() -> Self {
        Self {
            view_product: 0.65,
            add_to_cart: 0.54,
            start_checkout: 0.57,
            purchase_multiplier: 2.8,
        }
    }
}

/// Inclusive integer range used for duration and page-count buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: u32,
    pub max: u32,
}

impl Span {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Duration (seconds) and page-count ranges for one deepest-stage bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRange {
    pub duration_seconds: Span,
    pub pages: Span,
}

/// Engagement ranges keyed by the deepest stage a session reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementTable {
    pub bounced: EngagementRange,
    pub viewed: EngagementRange,
    pub carted: EngagementRange,
    pub checkout: EngagementRange,
    pub purchased: EngagementRange,
}

impl Default for EngagementTable {
    fn default() -> Self {
        Self {
            bounced: EngagementRange {
                duration_seconds: Span::new(5, 30),
                pages: Span::new(1, 1),
            },
            viewed: EngagementRange {
                duration_seconds: Span::new(60, 300),
                pages: Span::new(2, 5),
            },
            carted: EngagementRange {
                duration_seconds: Span::new(120, 480),
                pages: Span::new(3, 8),
            },
            checkout: EngagementRange {
                duration_seconds: Span::new(180, 600),
                pages: Span::new(4, 10),
            },
            purchased: EngagementRange {
                duration_seconds: Span::new(300, 900),
                pages: Span::new(5, 15),
            },
        }
    }
}

/// All configuration consumed by the journey simulator and session generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationTables {
    pub traffic_sources: Vec<TrafficSource>,
    pub devices: Vec<Device>,
    pub locations: Vec<String>,
    pub categories: Vec<String>,
    /// Relative weight of each hour of the day, index 0 = midnight
    pub hour_weights: Vec<u32>,
    pub stages: StageProbabilities,
    pub engagement: EngagementTable,
    /// Fraction of the session count used as the user-id pool size
    pub user_pool_ratio: f64,
    pub returning_probability: f64,
    pub window_days: u32,
    pub revenue_min: f64,
    pub revenue_max: f64,
}

impl Default for SimulationTables {
    fn default() -> Self {
        let source = |name: &str, weight, base_conversion_rate, ad_spend| TrafficSource {
            name: name.to_string(),
            weight,
            base_conversion_rate,
            ad_spend,
        };
        let device = |name: &str, weight, multiplier| Device {
            name: name.to_string(),
            weight,
            multiplier,
        };

        Self {
            traffic_sources: vec![
                source("Google Ads", 30, 0.18, 2.5),
                source("Facebook Ads", 25, 0.15, 1.8),
                source("Organic Search", 20, 0.16, 0.3),
                source("Direct", 10, 0.12, 0.0),
                source("Email Campaign", 10, 0.20, 0.5),
                source("Referral", 5, 0.14, 0.2),
            ],
            devices: vec![
                device("Desktop", 35, 1.2),
                device("Mobile", 45, 0.85),
                device("Tablet", 20, 1.0),
            ],
            locations: [
                "Mumbai",
                "Delhi",
                "Bangalore",
                "Hyderabad",
                "Chennai",
                "Kolkata",
                "Pune",
                "Ahmedabad",
                "Jaipur",
                "Lucknow",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            categories: [
                "Electronics",
                "Fashion",
                "Home & Kitchen",
                "Sports",
                "Books",
                "Beauty",
                "Toys",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hour_weights: vec![
                1, 1, 1, 1, 1, 2, 3, 4, 5, 6, 7, 8, 8, 7, 6, 5, 6, 7, 8, 7, 5, 3, 2, 1,
            ],
            stages: StageProbabilities::default(),
            engagement: EngagementTable::default(),
            user_pool_ratio: 0.7,
            returning_probability: 0.3,
            window_days: 90,
            revenue_min: 500.0,
            revenue_max: 5000.0,
        }
    }
}

impl SimulationTables {
    /// Load tables from a JSON file; missing fields take their default values
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading simulation tables from: {}", path.display());

        let file = File::open(path)?;
        let tables: SimulationTables = serde_json::from_reader(BufReader::new(file))?;
        tables.validate()?;

        tracing::info!(
            "Loaded simulation tables with {} traffic sources and {} devices",
            tables.traffic_sources.len(),
            tables.devices.len()
        );

        Ok(tables)
    }

    /// Base conversion rate for a traffic source, falling back to [`DEFAULT_BASE_RATE`]
    pub fn base_rate(&self, traffic_source: &str) -> f64 {
        self.traffic_sources
            .iter()
            .find(|s| s.name == traffic_source)
            .map_or(DEFAULT_BASE_RATE, |s| s.base_conversion_rate)
    }

    /// Conversion multiplier for a device, falling back to [`DEFAULT_DEVICE_MULTIPLIER`]
    pub fn device_multiplier(&self, device: &str) -> f64 {
        self.devices
            .iter()
            .find(|d| d.name == device)
            .map_or(DEFAULT_DEVICE_MULTIPLIER, |d| d.multiplier)
    }

    /// Per-session ad spend for a traffic source, zero when unknown
    pub fn ad_spend(&self, traffic_source: &str) -> f64 {
        self.traffic_sources
            .iter()
            .find(|s| s.name == traffic_source)
            .map_or(0.0, |s| s.ad_spend)
    }

    /// Check that every table can back a probability distribution
    pub fn validate(&self) -> Result<()> {
        fn positive_total(name: &str, weights: impl Iterator<Item = u32>) -> Result<()> {
            if weights.map(u64::from).sum::<u64>() == 0 {
                return Err(Error::InvalidTables(format!(
                    "{} weights must not all be zero",
                    name
                )));
            }
            Ok(())
        }

        fn probability(name: &str, value: f64) -> Result<()> {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidTables(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
            Ok(())
        }

        positive_total("traffic source", self.traffic_sources.iter().map(|s| s.weight))?;
        positive_total("device", self.devices.iter().map(|d| d.weight))?;

        if self.hour_weights.len() != 24 {
            return Err(Error::InvalidTables(format!(
                "expected 24 hour weights, got {}",
                self.hour_weights.len()
            )));
        }
        positive_total("hour", self.hour_weights.iter().copied())?;

        if self.locations.is_empty() {
            return Err(Error::InvalidTables("no locations configured".to_string()));
        }
        if self.categories.is_empty() {
            return Err(Error::InvalidTables("no categories configured".to_string()));
        }

        probability("view_product", self.stages.view_product)?;
        probability("add_to_cart", self.stages.add_to_cart)?;
        probability("start_checkout", self.stages.start_checkout)?;
        probability("returning_probability", self.returning_probability)?;

        if self.stages.purchase_multiplier < 0.0 {
            return Err(Error::InvalidTables(
                "purchase_multiplier must not be negative".to_string(),
            ));
        }
        if !(self.user_pool_ratio > 0.0) {
            return Err(Error::InvalidTables(
                "user_pool_ratio must be positive".to_string(),
            ));
        }
        if self.window_days > MAX_WINDOW_DAYS {
            return Err(Error::InvalidTables(format!(
                "window_days must be at most {}, got {}",
                MAX_WINDOW_DAYS, self.window_days
            )));
        }
        if !(self.revenue_min >= 0.0
            && self.revenue_max.is_finite()
            && self.revenue_min <= self.revenue_max)
        {
            return Err(Error::InvalidTables(format!(
                "revenue range [{}, {}] is invalid",
                self.revenue_min, self.revenue_max
            )));
        }

        let e = &self.engagement;
        for (name, range) in [
            ("bounced", e.bounced),
            ("viewed", e.viewed),
            ("carted", e.carted),
            ("checkout", e.checkout),
            ("purchased", e.purchased),
        ] {
            if range.duration_seconds.min > range.duration_seconds.max
                || range.pages.min > range.pages.max
            {
                return Err(Error::InvalidTables(format!(
                    "engagement range for {} has min above max",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_tables_are_valid() {
        assert!(SimulationTables::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_lookups_fall_back() {
        let tables = SimulationTables::default();
        assert_eq!(tables.base_rate("Carrier Pigeon"), DEFAULT_BASE_RATE);
        assert_eq!(tables.device_multiplier("Smart Fridge"), 1.0);
        assert_eq!(tables.ad_spend("Carrier Pigeon"), 0.0);
        assert_eq!(tables.base_rate("Email Campaign"), 0.20);
        assert_eq!(tables.device_multiplier("Mobile"), 0.85);
        assert_eq!(tables.ad_spend("Google Ads"), 2.5);
    }

    #[test]
    fn test_validate_rejects_bad_hour_weights() {
        let tables = SimulationTables {
            hour_weights: vec![1; 12],
            ..SimulationTables::default()
        };
        assert!(matches!(tables.validate(), Err(Error::InvalidTables(_))));
    }

    #[test]
    fn test_validate_rejects_probability_out_of_range() {
        let mut tables = SimulationTables::default();
        tables.stages.add_to_cart = 1.5;
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"window_days": 4000000000}}"#).unwrap();

        let result = SimulationTables::from_file(file.path());
        assert!(matches!(result, Err(Error::InvalidTables(msg)) if msg.contains("window_days")));

        let tables = SimulationTables {
            window_days: MAX_WINDOW_DAYS,
            ..SimulationTables::default()
        };
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_infinite_revenue() {
        let tables = SimulationTables {
            revenue_max: f64::INFINITY,
            ..SimulationTables::default()
        };
        assert!(matches!(tables.validate(), Err(Error::InvalidTables(_))));
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"window_days": 30, "returning_probability": 0.5}}"#).unwrap();

        let tables = SimulationTables::from_file(file.path()).unwrap();
        assert_eq!(tables.window_days, 30);
        assert_eq!(tables.returning_probability, 0.5);
        assert_eq!(tables.traffic_sources.len(), 6);
    }
}
