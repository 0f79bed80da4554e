use super::JourneySimulator;
use crate::model::Session;
use crate::tables::SimulationTables;
use crate::{Error, Result};
use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Number of sessions generated when the caller does not ask for a specific count
pub const DEFAULT_SESSION_COUNT: usize = 15_000;

const PROGRESS_INTERVAL: usize = 1_000;

/// Builds a batch of sessions by sampling attributes and simulating each journey
pub struct SessionGenerator<'a> {
    tables: &'a SimulationTables,
    simulator: JourneySimulator<'a>,
    sources: WeightedIndex<u32>,
    devices: WeightedIndex<u32>,
    hours: WeightedIndex<u32>,
    window_end: NaiveDateTime,
}

impl<'a> SessionGenerator<'a> {
    /// Create a generator whose trailing window ends now
    pub fn new(tables: &'a SimulationTables) -> Result<Self> {
        tables.validate()?;

        let weights = |name: &str, w: Vec<u32>| {
            WeightedIndex::new(w).map_err(|e| Error::InvalidTables(format!("{}: {}", name, e)))
        };

        Ok(Self {
            tables,
            simulator: JourneySimulator::new(tables)?,
            sources: weights(
                "traffic sources",
                tables.traffic_sources.iter().map(|s| s.weight).collect(),
            )?,
            devices: weights("devices", tables.devices.iter().map(|d| d.weight).collect())?,
            hours: weights("hours", tables.hour_weights.clone())?,
            window_end: Utc::now().naive_utc(),
        })
    }

    /// Pin the end of the trailing window, making timestamps reproducible under a seeded rng
    pub fn with_window_end(mut self, window_end: NaiveDateTime) -> Self {
        self.window_end = window_end;
        self
    }

    pub fn window_end(&self) -> NaiveDateTime {
        self.window_end
    }

    /// Size of the user-id pool for a batch of `count` sessions
    pub fn user_pool_size(&self, count: usize) -> u64 {
        ((count as f64 * self.tables.user_pool_ratio).floor() as u64).max(1)
    }

    /// Generate `count` sessions sorted by timestamp
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<Session>> {
        self.generate_with_progress(count, rng, |_| {})
    }

    /// Like [`generate`](Self::generate), calling `on_progress` with the number of
    /// sessions produced so far every thousand sessions
    pub fn generate_with_progress<R, F>(
        &self,
        count: usize,
        rng: &mut R,
        mut on_progress: F,
    ) -> Result<Vec<Session>>
    where
        R: Rng + ?Sized,
        F: FnMut(usize),
    {
        if count == 0 {
            return Err(Error::InvalidCount(count));
        }

        tracing::debug!("Generating {} e-commerce sessions", count);

        let pool = self.user_pool_size(count);
        let mut sessions = Vec::with_capacity(count);

        for i in 0..count {
            sessions.push(self.generate_one(i, pool, rng));

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                on_progress(i + 1);
            }
        }

        sessions.sort_by_key(|s| s.timestamp);

        tracing::info!(
            "Generated {} sessions from a pool of {} users",
            sessions.len(),
            pool
        );

        Ok(sessions)
    }

    fn generate_one<R: Rng + ?Sized>(&self, index: usize, pool: u64, rng: &mut R) -> Session {
        let user_id = rng.gen_range(1..=pool);
        let timestamp = self.draw_timestamp(rng);

        let source = &self.tables.traffic_sources[self.sources.sample(rng)];
        let device = &self.tables.devices[self.devices.sample(rng)];
        let location = &self.tables.locations[rng.gen_range(0..self.tables.locations.len())];
        let category = &self.tables.categories[rng.gen_range(0..self.tables.categories.len())];

        let journey = self.simulator.simulate(rng, &source.name, &device.name);
        let is_returning = rng.gen_bool(self.tables.returning_probability);

        Session {
            session_id: index as u64 + 1,
            user_id,
            timestamp,
            traffic_source: source.name.clone(),
            device: device.name.clone(),
            location: location.clone(),
            category: category.clone(),
            is_returning,
            landed: journey.landed,
            viewed_product: journey.viewed_product,
            added_to_cart: journey.added_to_cart,
            started_checkout: journey.started_checkout,
            completed_purchase: journey.completed_purchase,
            session_duration_seconds: journey.session_duration_seconds,
            pages_viewed: journey.pages_viewed,
            revenue: journey.revenue,
            ad_spend: self.tables.ad_spend(&source.name),
        }
    }

    /// Uniform day in the trailing window with a business-hours weighted time of day
    fn draw_timestamp<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDateTime {
        let window_days = i64::from(self.tables.window_days);
        let start = self.window_end - Duration::days(window_days);
        let day = (start + Duration::days(rng.gen_range(0..=window_days))).date();

        let hour = self.hours.sample(rng) as i64;
        let minute: i64 = rng.gen_range(0..60);
        let second: i64 = rng.gen_range(0..60);

        day.and_time(NaiveTime::MIN) + Duration::seconds(hour * 3600 + minute * 60 + second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn window_end() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn generate(count: usize, seed: u64) -> Vec<Session> {
        let tables = SimulationTables::default();
        let generator = SessionGenerator::new(&tables)
            .unwrap()
            .with_window_end(window_end());
        generator
            .generate(count, &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let tables = SimulationTables::default();
        let generator = SessionGenerator::new(&tables).unwrap();
        let result = generator.generate(0, &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(Error::InvalidCount(0))));
    }

    #[test]
    fn test_sessions_sorted_with_unique_ids() {
        let sessions = generate(1000, 3);
        assert_eq!(sessions.len(), 1000);
        assert!(sessions.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        let ids: HashSet<u64> = sessions.iter().map(|s| s.session_id).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| (1..=1000).contains(id)));
    }

    #[test]
    fn test_attributes_come_from_tables() {
        let tables = SimulationTables::default();
        let sessions = generate(500, 4);
        let start = (window_end() - Duration::days(90)).date();

        for s in &sessions {
            assert!((1..=350).contains(&s.user_id));
            assert!(s.date() >= start && s.date() <= window_end().date());
            assert!(tables.traffic_sources.iter().any(|t| t.name == s.traffic_source));
            assert!(tables.devices.iter().any(|d| d.name == s.device));
            assert!(tables.locations.contains(&s.location));
            assert!(tables.categories.contains(&s.category));
            assert_eq!(s.ad_spend, tables.ad_spend(&s.traffic_source));
            assert!(s.is_monotonic());
        }
    }

    #[test]
    fn test_user_pool_has_minimum_of_one() {
        let tables = SimulationTables::default();
        let generator = SessionGenerator::new(&tables).unwrap();
        assert_eq!(generator.user_pool_size(1), 1);
        assert_eq!(generator.user_pool_size(15_000), 10_500);

        let sessions = generate(1, 8);
        assert_eq!(sessions[0].user_id, 1);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        assert_eq!(generate(200, 21), generate(200, 21));
        assert_ne!(generate(200, 21), generate(200, 22));
    }

    #[test]
    fn test_progress_reported_every_thousand() {
        let tables = SimulationTables::default();
        let generator = SessionGenerator::new(&tables).unwrap();
        let mut ticks = Vec::new();
        generator
            .generate_with_progress(2500, &mut StdRng::seed_from_u64(2), |n| ticks.push(n))
            .unwrap();
        assert_eq!(ticks, vec![1000, 2000]);
    }

    #[test]
    fn test_purchase_rate_in_expected_band() {
        // Roughly 0.65 * 0.54 * 0.57 * ~0.46 ≈ 9% of sessions purchase
        let sessions = generate(1000, 2024);
        let purchases = sessions.iter().filter(|s| s.completed_purchase).count();
        assert!(
            (50..=140).contains(&purchases),
            "unexpected purchase count {}",
            purchases
        );
    }

    #[test]
    fn test_invalid_tables_rejected() {
        let tables = SimulationTables {
            devices: vec![],
            ..SimulationTables::default()
        };
        assert!(matches!(
            SessionGenerator::new(&tables),
            Err(Error::InvalidTables(_))
        ));
    }
}
