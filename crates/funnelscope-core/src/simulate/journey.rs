use crate::model::{FunnelStage, JourneyOutcome};
use crate::Result;
use crate::tables::{EngagementRange, SimulationTables};
use rand::Rng;

/// Draws one visitor's funnel outcome from the configured tables
pub struct JourneySimulator<'a> {
    tables: &'a SimulationTables,
}

impl<'a> JourneySimulator<'a> {
    /// Fails with `InvalidTables` when a probability or range cannot be sampled
    pub fn new(tables: &'a SimulationTables) -> Result<Self> {
        tables.validate()?;
        Ok(Self { tables })
    }

    /// Probability that a visitor who started checkout completes the purchase.
    ///
    /// `base_rate * device_multiplier * purchase_multiplier`, clamped to `[0, 1]`
    /// because high-converting sources on desktop exceed 1 before clamping.
    pub fn purchase_probability(&self, traffic_source: &str, device: &str) -> f64 {
        let conversion_prob =
            self.tables.base_rate(traffic_source) * self.tables.device_multiplier(device);
        (conversion_prob * self.tables.stages.purchase_multiplier).clamp(0.0, 1.0)
    }

    /// Simulate a single visit. Unknown sources and devices use the table defaults.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        traffic_source: &str,
        device: &str,
    ) -> JourneyOutcome {
        let stages = &self.tables.stages;
        let purchase_prob = self.purchase_probability(traffic_source, device);

        // Each draw happens only once the previous stage is reached
        let viewed_product = rng.gen_bool(stages.view_product);
        let added_to_cart = viewed_product && rng.gen_bool(stages.add_to_cart);
        let started_checkout = added_to_cart && rng.gen_bool(stages.start_checkout);
        let completed_purchase = started_checkout && rng.gen_bool(purchase_prob);

        let mut outcome = JourneyOutcome {
            landed: true,
            viewed_product,
            added_to_cart,
            started_checkout,
            completed_purchase,
            session_duration_seconds: 0,
            pages_viewed: 0,
            bounced: !viewed_product,
            revenue: 0.0,
        };

        let range = self.engagement_for(outcome.deepest_stage());
        outcome.session_duration_seconds =
            rng.gen_range(range.duration_seconds.min..=range.duration_seconds.max);
        outcome.pages_viewed = rng.gen_range(range.pages.min..=range.pages.max);

        if completed_purchase {
            let raw = rng.gen_range(self.tables.revenue_min..=self.tables.revenue_max);
            outcome.revenue = round_cents(raw);
        }

        outcome
    }

    /// Duration and page ranges for the deepest stage a session reached
    pub fn engagement_for(&self, stage: FunnelStage) -> EngagementRange {
        let engagement = &self.tables.engagement;
        match stage {
            FunnelStage::Landing => engagement.bounced,
            FunnelStage::ProductView => engagement.viewed,
            FunnelStage::AddToCart => engagement.carted,
            FunnelStage::CheckoutStart => engagement.checkout,
            FunnelStage::Purchase => engagement.purchased,
        }
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_purchase_probability_is_clamped() {
        let mut tables = SimulationTables::default();
        tables.traffic_sources[4].base_conversion_rate = 0.5; // Email Campaign
        let simulator = JourneySimulator::new(&tables).unwrap();

        // 0.5 * 1.2 * 2.8 = 1.68 before clamping
        assert_eq!(simulator.purchase_probability("Email Campaign", "Desktop"), 1.0);

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let outcome = simulator.simulate(&mut rng, "Email Campaign", "Desktop");
            if outcome.started_checkout {
                assert!(outcome.completed_purchase);
            }
        }
    }

    #[test]
    fn test_rejects_unsampleable_tables() {
        let mut tables = SimulationTables::default();
        tables.stages.view_product = 1.5;
        assert!(matches!(
            JourneySimulator::new(&tables),
            Err(Error::InvalidTables(_))
        ));

        let mut tables = SimulationTables::default();
        tables.revenue_min = 900.0;
        tables.revenue_max = 100.0;
        assert!(matches!(
            JourneySimulator::new(&tables),
            Err(Error::InvalidTables(_))
        ));
    }

    #[test]
    fn test_purchase_probability_uses_defaults_for_unknown_inputs() {
        let tables = SimulationTables::default();
        let simulator = JourneySimulator::new(&tables).unwrap();
        let expected = 0.14 * 1.0 * 2.8;
        assert!((simulator.purchase_probability("Carrier Pigeon", "Watch") - expected).abs() < 1e-12);
    }

    #[test]
    fn test_outcomes_respect_stage_ranges() {
        let tables = SimulationTables::default();
        let simulator = JourneySimulator::new(&tables).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..2000 {
            let outcome = simulator.simulate(&mut rng, "Google Ads", "Mobile");
            let range = simulator.engagement_for(outcome.deepest_stage());

            assert!(outcome.landed);
            assert!(!outcome.added_to_cart || outcome.viewed_product);
            assert!(!outcome.started_checkout || outcome.added_to_cart);
            assert!(!outcome.completed_purchase || outcome.started_checkout);
            assert_eq!(outcome.bounced, !outcome.viewed_product);
            assert!(range.duration_seconds.contains(outcome.session_duration_seconds));
            assert!(range.pages.contains(outcome.pages_viewed));

            if outcome.completed_purchase {
                assert!((500.0..=5000.0).contains(&outcome.revenue));
                assert_eq!(outcome.revenue, round_cents(outcome.revenue));
            } else {
                assert_eq!(outcome.revenue, 0.0);
            }
        }
    }

    #[test]
    fn test_abandoned_checkout_ranges() {
        let tables = SimulationTables::default();
        let simulator = JourneySimulator::new(&tables).unwrap();
        let mut rng = StdRng::seed_from_u64(99);

        let mut seen = 0;
        for _ in 0..5000 {
            let outcome = simulator.simulate(&mut rng, "Direct", "Mobile");
            if outcome.started_checkout && !outcome.completed_purchase {
                seen += 1;
                assert!((180..=600).contains(&outcome.session_duration_seconds));
                assert!((4..=10).contains(&outcome.pages_viewed));
            }
        }
        assert!(seen > 0, "expected at least one abandoned checkout");
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let tables = SimulationTables::default();
        let simulator = JourneySimulator::new(&tables).unwrap();

        let a = simulator.simulate(&mut StdRng::seed_from_u64(5), "Referral", "Tablet");
        let b = simulator.simulate(&mut StdRng::seed_from_u64(5), "Referral", "Tablet");
        assert_eq!(a, b);
    }
}
