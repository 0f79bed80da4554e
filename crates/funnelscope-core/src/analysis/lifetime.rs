use super::{Analyzer, round2};
use crate::model::Session;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Months used to annualize average revenue per user into a CLV estimate
pub const CLV_MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegments {
    /// Users with exactly one purchase
    pub one_time_buyers: usize,
    pub repeat_buyers: usize,
    /// Users whose revenue is strictly above the 75th percentile
    pub high_value_customers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerLifetime {
    pub users: usize,
    pub avg_sessions_per_user: f64,
    pub avg_purchases_per_user: f64,
    pub avg_revenue_per_user: f64,
    pub avg_days_active: f64,
    pub segments: CustomerSegments,
    pub estimated_clv: f64,
}

pub struct LifetimeAnalyzer;

struct UserTotals {
    sessions: usize,
    purchases: usize,
    revenue: f64,
    first: NaiveDateTime,
    last: NaiveDateTime,
}

impl UserTotals {
    /// Calendar span in whole days, counting the first day
    fn days_active(&self) -> i64 {
        (self.last - self.first).num_days() + 1
    }
}

impl Analyzer for LifetimeAnalyzer {
    type Output = CustomerLifetime;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        let mut users: HashMap<u64, UserTotals> = HashMap::new();
        for s in sessions {
            users
                .entry(s.user_id)
                .and_modify(|u| {
                    u.sessions += 1;
                    u.purchases += usize::from(s.completed_purchase);
                    u.revenue += s.revenue;
                    u.first = u.first.min(s.timestamp);
                    u.last = u.last.max(s.timestamp);
                })
                .or_insert(UserTotals {
                    sessions: 1,
                    purchases: usize::from(s.completed_purchase),
                    revenue: s.revenue,
                    first: s.timestamp,
                    last: s.timestamp,
                });
        }

        if users.is_empty() {
            return CustomerLifetime::default();
        }

        let n = users.len() as f64;
        let mean = |f: &dyn Fn(&UserTotals) -> f64| users.values().map(f).sum::<f64>() / n;

        let avg_revenue_per_user = mean(&|u| u.revenue);

        let mut revenues: Vec<f64> = users.values().map(|u| u.revenue).collect();
        revenues.sort_by(f64::total_cmp);
        let threshold = quantile(&revenues, 0.75);

        let segments = CustomerSegments {
            one_time_buyers: users.values().filter(|u| u.purchases == 1).count(),
            repeat_buyers: users.values().filter(|u| u.purchases > 1).count(),
            high_value_customers: revenues.iter().filter(|&&r| r > threshold).count(),
        };

        tracing::debug!(
            "Lifetime metrics over {} users, high-value threshold {:.2}",
            users.len(),
            threshold
        );

        CustomerLifetime {
            users: users.len(),
            avg_sessions_per_user: round2(mean(&|u| u.sessions as f64)),
            avg_purchases_per_user: round2(mean(&|u| u.purchases as f64)),
            avg_revenue_per_user: round2(avg_revenue_per_user),
            avg_days_active: round2(mean(&|u| u.days_active() as f64)),
            segments,
            estimated_clv: round2(avg_revenue_per_user * CLV_MONTHS),
        }
    }
}

/// Quantile of a sorted slice with linear interpolation between ranks
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{at, session};
    use crate::model::FunnelStage;

    #[test]
    fn test_quantile_interpolates() {
        assert_eq!(quantile(&[], 0.75), 0.0);
        assert_eq!(quantile(&[0.0, 0.0, 100.0, 200.0], 0.75), 125.0);
        assert_eq!(quantile(&[5.0], 0.75), 5.0);
    }

    #[test]
    fn test_lifetime_metrics() {
        // user 1: two purchases over three days, user 2: one purchase,
        // users 3 and 4: browse only
        let mut a = session(1, 1, FunnelStage::Purchase);
        a.timestamp = at(1, 10);
        let mut b = session(2, 1, FunnelStage::Purchase);
        b.timestamp = at(3, 12);
        let c = session(3, 2, FunnelStage::Purchase);
        let d = session(4, 3, FunnelStage::Landing);
        let e = session(5, 4, FunnelStage::AddToCart);

        let lifetime = LifetimeAnalyzer.analyze(&[a, b, c, d, e]);

        assert_eq!(lifetime.users, 4);
        assert_eq!(lifetime.avg_sessions_per_user, 1.25);
        assert_eq!(lifetime.avg_purchases_per_user, 0.75);
        assert_eq!(lifetime.avg_revenue_per_user, 750.0);
        assert_eq!(lifetime.avg_days_active, 1.5);
        assert_eq!(lifetime.estimated_clv, 9000.0);
        assert_eq!(lifetime.segments.one_time_buyers, 1);
        assert_eq!(lifetime.segments.repeat_buyers, 1);
        // revenues [0, 0, 1000, 2000], p75 = 1250
        assert_eq!(lifetime.segments.high_value_customers, 1);
    }

    #[test]
    fn test_empty() {
        assert_eq!(LifetimeAnalyzer.analyze(&[]), CustomerLifetime::default());
    }
}
