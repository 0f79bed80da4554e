use super::{Analyzer, percent};
use crate::model::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sessions that added to cart but never purchased
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartAbandonment {
    pub total_carts: usize,
    pub abandoned_carts: usize,
    pub completed_carts: usize,
    pub abandonment_rate: f64,
    /// (traffic source, abandoned carts), most abandoned first
    pub by_source: Vec<(String, usize)>,
    /// (device, abandoned carts), most abandoned first
    pub by_device: Vec<(String, usize)>,
    /// Revenue carried by abandoned sessions; always zero for simulated data
    pub potential_lost_revenue: f64,
}

pub struct CartAbandonmentAnalyzer;

impl Analyzer for CartAbandonmentAnalyzer {
    type Output = CartAbandonment;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        tracing::debug!("Analyzing cart abandonment");

        let carts: Vec<&Session> = sessions.iter().filter(|s| s.added_to_cart).collect();
        let abandoned: Vec<&Session> = carts
            .iter()
            .copied()
            .filter(|s| !s.completed_purchase)
            .collect();

        let insights = CartAbandonment {
            total_carts: carts.len(),
            abandoned_carts: abandoned.len(),
            completed_carts: carts.len() - abandoned.len(),
            abandonment_rate: percent(abandoned.len() as f64, carts.len() as f64),
            by_source: count_by(&abandoned, |s| &s.traffic_source),
            by_device: count_by(&abandoned, |s| &s.device),
            potential_lost_revenue: abandoned.iter().map(|s| s.revenue).sum(),
        };

        tracing::info!(
            "Cart abandonment: {} of {} carts abandoned ({:.2}%)",
            insights.abandoned_carts,
            insights.total_carts,
            insights.abandonment_rate
        );

        insights
    }
}

/// Count sessions per key, sorted by count descending then key ascending
fn count_by<F>(sessions: &[&Session], key: F) -> Vec<(String, usize)>
where
    F: Fn(&Session) -> &String,
{
    let mut counts: HashMap<&String, usize> = HashMap::new();
    for session in sessions {
        *counts.entry(key(session)).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.clone(), v))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::session;
    use crate::model::FunnelStage;

    #[test]
    fn test_abandonment_counts_and_grouping() {
        let mut sessions = vec![
            session(1, 1, FunnelStage::AddToCart),
            session(2, 2, FunnelStage::CheckoutStart),
            session(3, 3, FunnelStage::Purchase),
            session(4, 4, FunnelStage::ProductView),
            session(5, 5, FunnelStage::AddToCart),
        ];
        sessions[1].traffic_source = "Referral".to_string();
        sessions[4].device = "Desktop".to_string();

        let insights = CartAbandonmentAnalyzer.analyze(&sessions);

        assert_eq!(insights.total_carts, 4);
        assert_eq!(insights.abandoned_carts, 3);
        assert_eq!(insights.completed_carts, 1);
        assert_eq!(insights.abandonment_rate, 75.0);
        assert_eq!(
            insights.by_source,
            vec![("Google Ads".to_string(), 2), ("Referral".to_string(), 1)]
        );
        assert_eq!(
            insights.by_device,
            vec![("Mobile".to_string(), 2), ("Desktop".to_string(), 1)]
        );
        assert_eq!(insights.potential_lost_revenue, 0.0);
    }

    #[test]
    fn test_no_carts() {
        let insights = CartAbandonmentAnalyzer.analyze(&[session(1, 1, FunnelStage::Landing)]);
        assert_eq!(insights.total_carts, 0);
        assert_eq!(insights.abandonment_rate, 0.0);
        assert!(insights.by_source.is_empty());
    }
}
