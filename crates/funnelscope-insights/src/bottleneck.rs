use crate::error::{Error, Result};
use funnelscope_core::analysis::{FunnelMetrics, Transition};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A funnel transition converting below its threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub transition: Transition,
    /// `100 - rate` for the transition
    pub drop_off_rate: f64,
    pub severity: Severity,
    pub recommendation: String,
}

impl Bottleneck {
    pub fn stage(&self) -> &'static str {
        self.transition.as_str()
    }
}

/// Threshold and severity rule for one transition.
///
/// Triggers when the transition rate is below `threshold`. The bottleneck is
/// `escalated` when its drop-off exceeds `escalate_above`, `baseline` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckRule {
    pub transition: Transition,
    pub threshold: f64,
    pub escalate_above: f64,
    pub baseline: Severity,
    pub escalated: Severity,
    pub recommendation: String,
}

impl BottleneckRule {
    fn evaluate(&self, metrics: &FunnelMetrics) -> Option<Bottleneck> {
        let rate = self.transition.rate(metrics);
        if rate >= self.threshold {
            return None;
        }

        let drop_off_rate = 100.0 - rate;
        let severity = if drop_off_rate > self.escalate_above {
            self.escalated
        } else {
            self.baseline
        };

        Some(Bottleneck {
            transition: self.transition,
            drop_off_rate,
            severity,
            recommendation: self.recommendation.clone(),
        })
    }
}

/// Rule table checked in funnel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckRules {
    pub rules: Vec<BottleneckRule>,
}

impl Default for BottleneckRules {
    fn default() -> Self {
        let rule = |transition, threshold, escalate_above, baseline, escalated, text: &str| {
            BottleneckRule {
                transition,
                threshold,
                escalate_above,
                baseline,
                escalated,
                recommendation: text.to_string(),
            }
        };

        Self {
            rules: vec![
                rule(
                    Transition::LandingToProduct,
                    60.0,
                    40.0,
                    Severity::Medium,
                    Severity::High,
                    "Improve homepage engagement, add featured products, optimize loading speed",
                ),
                rule(
                    Transition::ProductToCart,
                    50.0,
                    50.0,
                    Severity::Medium,
                    Severity::High,
                    "Enhance product descriptions, add reviews, show stock availability",
                ),
                rule(
                    Transition::CartToCheckout,
                    60.0,
                    40.0,
                    Severity::Medium,
                    Severity::High,
                    "Show shipping costs early, add trust badges, simplify cart view",
                ),
                rule(
                    Transition::CheckoutToPurchase,
                    70.0,
                    30.0,
                    Severity::High,
                    Severity::Critical,
                    "Reduce checkout steps, add guest checkout, show security seals, optimize payment options",
                ),
            ],
        }
    }
}

/// Every triggered bottleneck, largest drop-off first. Equal drop-offs keep funnel order.
pub fn identify_bottlenecks(metrics: &FunnelMetrics, rules: &BottleneckRules) -> Vec<Bottleneck> {
    tracing::debug!("Checking {} bottleneck rules", rules.rules.len());

    let mut bottlenecks: Vec<Bottleneck> = rules
        .rules
        .iter()
        .filter_map(|rule| rule.evaluate(metrics))
        .collect();

    bottlenecks.sort_by(|a, b| b.drop_off_rate.total_cmp(&a.drop_off_rate));

    tracing::info!("Identified {} bottlenecks", bottlenecks.len());

    bottlenecks
}

/// Like [`identify_bottlenecks`], but rejects rates that are NaN or outside `[0, 100]`
pub fn identify_bottlenecks_checked(
    metrics: &FunnelMetrics,
    rules: &BottleneckRules,
) -> Result<Vec<Bottleneck>> {
    let rates = [
        ("overall_conversion_rate", metrics.overall_conversion_rate),
        ("landing_to_product_rate", metrics.landing_to_product_rate),
        ("product_to_cart_rate", metrics.product_to_cart_rate),
        ("cart_to_checkout_rate", metrics.cart_to_checkout_rate),
        ("checkout_to_purchase_rate", metrics.checkout_to_purchase_rate),
    ];

    for (name, rate) in rates {
        if !(0.0..=100.0).contains(&rate) {
            return Err(Error::InvalidMetrics(format!(
                "{} must be within [0, 100], got {}",
                name, rate
            )));
        }
    }

    Ok(identify_bottlenecks(metrics, rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(landing: f64, product: f64, cart: f64, checkout: f64) -> FunnelMetrics {
        FunnelMetrics {
            landing_to_product_rate: landing,
            product_to_cart_rate: product,
            cart_to_checkout_rate: cart,
            checkout_to_purchase_rate: checkout,
            ..FunnelMetrics::default()
        }
    }

    #[test]
    fn test_checkout_collapse_ranks_first_as_critical() {
        let m = metrics(70.0, 45.0, 50.0, 20.0);
        let found = identify_bottlenecks(&m, &BottleneckRules::default());

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].transition, Transition::CheckoutToPurchase);
        assert_eq!(found[0].drop_off_rate, 80.0);
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[1].transition, Transition::ProductToCart);
        assert_eq!(found[1].severity, Severity::High);
        assert_eq!(found[2].transition, Transition::CartToCheckout);
        assert_eq!(found[2].severity, Severity::High);
    }

    #[test]
    fn test_healthy_funnel_has_no_bottlenecks() {
        let m = metrics(60.0, 50.0, 60.0, 70.0);
        assert!(identify_bottlenecks(&m, &BottleneckRules::default()).is_empty());
    }

    #[test]
    fn test_default_rules_always_escalate_once_triggered() {
        // With the default table a rate below threshold always implies a
        // drop-off above the cut-off, so the baseline severity never applies
        let m = metrics(59.0, 49.5, 59.99, 69.0);
        let found = identify_bottlenecks(&m, &BottleneckRules::default());
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].stage(), "Product View to Add to Cart");
        assert_eq!(found[1].stage(), "Landing to Product View");
        assert_eq!(found[2].stage(), "Cart to Checkout");
        assert_eq!(found[3].stage(), "Checkout to Purchase");
        assert!(found[..3].iter().all(|b| b.severity == Severity::High));
        assert_eq!(found[3].severity, Severity::Critical);
        assert_eq!(
            found[2].recommendation,
            "Show shipping costs early, add trust badges, simplify cart view"
        );
    }

    #[test]
    fn test_baseline_severity_below_cut_off() {
        let mut rules = BottleneckRules::default();
        for rule in &mut rules.rules {
            rule.threshold = 90.0;
        }

        let found = identify_bottlenecks(&metrics(65.0, 100.0, 100.0, 75.0), &rules);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].transition, Transition::LandingToProduct);
        assert_eq!(found[0].severity, Severity::Medium);
        assert_eq!(found[1].transition, Transition::CheckoutToPurchase);
        assert_eq!(found[1].severity, Severity::High);
    }

    #[test]
    fn test_equal_drop_off_keeps_funnel_order() {
        let m = metrics(55.0, 100.0, 55.0, 100.0);
        let found = identify_bottlenecks(&m, &BottleneckRules::default());
        assert_eq!(found[0].transition, Transition::LandingToProduct);
        assert_eq!(found[1].transition, Transition::CartToCheckout);
    }

    #[test]
    fn test_custom_rules() {
        let rules = BottleneckRules {
            rules: vec![BottleneckRule {
                transition: Transition::ProductToCart,
                threshold: 90.0,
                escalate_above: 5.0,
                baseline: Severity::Medium,
                escalated: Severity::Critical,
                recommendation: "Fix product pages".to_string(),
            }],
        };
        let found = identify_bottlenecks(&metrics(10.0, 80.0, 10.0, 10.0), &rules);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Critical);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        let rules = BottleneckRules::default();
        assert!(identify_bottlenecks_checked(&metrics(120.0, 50.0, 50.0, 50.0), &rules).is_err());
        assert!(identify_bottlenecks_checked(&metrics(50.0, f64::NAN, 50.0, 50.0), &rules).is_err());
        assert!(identify_bottlenecks_checked(&metrics(50.0, 50.0, -1.0, 50.0), &rules).is_err());
        assert!(identify_bottlenecks_checked(&metrics(70.0, 45.0, 50.0, 20.0), &rules).is_ok());
    }

    #[test]
    fn test_severity_order_and_serialization() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"Critical\"");
    }
}
