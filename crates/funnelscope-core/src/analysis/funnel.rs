use super::{Analyzer, percent};
use crate::model::{FunnelStage, Session};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage counts and stage-to-stage conversion rates (all rates in percent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelMetrics {
    pub total_sessions: u64,
    pub landed_count: u64,
    pub viewed_product_count: u64,
    pub added_to_cart_count: u64,
    pub started_checkout_count: u64,
    pub completed_purchase_count: u64,

    pub landing_to_product_rate: f64,
    pub product_to_cart_rate: f64,
    pub cart_to_checkout_rate: f64,
    pub checkout_to_purchase_rate: f64,
    pub overall_conversion_rate: f64,

    pub product_view_dropoff: f64,
    pub cart_dropoff: f64,
    pub checkout_dropoff: f64,
}

/// One row of the stage-by-stage funnel table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRow {
    pub stage: FunnelStage,
    pub count: u64,
    /// Share of all sessions that reached this stage
    pub percent_of_total: f64,
    /// Share of the previous stage lost before this one
    pub drop_off: f64,
}

impl FunnelMetrics {
    /// Build metrics from stage counts, guarding every division
    pub fn from_counts(
        total: u64,
        viewed: u64,
        carted: u64,
        checkout: u64,
        purchased: u64,
    ) -> Self {
        let rate = |num: u64, den: u64| percent(num as f64, den as f64);
        // Nothing can be lost at a stage nobody reached
        let dropoff = |num: u64, den: u64| {
            if den == 0 { 0.0 } else { 100.0 - rate(num, den) }
        };

        Self {
            total_sessions: total,
            landed_count: total,
            viewed_product_count: viewed,
            added_to_cart_count: carted,
            started_checkout_count: checkout,
            completed_purchase_count: purchased,
            landing_to_product_rate: rate(viewed, total),
            product_to_cart_rate: rate(carted, viewed),
            cart_to_checkout_rate: rate(checkout, carted),
            checkout_to_purchase_rate: rate(purchased, checkout),
            overall_conversion_rate: rate(purchased, total),
            product_view_dropoff: dropoff(carted, viewed),
            cart_dropoff: dropoff(checkout, carted),
            checkout_dropoff: dropoff(purchased, checkout),
        }
    }

    pub fn count(&self, stage: FunnelStage) -> u64 {
        match stage {
            FunnelStage::Landing => self.landed_count,
            FunnelStage::ProductView => self.viewed_product_count,
            FunnelStage::AddToCart => self.added_to_cart_count,
            FunnelStage::CheckoutStart => self.started_checkout_count,
            FunnelStage::Purchase => self.completed_purchase_count,
        }
    }

    /// Ordered funnel table used by the reports
    pub fn stages(&self) -> Vec<StageRow> {
        let mut previous: Option<u64> = None;
        FunnelStage::ALL
            .iter()
            .map(|&stage| {
                let count = self.count(stage);
                let drop_off = previous
                    .map(|prev| percent(prev.saturating_sub(count) as f64, prev as f64))
                    .unwrap_or(0.0);
                previous = Some(count);
                StageRow {
                    stage,
                    count,
                    percent_of_total: percent(count as f64, self.total_sessions as f64),
                    drop_off,
                }
            })
            .collect()
    }
}

/// A transition between two adjacent funnel stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    LandingToProduct,
    ProductToCart,
    CartToCheckout,
    CheckoutToPurchase,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::LandingToProduct,
        Transition::ProductToCart,
        Transition::CartToCheckout,
        Transition::CheckoutToPurchase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::LandingToProduct => "Landing to Product View",
            Transition::ProductToCart => "Product View to Add to Cart",
            Transition::CartToCheckout => "Cart to Checkout",
            Transition::CheckoutToPurchase => "Checkout to Purchase",
        }
    }

    pub fn stages(&self) -> (FunnelStage, FunnelStage) {
        match self {
            Transition::LandingToProduct => (FunnelStage::Landing, FunnelStage::ProductView),
            Transition::ProductToCart => (FunnelStage::ProductView, FunnelStage::AddToCart),
            Transition::CartToCheckout => (FunnelStage::AddToCart, FunnelStage::CheckoutStart),
            Transition::CheckoutToPurchase => (FunnelStage::CheckoutStart, FunnelStage::Purchase),
        }
    }

    /// Stage-to-stage conversion rate of this transition
    pub fn rate(&self, metrics: &FunnelMetrics) -> f64 {
        match self {
            Transition::LandingToProduct => metrics.landing_to_product_rate,
            Transition::ProductToCart => metrics.product_to_cart_rate,
            Transition::CartToCheckout => metrics.cart_to_checkout_rate,
            Transition::CheckoutToPurchase => metrics.checkout_to_purchase_rate,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct FunnelAnalyzer;

impl Analyzer for FunnelAnalyzer {
    type Output = FunnelMetrics;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        tracing::debug!("Computing funnel metrics");

        if sessions.is_empty() {
            tracing::warn!("No sessions to analyze, funnel rates default to zero");
        }

        let count = |flag: fn(&Session) -> bool| sessions.iter().filter(|s| flag(s)).count() as u64;

        let metrics = FunnelMetrics::from_counts(
            sessions.len() as u64,
            count(|s| s.viewed_product),
            count(|s| s.added_to_cart),
            count(|s| s.started_checkout),
            count(|s| s.completed_purchase),
        );

        tracing::info!(
            "Funnel analysis complete: {} sessions, {:.2}% overall conversion",
            metrics.total_sessions,
            metrics.overall_conversion_rate
        );

        metrics
    }
}
