use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered funnel stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Landing,
    ProductView,
    AddToCart,
    CheckoutStart,
    Purchase,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 5] = [
        FunnelStage::Landing,
        FunnelStage::ProductView,
        FunnelStage::AddToCart,
        FunnelStage::CheckoutStart,
        FunnelStage::Purchase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::Landing => "Landing Page",
            FunnelStage::ProductView => "Product View",
            FunnelStage::AddToCart => "Add to Cart",
            FunnelStage::CheckoutStart => "Checkout Started",
            FunnelStage::Purchase => "Purchase Complete",
        }
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of simulating one visitor's path through the funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyOutcome {
    pub landed: bool,
    pub viewed_product: bool,
    pub added_to_cart: bool,
    pub started_checkout: bool,
    pub completed_purchase: bool,
    pub session_duration_seconds: u32,
    pub pages_viewed: u32,
    pub bounced: bool,
    pub revenue: f64,
}

impl JourneyOutcome {
    pub fn deepest_stage(&self) -> FunnelStage {
        deepest_stage(
            self.viewed_product,
            self.added_to_cart,
            self.started_checkout,
            self.completed_purchase,
        )
    }
}

/// One simulated visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: u64,
    pub user_id: u64,
    pub timestamp: NaiveDateTime,
    pub traffic_source: String,
    pub device: String,
    pub location: String,
    pub category: String,
    /// Drawn independently of `user_id` repetition, so it may contradict the visit history
    pub is_returning: bool,
    pub landed: bool,
    pub viewed_product: bool,
    pub added_to_cart: bool,
    pub started_checkout: bool,
    pub completed_purchase: bool,
    pub session_duration_seconds: u32,
    pub pages_viewed: u32,
    pub revenue: f64,
    pub ad_spend: f64,
}

impl Session {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn day_of_week(&self) -> &'static str {
        weekday_name(self.timestamp.weekday())
    }

    pub fn bounced(&self) -> bool {
        !self.viewed_product
    }

    pub fn abandoned_cart(&self) -> bool {
        self.added_to_cart && !self.completed_purchase
    }

    pub fn deepest_stage(&self) -> FunnelStage {
        deepest_stage(
            self.viewed_product,
            self.added_to_cart,
            self.started_checkout,
            self.completed_purchase,
        )
    }

    /// True when every later-stage flag implies all earlier ones
    pub fn is_monotonic(&self) -> bool {
        self.landed
            && (!self.added_to_cart || self.viewed_product)
            && (!self.started_checkout || self.added_to_cart)
            && (!self.completed_purchase || self.started_checkout)
    }

    pub fn display_id(&self) -> String {
        format_session_id(self.session_id)
    }

    pub fn display_user_id(&self) -> String {
        format_user_id(self.user_id)
    }
}

fn deepest_stage(viewed: bool, carted: bool, checkout: bool, purchased: bool) -> FunnelStage {
    if purchased {
        FunnelStage::Purchase
    } else if checkout {
        FunnelStage::CheckoutStart
    } else if carted {
        FunnelStage::AddToCart
    } else if viewed {
        FunnelStage::ProductView
    } else {
        FunnelStage::Landing
    }
}

/// English weekday name, e.g. "Monday"
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Kind of a funnel event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    AddToCart,
    CheckoutStart,
    Purchase,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageView => "page_view",
            EventType::AddToCart => "add_to_cart",
            EventType::CheckoutStart => "checkout_start",
            EventType::Purchase => "purchase",
        }
    }
}

/// Page an event was recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Homepage,
    ProductPage,
    Checkout,
    Confirmation,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Homepage => "homepage",
            Page::ProductPage => "product_page",
            Page::Checkout => "checkout",
            Page::Confirmation => "confirmation",
        }
    }
}

/// A single timestamped step inside a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: u64,
    pub session_id: u64,
    pub user_id: u64,
    pub timestamp: NaiveDateTime,
    pub event_type: EventType,
    pub page: Page,
}

impl Event {
    /// Funnel stage this event marks
    pub fn stage(&self) -> FunnelStage {
        match (self.event_type, self.page) {
            (EventType::PageView, Page::Homepage) => FunnelStage::Landing,
            (EventType::PageView, _) => FunnelStage::ProductView,
            (EventType::AddToCart, _) => FunnelStage::AddToCart,
            (EventType::CheckoutStart, _) => FunnelStage::CheckoutStart,
            (EventType::Purchase, _) => FunnelStage::Purchase,
        }
    }

    pub fn display_id(&self) -> String {
        format!("EVT_{:08}", self.event_id)
    }
}

pub fn format_session_id(id: u64) -> String {
    format!("SES_{:06}", id)
}

pub fn format_user_id(id: u64) -> String {
    format!("USER_{:06}", id)
}
