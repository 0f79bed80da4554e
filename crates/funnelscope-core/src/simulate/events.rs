use crate::model::{Event, EventType, Page, Session};
use crate::tables::Span;
use crate::{Error, Result};
use chrono::Duration;
use rand::Rng;

/// Expands sessions into an ordered event log.
///
/// Each delay is added to the time of the previous event, so they compound
/// through the session. Event ids run continuously across all sessions.
#[derive(Debug, Clone)]
pub struct EventExpander {
    product_view_delay: Span,
    add_to_cart_delay: Span,
    checkout_delay: Span,
    purchase_delay: Span,
}

impl Default for EventExpander {
    fn default() -> Self {
        Self {
            product_view_delay: Span::new(10, 60),
            add_to_cart_delay: Span::new(30, 120),
            checkout_delay: Span::new(20, 90),
            purchase_delay: Span::new(60, 180),
        }
    }
}

impl EventExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom delays in seconds. Each must be at least one second with `min <= max`,
    /// so events within a session stay strictly increasing.
    pub fn with_delays(
        product_view: Span,
        add_to_cart: Span,
        checkout: Span,
        purchase: Span,
    ) -> Result<Self> {
        for (name, delay) in [
            ("product view", product_view),
            ("add to cart", add_to_cart),
            ("checkout", checkout),
            ("purchase", purchase),
        ] {
            if delay.min == 0 || delay.min > delay.max {
                return Err(Error::InvalidTables(format!(
                    "{} delay [{}, {}] must be positive with min <= max",
                    name, delay.min, delay.max
                )));
            }
        }

        Ok(Self {
            product_view_delay: product_view,
            add_to_cart_delay: add_to_cart,
            checkout_delay: checkout,
            purchase_delay: purchase,
        })
    }

    pub fn expand<R: Rng + ?Sized>(&self, sessions: &[Session], rng: &mut R) -> Vec<Event> {
        tracing::debug!("Expanding {} sessions into events", sessions.len());

        let mut events = Vec::with_capacity(sessions.len() * 2);

        for session in sessions {
            let mut current = session.timestamp;
            let push = |events: &mut Vec<Event>, timestamp, event_type, page| {
                events.push(Event {
                    event_id: events.len() as u64 + 1,
                    session_id: session.session_id,
                    user_id: session.user_id,
                    timestamp,
                    event_type,
                    page,
                });
            };

            push(&mut events, current, EventType::PageView, Page::Homepage);

            let steps = [
                (
                    session.viewed_product,
                    self.product_view_delay,
                    EventType::PageView,
                    Page::ProductPage,
                ),
                (
                    session.added_to_cart,
                    self.add_to_cart_delay,
                    EventType::AddToCart,
                    Page::ProductPage,
                ),
                (
                    session.started_checkout,
                    self.checkout_delay,
                    EventType::CheckoutStart,
                    Page::Checkout,
                ),
                (
                    session.completed_purchase,
                    self.purchase_delay,
                    EventType::Purchase,
                    Page::Confirmation,
                ),
            ];

            for (reached, delay, event_type, page) in steps {
                if !reached {
                    continue;
                }
                let seconds = rng.gen_range(delay.min..=delay.max);
                current += Duration::seconds(i64::from(seconds));
                push(&mut events, current, event_type, page);
            }
        }

        tracing::info!("Generated {} events", events.len());

        events
    }
}
