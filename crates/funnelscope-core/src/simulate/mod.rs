//! Stochastic generation of sessions and their event logs.
//!
//! Every random draw goes through a caller-supplied [`rand::Rng`], so seeding
//! the generator makes a whole run reproducible.

mod events;
mod generator;
mod journey;

pub use events::EventExpander;
pub use generator::{DEFAULT_SESSION_COUNT, SessionGenerator};
pub use journey::JourneySimulator;
