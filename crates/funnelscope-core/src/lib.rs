pub mod analysis;
pub mod dataset;
pub mod error;
pub mod model;
pub mod simulate;
pub mod tables;

pub use error::{Error, Result};
pub use model::{Event, EventType, FunnelStage, JourneyOutcome, Page, Session};
pub use tables::SimulationTables;
