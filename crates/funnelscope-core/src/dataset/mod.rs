mod reader;
mod writer;

pub use reader::DatasetReader;
pub use writer::{DatasetWriter, csv_field};

use crate::model::{Event, Session};
use serde::{Deserialize, Serialize};

/// File name of the JSON dataset inside a data directory
pub const DATASET_FILE: &str = "dataset.json";
/// File name of the sessions CSV export
pub const SESSIONS_CSV: &str = "sessions_data.csv";
/// File name of the events CSV export
pub const EVENTS_CSV: &str = "events_data.csv";

/// A generated batch of sessions and its event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Seed used to generate the batch, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Dataset {
    pub fn new(sessions: Vec<Session>, events: Vec<Event>) -> Self {
        Self {
            seed: None,
            sessions,
            events,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
