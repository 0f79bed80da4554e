use super::Dataset;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct DatasetReader;

impl DatasetReader {
    /// Read and parse a dataset JSON file from the given path
    pub fn from_file(path: &Path) -> Result<Dataset> {
        tracing::debug!("Reading dataset from: {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let dataset: Dataset = serde_json::from_reader(reader)?;

        tracing::info!(
            "Loaded dataset with {} sessions and {} events",
            dataset.sessions.len(),
            dataset.events.len()
        );

        Ok(dataset)
    }

    /// Parse a dataset from a JSON string
    pub fn from_str(content: &str) -> Result<Dataset> {
        tracing::debug!("Parsing dataset from string");

        let dataset: Dataset = serde_json::from_str(content)?;
        Ok(dataset)
    }

    /// Validate that a dataset is internally consistent
    pub fn validate(dataset: &Dataset) -> Result<()> {
        tracing::debug!("Validating dataset");

        if dataset.sessions.is_empty() {
            tracing::warn!("Dataset contains no sessions");
        }

        let mut session_ids = HashSet::with_capacity(dataset.sessions.len());
        for session in &dataset.sessions {
            if !session_ids.insert(session.session_id) {
                return Err(Error::InvalidDataset(format!(
                    "Duplicate session id {}",
                    session.display_id()
                )));
            }
            if !session.is_monotonic() {
                return Err(Error::InvalidDataset(format!(
                    "Session {} has inconsistent funnel flags",
                    session.display_id()
                )));
            }
        }

        let mut last_event_id = 0;
        for event in &dataset.events {
            if event.event_id <= last_event_id {
                return Err(Error::InvalidDataset(format!(
                    "Event {} is out of order",
                    event.display_id()
                )));
            }
            last_event_id = event.event_id;

            if !session_ids.contains(&event.session_id) {
                return Err(Error::InvalidDataset(format!(
                    "Event {} references unknown session {}",
                    event.display_id(),
                    event.session_id
                )));
            }
        }

        tracing::debug!("Dataset is valid");
        Ok(())
    }
}
