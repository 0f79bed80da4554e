use super::{Dataset, EVENTS_CSV, SESSIONS_CSV};
use crate::Result;
use crate::model::{Event, Session};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const SESSION_COLUMNS: &str = "session_id,user_id,timestamp,date,hour,day_of_week,traffic_source,\
device,location,category,is_returning,landed,viewed_product,added_to_cart,started_checkout,\
completed_purchase,session_duration_seconds,pages_viewed,bounced,revenue,ad_spend";

const EVENT_COLUMNS: &str = "event_id,session_id,user_id,timestamp,event_type,page";

pub struct DatasetWriter;

impl DatasetWriter {
    /// Write a dataset to a JSON file, creating parent directories as needed
    pub fn to_file(dataset: &Dataset, path: &Path) -> Result<()> {
        tracing::debug!("Writing dataset to: {}", path.display());

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, dataset)?;

        tracing::info!(
            "Wrote dataset with {} sessions to {}",
            dataset.sessions.len(),
            path.display()
        );

        Ok(())
    }

    /// Convert a dataset to a pretty-printed JSON string
    pub fn to_string(dataset: &Dataset) -> Result<String> {
        Ok(serde_json::to_string_pretty(dataset)?)
    }

    /// Export sessions and events as CSV files inside `dir`.
    ///
    /// Returns the paths of the sessions and events files.
    pub fn to_csv(dataset: &Dataset, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)?;

        let sessions_path = dir.join(SESSIONS_CSV);
        let events_path = dir.join(EVENTS_CSV);

        let mut out = BufWriter::new(File::create(&sessions_path)?);
        Self::write_sessions_csv(&dataset.sessions, &mut out)?;
        out.flush()?;

        let mut out = BufWriter::new(File::create(&events_path)?);
        Self::write_events_csv(&dataset.events, &mut out)?;
        out.flush()?;

        tracing::info!(
            "Exported CSV files: {} and {}",
            sessions_path.display(),
            events_path.display()
        );

        Ok((sessions_path, events_path))
    }

    pub fn write_sessions_csv<W: Write>(sessions: &[Session], out: &mut W) -> Result<()> {
        writeln!(out, "{}", SESSION_COLUMNS)?;
        for s in sessions {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{:.2},{}",
                s.display_id(),
                s.display_user_id(),
                s.timestamp.format("%Y-%m-%d %H:%M:%S"),
                s.date(),
                s.hour(),
                s.day_of_week(),
                csv_field(&s.traffic_source),
                csv_field(&s.device),
                csv_field(&s.location),
                csv_field(&s.category),
                s.is_returning,
                s.landed,
                s.viewed_product,
                s.added_to_cart,
                s.started_checkout,
                s.completed_purchase,
                s.session_duration_seconds,
                s.pages_viewed,
                s.bounced(),
                s.revenue,
                s.ad_spend
            )?;
        }
        Ok(())
    }

    pub fn write_events_csv<W: Write>(events: &[Event], out: &mut W) -> Result<()> {
        writeln!(out, "{}", EVENT_COLUMNS)?;
        for e in events {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                e.display_id(),
                crate::model::format_session_id(e.session_id),
                crate::model::format_user_id(e.user_id),
                e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                e.event_type.as_str(),
                e.page.as_str()
            )?;
        }
        Ok(())
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
