use crate::error::Result;
use crate::schema::{PRAGMAS, SCHEMA, TIMESTAMP_FORMAT};
use funnelscope_core::dataset::Dataset;
use rusqlite::{Connection, Row, Transaction, params};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Rows written by [`FunnelStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub sessions: usize,
    pub events: usize,
}

pub struct FunnelStore {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl FunnelStore {
    /// Open or create a store, creating missing parent directories
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!("Opening store at {}", path.display());
        let conn = Connection::open(path)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(PRAGMAS)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace all stored rows with the dataset inside one transaction
    pub fn load(&mut self, dataset: &Dataset) -> Result<LoadSummary> {
        tracing::debug!(
            "Loading {} sessions and {} events",
            dataset.sessions.len(),
            dataset.events.len()
        );

        let tx = self.conn.transaction()?;
        tx.execute_batch("DELETE FROM events; DELETE FROM sessions;")?;
        Self::insert_sessions(&tx, dataset)?;
        Self::insert_events(&tx, dataset)?;
        tx.commit()?;

        let summary = LoadSummary {
            sessions: dataset.sessions.len(),
            events: dataset.events.len(),
        };
        tracing::info!(
            "Loaded {} sessions and {} events",
            summary.sessions,
            summary.events
        );
        Ok(summary)
    }

    fn insert_sessions(tx: &Transaction, dataset: &Dataset) -> Result<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO sessions (
                session_id, user_id, timestamp, date, hour, day_of_week,
                traffic_source, device, location, category, is_returning,
                landed, viewed_product, added_to_cart, started_checkout, completed_purchase,
                session_duration_seconds, pages_viewed, bounced, revenue, ad_spend
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                       ?16, ?17, ?18, ?19, ?20, ?21)",
        )?;

        for s in &dataset.sessions {
            stmt.execute(params![
                s.session_id as i64,
                s.user_id as i64,
                s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                s.date().to_string(),
                s.hour(),
                s.day_of_week(),
                s.traffic_source,
                s.device,
                s.location,
                s.category,
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
                s.ad_spend,
            ])?;
        }
        Ok(())
    }

    fn insert_events(tx: &Transaction, dataset: &Dataset) -> Result<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO events (event_id, session_id, user_id, timestamp, event_type, page)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for e in &dataset.events {
            stmt.execute(params![
                e.event_id as i64,
                e.session_id as i64,
                e.user_id as i64,
                e.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                e.event_type.as_str(),
                e.page.as_str(),
            ])?;
        }
        Ok(())
    }

    pub fn session_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?)
    }

    pub fn event_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?)
    }

    pub(crate) fn query_rows<T, F>(&self, sql: &str, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    pub(crate) fn query_one<T, F>(&self, sql: &str, map: F) -> Result<T>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self.conn.query_row(sql, [], map)?)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use funnelscope_core::dataset::Dataset;
    use funnelscope_core::simulate::{EventExpander, SessionGenerator};
    use funnelscope_core::SimulationTables;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub fn dataset(count: usize, seed: u64) -> Dataset {
        let tables = SimulationTables::default();
        let end = chrono::NaiveDate::from_ymd_opt(2026, 6, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let generator = SessionGenerator::new(&tables).unwrap().with_window_end(end);
        let mut rng = StdRng::seed_from_u64(seed);
        let sessions = generator.generate(count, &mut rng).unwrap();
        let events = EventExpander::new().expand(&sessions, &mut rng);
        Dataset::new(sessions, events)
    }
}
