pub(crate) const PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
";

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    session_id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    date TEXT NOT NULL,
    hour INTEGER NOT NULL,
    day_of_week TEXT NOT NULL,
    traffic_source TEXT NOT NULL,
    device TEXT NOT NULL,
    location TEXT NOT NULL,
    category TEXT NOT NULL,
    is_returning INTEGER NOT NULL,
    landed INTEGER NOT NULL,
    viewed_product INTEGER NOT NULL,
    added_to_cart INTEGER NOT NULL,
    started_checkout INTEGER NOT NULL,
    completed_purchase INTEGER NOT NULL,
    session_duration_seconds INTEGER NOT NULL,
    pages_viewed INTEGER NOT NULL,
    bounced INTEGER NOT NULL,
    revenue REAL NOT NULL,
    ad_spend REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id INTEGER PRIMARY KEY,
    session_id INTEGER NOT NULL REFERENCES sessions(session_id),
    user_id INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    event_type TEXT NOT NULL,
    page TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_source ON sessions(traffic_source);
CREATE INDEX IF NOT EXISTS idx_events_session ON events(session_id);
";

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
