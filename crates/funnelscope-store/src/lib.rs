// SQLite sink for generated datasets and the fixed analytical query battery

pub mod error;
pub mod queries;
mod schema;
pub mod store;

pub use error::{Error, Result};
pub use queries::{NamedQuery, QUERY_CATALOG, render_catalog};
pub use store::{FunnelStore, LoadSummary};
