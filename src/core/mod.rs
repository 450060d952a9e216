pub mod updater;

pub use crate::domain::model::{LibraryFilter, LibraryKind, LibrarySection, LibraryStats};
pub use crate::domain::ports::{SinkConnector, StatsSink, StatsSource};
pub use crate::utils::error::Result;
