//! Session framework shared by the editor flows.
//!
//! A [`GeorefSession`] stores configuration, the current editor snapshot,
//! intermediate state and the output of one flow; step functions of the
//! flow mutate it in place.

pub mod georef_session;
pub mod problem_type;
pub mod types;

pub use georef_session::GeorefSession;
pub use problem_type::{InvalidationPolicy, ProblemType};
pub use types::{ExportRecord, LogEntry, SessionMetadata, current_timestamp};
