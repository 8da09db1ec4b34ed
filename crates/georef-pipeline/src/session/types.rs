//! Session bookkeeping: metadata, audit log and export records.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// From `ProblemType::name()`.
    pub problem_type: String,
    /// From `ProblemType::schema_version()`.
    pub schema_version: u32,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub last_modified: u64,
}

impl SessionMetadata {
    pub fn new(problem_type: impl Into<String>, schema_version: u32) -> Self {
        let now = current_timestamp();
        Self {
            problem_type: problem_type.into(),
            schema_version,
            created_at: now,
            last_modified: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = current_timestamp();
    }
}

/// One step of the session's audit trail. Not meant for replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: u64,
    /// Step name, e.g. `"resolve_resource"`, `"register"`, `"save_item"`.
    pub operation: String,
    pub success: bool,
    /// Notes on success, the error message on failure.
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn success(operation: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: None,
        }
    }

    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::success(operation)
        }
    }

    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: false,
            notes: Some(error.into()),
        }
    }
}

/// A document produced by [`GeorefSession::export`](super::GeorefSession::export).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord<E> {
    pub timestamp: u64,
    pub export: E,
}

impl<E> ExportRecord<E> {
    pub fn new(export: E) -> Self {
        Self {
            timestamp: current_timestamp(),
            export,
        }
    }
}

/// Seconds since the Unix epoch; 0 if the clock is set before it.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_touch_is_monotonic() {
        let mut meta = SessionMetadata::new("georef_project_v1", 1);
        assert_eq!(meta.problem_type, "georef_project_v1");
        assert!(meta.created_at > 0);
        assert_eq!(meta.created_at, meta.last_modified);
        let before = meta.last_modified;
        meta.touch();
        assert!(meta.last_modified >= before);
    }

    #[test]
    fn failures_carry_the_error() {
        let failed = LogEntry::failure("resolve_resource", "native size unknown");
        assert!(!failed.success);
        assert_eq!(failed.notes.as_deref(), Some("native size unknown"));
    }
}
