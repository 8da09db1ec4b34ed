//! Problem type trait for georeferencing sessions.
//!
//! A problem type names the configuration, input, intermediate state, output
//! and export of one editor flow. Behaviour lives in step functions that
//! take `&mut GeorefSession<Self>`, not in trait methods.

use std::fmt::Debug;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

/// What a session drops when its snapshot or its config changes.
///
/// Exports are never cleared: they record documents already handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationPolicy {
    /// Drop the resolved resource and registration of the current snapshot.
    pub clear_state: bool,
    /// Drop the flow's output.
    pub clear_output: bool,
}

impl InvalidationPolicy {
    /// Per-snapshot results only; output survives.
    ///
    /// Used by flows whose output accumulates across snapshots, and for
    /// config changes, which make every registration stale.
    pub const CLEAR_STATE: Self = Self {
        clear_state: true,
        clear_output: false,
    };

    /// Per-snapshot results and output.
    pub const CLEAR_COMPUTED: Self = Self {
        clear_state: true,
        clear_output: true,
    };
}

/// Interface of a georeferencing flow.
///
/// # Associated Types
///
/// - **Config**: projection, classifier and output options.
/// - **Input**: one editor snapshot (corners, preview size, polygon, resource).
/// - **State**: intermediate results of the current snapshot.
/// - **Output**: the flow's result (one annotation, or a collection).
/// - **Export**: the document handed to the outside world.
pub trait ProblemType: Sized + 'static {
    type Config: Clone + Default + Serialize + DeserializeOwned + Debug;
    type Input: Clone + Serialize + DeserializeOwned + Debug;
    type State: Clone + Default + Serialize + DeserializeOwned + Debug;
    type Output: Clone + Serialize + DeserializeOwned + Debug;
    type Export: Clone + Serialize + DeserializeOwned + Debug;

    /// Stable snake_case identifier, stored in session files.
    fn name() -> &'static str;

    /// Sessions written with a newer schema are rejected on load.
    fn schema_version() -> u32 {
        1
    }

    /// Called by [`GeorefSession::set_input`](super::GeorefSession::set_input).
    fn validate_input(_input: &Self::Input) -> Result<()> {
        Ok(())
    }

    /// Called by [`GeorefSession::set_config`](super::GeorefSession::set_config).
    fn validate_config(_config: &Self::Config) -> Result<()> {
        Ok(())
    }

    /// Default: clear state and output, keep exports.
    fn on_input_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_COMPUTED
    }

    /// Default: registrations computed under the old config are dropped.
    fn on_config_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_STATE
    }

    fn export(output: &Self::Output, config: &Self::Config) -> Result<Self::Export>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_constants() {
        assert!(InvalidationPolicy::CLEAR_STATE.clear_state);
        assert!(!InvalidationPolicy::CLEAR_STATE.clear_output);
        assert!(InvalidationPolicy::CLEAR_COMPUTED.clear_state);
        assert!(InvalidationPolicy::CLEAR_COMPUTED.clear_output);
    }
}
