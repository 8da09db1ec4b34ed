//! Session container for one editor flow.
//!
//! The session replaces the editor's global state: configuration, the
//! current snapshot, intermediate results and the output live here and step
//! functions mutate it in place.

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use super::problem_type::{InvalidationPolicy, ProblemType};
use super::types::{ExportRecord, LogEntry, SessionMetadata};

/// Mutable state container parameterized over a flow.
///
/// - Input changes apply [`ProblemType::on_input_change`].
/// - Config changes apply [`ProblemType::on_config_change`].
/// - Every export is recorded in [`Self::exports`].
///
/// ```no_run
/// use georef_pipeline::capture::{EditorSnapshot, NoFallback};
/// use georef_pipeline::session::GeorefSession;
/// use georef_pipeline::single_save::{SingleSaveProblem, run_save};
/// use georef_pipeline::Annotation;
///
/// fn save(snapshot: EditorSnapshot) -> anyhow::Result<Annotation> {
///     let mut session = GeorefSession::<SingleSaveProblem>::new();
///     session.set_input(snapshot)?;
///     run_save(&mut session, &NoFallback)?;
///     session.export()
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "P: ProblemType")]
pub struct GeorefSession<P: ProblemType> {
    pub metadata: SessionMetadata,
    /// Always present; defaults until set.
    pub config: P::Config,
    input: Option<P::Input>,
    pub state: P::State,
    output: Option<P::Output>,
    pub exports: Vec<ExportRecord<P::Export>>,
    /// Audit trail of the step functions.
    pub log: Vec<LogEntry>,
}

impl<P: ProblemType> GeorefSession<P> {
    pub fn new() -> Self {
        Self {
            metadata: SessionMetadata::new(P::name(), P::schema_version()),
            config: P::Config::default(),
            input: None,
            state: P::State::default(),
            output: None,
            exports: Vec::new(),
            log: Vec::new(),
        }
    }

    fn invalidate(&mut self, policy: InvalidationPolicy) {
        if policy.clear_state {
            self.state = P::State::default();
        }
        if policy.clear_output {
            self.output = None;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Input rejected by [`ProblemType::validate_input`]; the session is left
    /// untouched.
    pub fn set_input(&mut self, input: P::Input) -> Result<()> {
        P::validate_input(&input)?;
        self.invalidate(P::on_input_change());
        self.input = Some(input);
        self.metadata.touch();
        Ok(())
    }

    pub fn require_input(&self) -> Result<&P::Input> {
        self.input.as_ref().ok_or_else(|| anyhow!("input not set"))
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Config rejected by [`ProblemType::validate_config`].
    pub fn set_config(&mut self, config: P::Config) -> Result<()> {
        P::validate_config(&config)?;
        self.invalidate(P::on_config_change());
        self.config = config;
        self.metadata.touch();
        Ok(())
    }

    /// Edit a copy of the config, then validate and apply it.
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut P::Config),
    {
        let mut next = self.config.clone();
        f(&mut next);
        self.set_config(next)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    pub fn output(&self) -> Option<&P::Output> {
        self.output.as_ref()
    }

    pub fn require_output(&self) -> Result<&P::Output> {
        self.output
            .as_ref()
            .ok_or_else(|| anyhow!("output not computed"))
    }

    pub fn set_output(&mut self, output: P::Output) {
        self.output = Some(output);
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// Convert the output and record the export.
    pub fn export(&mut self) -> Result<P::Export> {
        let export = self.convert_output()?;
        self.exports.push(ExportRecord::new(export.clone()));
        self.metadata.touch();
        Ok(export)
    }

    fn convert_output(&self) -> Result<P::Export> {
        P::export(self.require_output()?, &self.config)
    }

    /// Input present and valid, config valid.
    pub fn validate(&self) -> Result<()> {
        P::validate_input(self.require_input()?)?;
        P::validate_config(&self.config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    pub fn log_success(&mut self, operation: impl Into<String>) {
        self.log.push(LogEntry::success(operation));
        self.metadata.touch();
    }

    pub fn log_success_with_notes(
        &mut self,
        operation: impl Into<String>,
        notes: impl Into<String>,
    ) {
        self.log
            .push(LogEntry::success_with_notes(operation, notes));
        self.metadata.touch();
    }

    pub fn log_failure(&mut self, operation: impl Into<String>, error: impl Into<String>) {
        self.log.push(LogEntry::failure(operation, error));
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// # Errors
    ///
    /// Malformed JSON, or a schema version newer than this build supports.
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;
        if session.metadata.schema_version > P::schema_version() {
            bail!(
                "session schema version {} is newer than supported version {}",
                session.metadata.schema_version,
                P::schema_version()
            );
        }
        Ok(session)
    }
}

impl<P: ProblemType> Default for GeorefSession<P> {
    fn default() -> Self {
        Self::new()
    }
}
