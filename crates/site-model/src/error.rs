//! The four error kinds from the error-handling design, collapsed
//! into one sum type. Every variant carries a structured payload — never a
//! forwarded source error's `Display` text — so it stays safe to hand back
//! to a caller.

use thiserror::Error;

/// A single structured field-level complaint.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum SiteError {
    /// Request shape or numeric invariant violated. Fatal: aborts the run
    /// before any stage runs.
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldViolation>),

    /// An optional external dependency degraded (cache unavailable,
    /// isochrone call failed, uniqueness below threshold, token budget
    /// exhausted). Not fatal — the run continues with a deterministic
    /// fallback and records the reason.
    #[error("degraded: {reason}")]
    Degradation { reason: String },

    /// A weight or constraint fell outside its configured bound. Not fatal
    /// — the value is clamped and the violation recorded.
    #[error("guardrail violation on {field}: {reason}")]
    Guardrail { field: String, reason: String },

    /// Run-level time or memory budget exceeded. Fatal: returns best-effort
    /// partial results with `degraded = true`.
    #[error("system limit exceeded: {0}")]
    SystemLimit(String),

    /// No candidates survived grid generation or a required input was
    /// absent/empty where a result was mandatory.
    #[error("no candidates available: {0}")]
    NoCandidates(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;
