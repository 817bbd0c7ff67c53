use thiserror::Error;

/// Failures the element can run into. None of these escape a lifecycle
/// callback; they are reported to the diagnostic sink and recorded as the
/// controller's last error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("{name} library is not loaded; include it before the custom element")]
    MissingEngine { name: String },

    #[error("error initializing engine: {0}")]
    ConstructionFailure(String),

    #[error("engine call `{method}` failed: {reason}")]
    EngineCall { method: &'static str, reason: String },

    #[error("host rejected write: {0}")]
    Host(String),

    #[error("invalid element config: {0}")]
    Config(String),
}

impl ElementError {
    pub fn engine_call(method: &'static str, reason: impl Into<String>) -> Self {
        ElementError::EngineCall {
            method,
            reason: reason.into(),
        }
    }
}
