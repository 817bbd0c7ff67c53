//! Developer-facing diagnostic channel.

use serde::{Deserialize, Serialize};

use crate::error::ElementError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg { enabled: true }
    }
}

/// Receives failures the controller contains instead of propagating.
pub trait DiagnosticSink {
    fn report(&self, error: &ElementError);
}

/// Default sink: the `log` facade at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, error: &ElementError) {
        log::error!(target: "dotwave", "{error}");
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&ElementError),
{
    fn report(&self, error: &ElementError) {
        self(error)
    }
}
