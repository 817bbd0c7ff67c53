//! Element configuration.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticsCfg;

/// Per-element configuration. Every field has a default so hosts can pass a
/// partial object (or nothing at all).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Name of the global constructor used when no factory is injected.
    pub engine_global: String,
    /// Inline width applied when the element measures zero wide.
    pub fallback_width: String,
    /// Inline height applied when the element measures zero tall.
    pub fallback_height: String,
    /// Skip a deferred initialization whose element is no longer attached.
    pub guard_detached_init: bool,
    /// Run the one-time sizing heuristic before construction.
    pub apply_sizing: bool,
    pub diagnostics: DiagnosticsCfg,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            engine_global: "DotWave".to_string(),
            fallback_width: "100%".to_string(),
            fallback_height: "400px".to_string(),
            guard_detached_init: true,
            apply_sizing: true,
            diagnostics: DiagnosticsCfg::default(),
        }
    }
}

impl ElementConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(raw: &str) -> Result<Self, crate::ElementError> {
        serde_json::from_str(raw).map_err(|e| crate::ElementError::Config(e.to_string()))
    }
}
