//! DotWave element core (host-agnostic)
//!
//! Reflects a fixed set of element attributes into a typed options object and
//! drives an externally supplied animation engine through construct / update /
//! destroy in step with the element lifecycle. Browser bindings live in
//! `dotwave-element-wasm`; this crate has no DOM dependency.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod host;
pub mod mirror;
pub mod options;
pub mod schema;
pub mod sizing;

// Re-exports for hosts
pub use config::ElementConfig;
pub use controller::{InitOutcome, InitTicket, LifecycleController, UpdateOutcome, WidgetState};
pub use diagnostics::{DiagnosticSink, DiagnosticsCfg, LogSink};
pub use engine::{EngineFactory, EngineHandle};
pub use error::ElementError;
pub use host::ElementHost;
pub use mirror::PropertyMirror;
pub use options::{read_options, AttributeSource, OptionsObject};
pub use schema::{
    format_js_number, observed_attributes, parse_float_prefix, parse_int_prefix, resolve,
    AttributeDescriptor, AttributeValue, DefaultValue, ValueType, ATTRIBUTES,
};
pub use sizing::{apply_sizing, SizingReport};
