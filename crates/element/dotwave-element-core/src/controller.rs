//! LifecycleController: drives one engine handle through construct / update /
//! destroy in step with the element's attach, detach and attribute-change
//! notifications.
//!
//! Transitions:
//! - attach: `Destroyed -> Uninitialized`, then a deferred init ticket is issued
//! - init (ticket or direct): `Uninitialized -> Initialized` on success
//! - attribute change: forwarded as an options update only while `Initialized`
//! - detach / destroy: `Initialized -> Destroyed`
//!
//! Failures never escape; they go to the diagnostic sink and `last_error`.

use std::fmt;

use crate::config::ElementConfig;
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::engine::{EngineFactory, EngineHandle};
use crate::error::ElementError;
use crate::host::ElementHost;
use crate::options::read_options;
use crate::schema;
use crate::sizing::apply_sizing;

/// Externally visible widget state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WidgetState {
    Uninitialized,
    Initialized,
    Destroyed,
}

impl WidgetState {
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetState::Uninitialized => "uninitialized",
            WidgetState::Initialized => "initialized",
            WidgetState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `Initialized` owns the handle, so an initialized widget without one cannot
// be represented.
enum Lifecycle<H> {
    Uninitialized,
    Initialized(H),
    Destroyed,
}

/// Proof that an attach scheduled a deferred initialization. Only the most
/// recently issued ticket is honoured.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InitTicket(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum InitOutcome {
    Constructed,
    AlreadyInitialized,
    /// The ticket was superseded by a later attach or cancelled by a detach.
    Stale,
    /// The element was detached before the deferred tick ran.
    Detached,
    /// Explicitly destroyed; a fresh attach is required first.
    Destroyed,
    Failed(ElementError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    Applied,
    /// Old and new raw values are identical.
    Unchanged,
    /// Dropped: no live handle. Not queued.
    NotInitialized,
    Unrecognized,
    Failed(ElementError),
}

pub struct LifecycleController<F: EngineFactory> {
    config: ElementConfig,
    factory: F,
    lifecycle: Lifecycle<F::Handle>,
    generation: u64,
    pending: Option<u64>,
    sink: Box<dyn DiagnosticSink>,
    last_error: Option<ElementError>,
}

impl<F: EngineFactory> fmt::Debug for LifecycleController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("state", &self.state())
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl<F: EngineFactory> LifecycleController<F> {
    pub fn new(config: ElementConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            lifecycle: Lifecycle::Uninitialized,
            generation: 0,
            pending: None,
            sink: Box::new(LogSink),
            last_error: None,
        }
    }

    /// Replace the diagnostic sink (defaults to [`LogSink`]).
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    pub fn state(&self) -> WidgetState {
        match self.lifecycle {
            Lifecycle::Uninitialized => WidgetState::Uninitialized,
            Lifecycle::Initialized(_) => WidgetState::Initialized,
            Lifecycle::Destroyed => WidgetState::Destroyed,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Initialized(_))
    }

    pub fn engine_handle(&self) -> Option<&F::Handle> {
        match &self.lifecycle {
            Lifecycle::Initialized(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&ElementError> {
        self.last_error.as_ref()
    }

    /// Whether a deferred initialization is outstanding.
    pub fn has_pending_init(&self) -> bool {
        self.pending.is_some()
    }

    /// Element attached. Returns the ticket the host must hand back to
    /// [`complete_init`](Self::complete_init) one scheduling tick later, or
    /// `None` when already initialized.
    pub fn on_attach(&mut self) -> Option<InitTicket> {
        match self.lifecycle {
            Lifecycle::Initialized(_) => {
                log::debug!(target: "dotwave", "attach ignored: already initialized");
                return None;
            }
            Lifecycle::Destroyed => self.lifecycle = Lifecycle::Uninitialized,
            Lifecycle::Uninitialized => {}
        }
        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(self.generation);
        Some(InitTicket(self.generation))
    }

    /// Body of the deferred tick scheduled by [`on_attach`](Self::on_attach).
    pub fn complete_init<H>(&mut self, ticket: InitTicket, host: &mut H) -> InitOutcome
    where
        H: ElementHost<Container = F::Container> + ?Sized,
    {
        if self.pending != Some(ticket.0) {
            log::debug!(target: "dotwave", "init ticket {} is stale", ticket.0);
            return InitOutcome::Stale;
        }
        self.pending = None;

        if self.config.guard_detached_init && !host.is_connected() {
            log::debug!(target: "dotwave", "element detached before init tick; skipping");
            return InitOutcome::Detached;
        }
        self.initialize(host)
    }

    /// Read attributes, size the element and construct the engine. A no-op
    /// when already initialized.
    pub fn initialize<H>(&mut self, host: &mut H) -> InitOutcome
    where
        H: ElementHost<Container = F::Container> + ?Sized,
    {
        match self.try_initialize(host) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(err.clone());
                InitOutcome::Failed(err)
            }
        }
    }

    fn try_initialize<H>(&mut self, host: &mut H) -> Result<InitOutcome, ElementError>
    where
        H: ElementHost<Container = F::Container> + ?Sized,
    {
        match self.lifecycle {
            Lifecycle::Initialized(_) => return Ok(InitOutcome::AlreadyInitialized),
            Lifecycle::Destroyed => return Ok(InitOutcome::Destroyed),
            Lifecycle::Uninitialized => {}
        }

        if !self.factory.is_available() {
            return Err(ElementError::MissingEngine {
                name: self.factory.name().to_string(),
            });
        }

        let options = read_options(&*host);

        // A rejected style write is reported but does not block construction.
        let mut sizing_error = None;
        if self.config.apply_sizing {
            match apply_sizing(host, &self.config) {
                Ok(report) if report.any() => {
                    log::debug!(target: "dotwave", "sizing adjusted: {report:?}")
                }
                Ok(_) => {}
                Err(err) => {
                    self.report(err.clone());
                    sizing_error = Some(err);
                }
            }
        }

        let handle = self.factory.construct(host.container(), &options)?;
        self.lifecycle = Lifecycle::Initialized(handle);
        self.last_error = sizing_error;
        log::debug!(
            target: "dotwave",
            "{} constructed with {} option(s)",
            self.factory.name(),
            options.len()
        );
        Ok(InitOutcome::Constructed)
    }

    /// Observed attribute changed. Rebuilds the full options object from the
    /// current attributes and forwards it to the handle.
    pub fn on_attribute_changed<H>(
        &mut self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
        host: &H,
    ) -> UpdateOutcome
    where
        H: ElementHost<Container = F::Container> + ?Sized,
    {
        if old_value == new_value {
            return UpdateOutcome::Unchanged;
        }
        let Lifecycle::Initialized(handle) = &mut self.lifecycle else {
            log::debug!(target: "dotwave", "dropping change to `{name}`: not initialized");
            return UpdateOutcome::NotInitialized;
        };
        if schema::resolve(name).is_none() {
            return UpdateOutcome::Unrecognized;
        }

        let options = read_options(host);
        match handle.update_options(&options) {
            Ok(()) => UpdateOutcome::Applied,
            Err(err) => {
                self.report(err.clone());
                UpdateOutcome::Failed(err)
            }
        }
    }

    /// Element detached. Destroys the live handle, if any.
    pub fn on_detach(&mut self) -> bool {
        if self.config.guard_detached_init {
            self.pending = None;
        }
        self.teardown()
    }

    /// Explicit destroy; same effect as a detach on the handle. Returns
    /// whether a handle was destroyed.
    pub fn destroy(&mut self) -> bool {
        self.teardown()
    }

    pub fn pause(&mut self) -> bool {
        self.forward("pause", |handle| handle.pause())
    }

    pub fn resume(&mut self) -> bool {
        self.forward("resume", |handle| handle.resume())
    }

    fn forward(
        &mut self,
        method: &'static str,
        call: impl FnOnce(&mut F::Handle) -> Result<(), ElementError>,
    ) -> bool {
        let Lifecycle::Initialized(handle) = &mut self.lifecycle else {
            log::debug!(target: "dotwave", "{method} ignored: no engine handle");
            return false;
        };
        if let Err(err) = call(handle) {
            self.report(err);
        }
        true
    }

    fn teardown(&mut self) -> bool {
        if !self.is_initialized() {
            return false;
        }
        if let Lifecycle::Initialized(mut handle) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::Destroyed)
        {
            // The handle is released even when the engine reports a failure.
            if let Err(err) = handle.destroy() {
                self.report(err);
            }
        }
        true
    }

    fn report(&mut self, err: ElementError) {
        if self.config.diagnostics.enabled {
            self.sink.report(&err);
        }
        self.last_error = Some(err);
    }
}
