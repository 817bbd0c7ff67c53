//! dotwave-element-wasm: binds the DotWave element core to a real
//! `HTMLElement`.
//!
//! A thin JS custom element class forwards its lifecycle callbacks:
//!
//! ```js
//! class DotWaveElement extends HTMLElement {
//!   static get observedAttributes() { return observedAttributes(); }
//!   constructor() { super(); this.core = new DotWaveElementCore(this); }
//!   connectedCallback() { this.core.onAttach(); }
//!   disconnectedCallback() { this.core.onDetach(); }
//!   attributeChangedCallback(n, o, v) { this.core.onAttributeChanged(n, o, v); }
//! }
//! ```

mod engine;
mod host;

use std::cell::RefCell;
use std::rc::Rc;

use dotwave_element_core::{
    DiagnosticSink, ElementConfig, ElementError, LifecycleController, PropertyMirror,
};
use js_sys::{Array, Function};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

pub use engine::{options_to_js, JsEngineFactory, JsEngineHandle};
pub use host::DomHost;

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Best-effort message for a thrown JS value.
fn describe_js_error(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Diagnostic channel of the browser build: `console.error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn report(&self, error: &ElementError) {
        web_sys::console::error_1(&JsValue::from_str(&format!("dotwave: {error}")));
    }
}

type Controller = LifecycleController<JsEngineFactory>;

/// Run `task` one scheduling tick later (`setTimeout(task, 0)`).
fn schedule_tick(task: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        log::debug!(target: "dotwave", "no window; initializing synchronously");
        task();
        return;
    };
    let callback = Closure::once_into_js(task);
    if let Err(e) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
    {
        ConsoleSink.report(&ElementError::Host(describe_js_error(&e)));
    }
}

#[wasm_bindgen(js_name = DotWaveElementCore)]
pub struct DotWaveElement {
    element: HtmlElement,
    controller: Rc<RefCell<Controller>>,
}

impl DotWaveElement {
    fn host(&self) -> DomHost {
        DomHost::new(self.element.clone())
    }

    // Engine code may call back into the element while the controller is
    // borrowed (e.g. setting attributes from its constructor). Those calls
    // are dropped, as any notification before initialization is.
    fn with_controller<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => Some(f(&mut controller)),
            Err(_) => {
                log::debug!(target: "dotwave", "re-entrant element call dropped");
                None
            }
        }
    }
}

#[wasm_bindgen(js_class = DotWaveElementCore)]
impl DotWaveElement {
    /// Bind to `element`. `config` is an optional partial `ElementConfig`
    /// object; `factory` is an optional `(options) => handle` function used
    /// instead of the global constructor.
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlElement,
        config: JsValue,
        factory: Option<Function>,
    ) -> Result<DotWaveElement, JsError> {
        #[cfg(feature = "console_error")]
        console_error_panic_hook::set_once();

        let cfg: ElementConfig = if jsvalue_is_undefined_or_null(&config) {
            ElementConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let factory = match factory {
            Some(f) => JsEngineFactory::injected(f),
            None => JsEngineFactory::global(&cfg.engine_global),
        };
        let controller = LifecycleController::new(cfg, factory).with_sink(ConsoleSink);

        Ok(DotWaveElement {
            element,
            controller: Rc::new(RefCell::new(controller)),
        })
    }

    /// `connectedCallback`: schedules initialization for the next tick.
    #[wasm_bindgen(js_name = onAttach)]
    pub fn on_attach(&self) {
        let Some(ticket) = self.with_controller(|c| c.on_attach()).flatten() else {
            return;
        };
        let controller = Rc::clone(&self.controller);
        let mut host = self.host();
        schedule_tick(move || {
            if let Ok(mut controller) = controller.try_borrow_mut() {
                controller.complete_init(ticket, &mut host);
            }
        });
    }

    /// `disconnectedCallback`.
    #[wasm_bindgen(js_name = onDetach)]
    pub fn on_detach(&self) {
        self.with_controller(|c| c.on_detach());
    }

    /// `attributeChangedCallback`.
    #[wasm_bindgen(js_name = onAttributeChanged)]
    pub fn on_attribute_changed(
        &self,
        name: String,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        let host = self.host();
        self.with_controller(|c| {
            c.on_attribute_changed(&name, old_value.as_deref(), new_value.as_deref(), &host)
        });
    }

    pub fn pause(&self) {
        self.with_controller(|c| c.pause());
    }

    pub fn resume(&self) {
        self.with_controller(|c| c.resume());
    }

    pub fn destroy(&self) {
        self.with_controller(|c| c.destroy());
    }

    /// The live engine object, or `null`.
    #[wasm_bindgen(js_name = getEngineHandle)]
    pub fn engine_handle(&self) -> JsValue {
        self.controller
            .try_borrow()
            .ok()
            .and_then(|c| c.engine_handle().map(|h| h.as_js().clone()))
            .unwrap_or(JsValue::NULL)
    }

    /// `"uninitialized" | "initialized" | "destroyed"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.controller
            .try_borrow()
            .map(|c| c.state().as_str())
            .unwrap_or("uninitialized")
            .to_string()
    }

    #[wasm_bindgen(getter = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.controller
            .try_borrow()
            .ok()
            .and_then(|c| c.last_error().map(|e| e.to_string()))
    }

    // Property mirror. Setters only touch the attribute; the element's
    // attributeChangedCallback carries the change into the engine.

    #[wasm_bindgen(getter = numDots)]
    pub fn num_dots(&self) -> f64 {
        self.host().num_dots()
    }

    #[wasm_bindgen(setter = numDots)]
    pub fn set_num_dots(&self, value: Option<f64>) {
        report_host_error(self.host().set_num_dots(value));
    }

    #[wasm_bindgen(getter = dotColor)]
    pub fn dot_color(&self) -> String {
        self.host().dot_color()
    }

    #[wasm_bindgen(setter = dotColor)]
    pub fn set_dot_color(&self, value: Option<String>) {
        report_host_error(self.host().set_dot_color(value.as_deref()));
    }

    #[wasm_bindgen(getter = backgroundColor)]
    pub fn background_color(&self) -> String {
        self.host().background_color()
    }

    #[wasm_bindgen(setter = backgroundColor)]
    pub fn set_background_color(&self, value: Option<String>) {
        report_host_error(self.host().set_background_color(value.as_deref()));
    }

    #[wasm_bindgen(getter)]
    pub fn reactive(&self) -> bool {
        self.host().reactive()
    }

    /// Any JS value; truthiness decides, as `if (value)` would.
    #[wasm_bindgen(setter)]
    pub fn set_reactive(&self, value: JsValue) {
        report_host_error(self.host().set_reactive(value.is_truthy()));
    }
}

fn report_host_error(result: Result<(), ElementError>) {
    if let Err(err) = result {
        ConsoleSink.report(&err);
    }
}

/// Attribute names for the custom element's `observedAttributes`.
#[wasm_bindgen(js_name = observedAttributes)]
pub fn observed_attributes() -> Array {
    dotwave_element_core::observed_attributes()
        .map(JsValue::from_str)
        .collect()
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
