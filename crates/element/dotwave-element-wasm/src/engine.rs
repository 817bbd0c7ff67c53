//! The external engine reached through JavaScript: either an injected
//! factory function `(options) => handle` or a global constructor looked up
//! by name at initialization time.

use dotwave_element_core::{ElementError, EngineFactory, EngineHandle, OptionsObject};
use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::{describe_js_error, jsvalue_is_undefined_or_null};

#[derive(Clone, Debug)]
enum EngineSource {
    Global(String),
    Factory(Function),
}

#[derive(Clone, Debug)]
pub struct JsEngineFactory {
    source: EngineSource,
}

impl JsEngineFactory {
    /// `new globalThis[name](options)`.
    pub fn global(name: &str) -> Self {
        Self {
            source: EngineSource::Global(name.to_string()),
        }
    }

    /// `factory(options)`.
    pub fn injected(factory: Function) -> Self {
        Self {
            source: EngineSource::Factory(factory),
        }
    }

    fn lookup_global(name: &str) -> Option<Function> {
        Reflect::get(&js_sys::global(), &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.dyn_into::<Function>().ok())
    }
}

impl EngineFactory for JsEngineFactory {
    type Container = HtmlElement;
    type Handle = JsEngineHandle;

    fn name(&self) -> &str {
        match &self.source {
            EngineSource::Global(name) => name,
            EngineSource::Factory(_) => "engine factory",
        }
    }

    fn is_available(&self) -> bool {
        match &self.source {
            EngineSource::Global(name) => Self::lookup_global(name).is_some(),
            EngineSource::Factory(_) => true,
        }
    }

    fn construct(
        &mut self,
        container: &HtmlElement,
        options: &OptionsObject,
    ) -> Result<JsEngineHandle, ElementError> {
        let js_options =
            options_to_js(options, Some(container)).map_err(ElementError::ConstructionFailure)?;

        let created = match &self.source {
            EngineSource::Global(name) => {
                let ctor = Self::lookup_global(name)
                    .ok_or_else(|| ElementError::MissingEngine { name: name.clone() })?;
                Reflect::construct(&ctor, &Array::of1(&js_options))
            }
            EngineSource::Factory(factory) => factory.call1(&JsValue::UNDEFINED, &js_options),
        }
        .map_err(|e| ElementError::ConstructionFailure(describe_js_error(&e)))?;

        if jsvalue_is_undefined_or_null(&created) {
            return Err(ElementError::ConstructionFailure(
                "factory returned no engine handle".to_string(),
            ));
        }
        Ok(JsEngineHandle { inner: created })
    }
}

/// Live JS engine object.
#[derive(Clone, Debug)]
pub struct JsEngineHandle {
    inner: JsValue,
}

impl JsEngineHandle {
    pub fn as_js(&self) -> &JsValue {
        &self.inner
    }

    fn call(&self, method: &'static str, args: &Array) -> Result<(), ElementError> {
        let f = Reflect::get(&self.inner, &JsValue::from_str(method))
            .map_err(|e| ElementError::engine_call(method, describe_js_error(&e)))?
            .dyn_into::<Function>()
            .map_err(|_| ElementError::engine_call(method, "not a function"))?;
        Reflect::apply(&f, &self.inner, args)
            .map(|_| ())
            .map_err(|e| ElementError::engine_call(method, describe_js_error(&e)))
    }
}

impl EngineHandle for JsEngineHandle {
    fn update_options(&mut self, options: &OptionsObject) -> Result<(), ElementError> {
        let js_options = options_to_js(options, None)
            .map_err(|reason| ElementError::engine_call("updateOptions", reason))?;
        self.call("updateOptions", &Array::of1(&js_options))
    }

    fn pause(&mut self) -> Result<(), ElementError> {
        self.call("pause", &Array::new())
    }

    fn resume(&mut self) -> Result<(), ElementError> {
        self.call("resume", &Array::new())
    }

    fn destroy(&mut self) -> Result<(), ElementError> {
        self.call("destroy", &Array::new())
    }
}

/// Plain JS object of the options; `container` is attached only when given.
pub fn options_to_js(
    options: &OptionsObject,
    container: Option<&HtmlElement>,
) -> Result<JsValue, String> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    let value = options
        .serialize(&serializer)
        .map_err(|e| format!("options error: {e}"))?;
    if let Some(container) = container {
        Reflect::set(&value, &JsValue::from_str("container"), container)
            .map_err(|e| describe_js_error(&e))?;
    }
    Ok(value)
}
