use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

use dotwave_element_core::{
    AttributeSource, ElementError, ElementHost, EngineFactory, EngineHandle, LifecycleController,
    OptionsObject, UpdateOutcome,
};

static SCENARIOS: Lazy<HashMap<String, Scenario>> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/scenarios.json");
    serde_json::from_str(raw).expect("fixtures scenarios should parse")
});

/// Attribute markup plus the options it must coerce to.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub attributes: BTreeMap<String, String>,
    pub expected: OptionsObject,
}

pub fn scenario(name: &str) -> Result<Scenario> {
    SCENARIOS
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("unknown scenario '{name}'"))
}

pub fn scenario_names() -> Vec<String> {
    let mut names: Vec<String> = SCENARIOS.keys().cloned().collect();
    names.sort();
    names
}

/// Attached fake element carrying the scenario's attributes.
pub fn element_for(name: &str) -> Result<FakeElement> {
    let sc = scenario(name).with_context(|| format!("building element for '{name}'"))?;
    let mut el = FakeElement::new(name);
    for (attr, value) in &sc.attributes {
        el.insert_attribute(attr, value);
    }
    el.connected = true;
    Ok(el)
}

/// One `attributeChangedCallback` the fake DOM would have delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// In-memory element. Attribute writes queue change notifications exactly
/// like the DOM does (every `set_attribute`, and removal of a present
/// attribute); tests deliver them with [`deliver_changes`].
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub id: String,
    pub connected: bool,
    pub reject_styles: bool,
    attributes: BTreeMap<String, String>,
    computed: HashMap<String, String>,
    inline: HashMap<String, String>,
    read_only_styles: Vec<String>,
    changes: Vec<AttributeChange>,
}

impl FakeElement {
    /// Unattached element with the computed style of an unstyled custom tag.
    pub fn new(id: &str) -> Self {
        let computed = [
            ("display", "inline"),
            ("position", "static"),
            ("width", "0px"),
            ("height", "0px"),
            ("overflow", "visible"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            id: id.to_string(),
            connected: false,
            reject_styles: false,
            attributes: BTreeMap::new(),
            computed,
            inline: HashMap::new(),
            read_only_styles: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Set an attribute as parsed markup would: no change notification.
    pub fn insert_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn set_computed(&mut self, property: &str, value: &str) {
        self.computed.insert(property.to_string(), value.to_string());
    }

    pub fn set_inline(&mut self, property: &str, value: &str) {
        self.inline.insert(property.to_string(), value.to_string());
    }

    /// Make writes to one style property fail.
    pub fn reject_style(&mut self, property: &str) {
        self.read_only_styles.push(property.to_string());
    }

    pub fn inline(&self, property: &str) -> Option<&str> {
        self.inline.get(property).map(String::as_str)
    }

    pub fn pending_changes(&self) -> &[AttributeChange] {
        &self.changes
    }

    pub fn take_changes(&mut self) -> Vec<AttributeChange> {
        std::mem::take(&mut self.changes)
    }
}

impl AttributeSource for FakeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

impl ElementHost for FakeElement {
    type Container = str;

    fn container(&self) -> &str {
        &self.id
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), ElementError> {
        let old_value = self.attributes.insert(name.to_string(), value.to_string());
        self.changes.push(AttributeChange {
            name: name.to_string(),
            old_value,
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, name: &str) -> Result<(), ElementError> {
        if let Some(old) = self.attributes.remove(name) {
            self.changes.push(AttributeChange {
                name: name.to_string(),
                old_value: Some(old),
                new_value: None,
            });
        }
        Ok(())
    }

    fn computed_style(&self, property: &str) -> String {
        self.computed.get(property).cloned().unwrap_or_default()
    }

    fn inline_style(&self, property: &str) -> String {
        self.inline.get(property).cloned().unwrap_or_default()
    }

    fn set_inline_style(&mut self, property: &str, value: &str) -> Result<(), ElementError> {
        if self.reject_styles || self.read_only_styles.iter().any(|p| p == property) {
            return Err(ElementError::Host(format!("style `{property}` is read-only")));
        }
        self.inline.insert(property.to_string(), value.to_string());
        self.computed.insert(property.to_string(), value.to_string());
        Ok(())
    }
}

/// Route queued notifications into the controller, in order.
pub fn deliver_changes<F>(
    el: &mut FakeElement,
    controller: &mut LifecycleController<F>,
) -> Vec<UpdateOutcome>
where
    F: EngineFactory<Container = str>,
{
    el.take_changes()
        .into_iter()
        .map(|c| {
            controller.on_attribute_changed(
                &c.name,
                c.old_value.as_deref(),
                c.new_value.as_deref(),
                &*el,
            )
        })
        .collect()
}

/// Everything the engine observed, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Construct {
        handle: u32,
        container: String,
        options: OptionsObject,
    },
    Update {
        handle: u32,
        options: OptionsObject,
    },
    Pause {
        handle: u32,
    },
    Resume {
        handle: u32,
    },
    Destroy {
        handle: u32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<EngineCall>>>);

impl CallLog {
    fn push(&self, call: EngineCall) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn constructs(&self) -> Vec<(String, OptionsObject)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Construct {
                    container, options, ..
                } => Some((container.clone(), options.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<OptionsObject> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Update { options, .. } => Some(options.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn destroys(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| matches!(c, EngineCall::Destroy { .. }))
            .count()
    }
}

/// Engine factory that records every call into a shared [`CallLog`].
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    pub log: CallLog,
    pub unavailable: bool,
    pub construct_error: Option<String>,
    /// Handle method that reports failure (`"updateOptions"`, `"destroy"`, ...).
    pub failing_method: Option<&'static str>,
    next_id: u32,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            construct_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn with_failing_method(mut self, method: &'static str) -> Self {
        self.failing_method = Some(method);
        self
    }
}

impl EngineFactory for RecordingFactory {
    type Container = str;
    type Handle = RecordingHandle;

    fn name(&self) -> &str {
        "DotWave"
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn construct(
        &mut self,
        container: &str,
        options: &OptionsObject,
    ) -> Result<RecordingHandle, ElementError> {
        if let Some(reason) = &self.construct_error {
            return Err(ElementError::ConstructionFailure(reason.clone()));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.log.push(EngineCall::Construct {
            handle: id,
            container: container.to_string(),
            options: options.clone(),
        });
        Ok(RecordingHandle {
            id,
            log: self.log.clone(),
            failing_method: self.failing_method,
        })
    }
}

#[derive(Debug)]
pub struct RecordingHandle {
    pub id: u32,
    log: CallLog,
    failing_method: Option<&'static str>,
}

impl RecordingHandle {
    fn outcome(&self, method: &'static str) -> Result<(), ElementError> {
        if self.failing_method == Some(method) {
            Err(ElementError::engine_call(method, "engine rejected call"))
        } else {
            Ok(())
        }
    }
}

impl EngineHandle for RecordingHandle {
    fn update_options(&mut self, options: &OptionsObject) -> Result<(), ElementError> {
        self.log.push(EngineCall::Update {
            handle: self.id,
            options: options.clone(),
        });
        self.outcome("updateOptions")
    }

    fn pause(&mut self) -> Result<(), ElementError> {
        self.log.push(EngineCall::Pause { handle: self.id });
        self.outcome("pause")
    }

    fn resume(&mut self) -> Result<(), ElementError> {
        self.log.push(EngineCall::Resume { handle: self.id });
        self.outcome("resume")
    }

    fn destroy(&mut self) -> Result<(), ElementError> {
        self.log.push(EngineCall::Destroy { handle: self.id });
        self.outcome("destroy")
    }
}

/// Compare two options objects key by key. Numbers compare with a relative
/// tolerance since fixture JSON floats are not guaranteed bit-exact.
pub fn assert_options_eq(actual: &OptionsObject, expected: &OptionsObject) {
    let actual_keys: Vec<&str> = actual.iter().map(|(k, _)| k).collect();
    let expected_keys: Vec<&str> = expected.iter().map(|(k, _)| k).collect();
    assert_eq!(actual_keys, expected_keys, "option keys differ");

    for (key, want) in expected.iter() {
        let got = actual.get(key).expect("key present");
        match (got.as_f64(), want.as_f64()) {
            (Some(a), Some(b)) => {
                let tol = 1e-12 * a.abs().max(b.abs()).max(1.0);
                assert!((a - b).abs() <= tol, "`{key}`: {a} != {b}");
            }
            _ => assert_eq!(got, want, "`{key}`"),
        }
    }
}
