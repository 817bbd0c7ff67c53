//! Options object built from the element's current attributes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{AttributeValue, ATTRIBUTES};

/// Read access to an element's raw attributes.
pub trait AttributeSource {
    /// Raw value of `name`, or `None` when the attribute is absent.
    fn attribute(&self, name: &str) -> Option<String>;
}

/// Coerced engine options keyed by option key (camelCase).
///
/// The container reference is not a member: it is handed to the
/// engine beside the options on construction and never on update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsObject {
    entries: BTreeMap<String, AttributeValue>,
}

impl OptionsObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Value {
        // A map of scalars always serializes.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Build a fresh options object from every recognized attribute currently
/// present. Absent attributes are omitted so the engine applies its own
/// defaults.
pub fn read_options<S: AttributeSource + ?Sized>(source: &S) -> OptionsObject {
    let mut options = OptionsObject::new();
    for descriptor in ATTRIBUTES.iter() {
        if let Some(raw) = source.attribute(descriptor.external_name) {
            options.insert(descriptor.option_key, descriptor.coerce(&raw));
        }
    }
    options
}
