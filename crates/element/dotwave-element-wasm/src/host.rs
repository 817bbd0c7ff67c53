use dotwave_element_core::{AttributeSource, ElementError, ElementHost};
use web_sys::HtmlElement;

use crate::describe_js_error;

/// `HTMLElement` seen through the core's host trait.
#[derive(Clone, Debug)]
pub struct DomHost {
    element: HtmlElement,
}

impl DomHost {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl AttributeSource for DomHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }
}

impl ElementHost for DomHost {
    type Container = HtmlElement;

    fn container(&self) -> &HtmlElement {
        &self.element
    }

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), ElementError> {
        self.element
            .set_attribute(name, value)
            .map_err(|e| ElementError::Host(describe_js_error(&e)))
    }

    fn remove_attribute(&mut self, name: &str) -> Result<(), ElementError> {
        self.element
            .remove_attribute(name)
            .map_err(|e| ElementError::Host(describe_js_error(&e)))
    }

    fn computed_style(&self, property: &str) -> String {
        web_sys::window()
            .and_then(|w| w.get_computed_style(&self.element).ok().flatten())
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn inline_style(&self, property: &str) -> String {
        self.element
            .style()
            .get_property_value(property)
            .unwrap_or_default()
    }

    fn set_inline_style(&mut self, property: &str, value: &str) -> Result<(), ElementError> {
        self.element
            .style()
            .set_property(property, value)
            .map_err(|e| ElementError::Host(describe_js_error(&e)))
    }
}
