//! The element as seen by the controller.

use crate::error::ElementError;
use crate::options::AttributeSource;

/// Host-side element: attributes, attachment, and inline/computed style.
///
/// A browser host wraps an `HTMLElement`; tests use an in-memory element.
pub trait ElementHost: AttributeSource {
    type Container: ?Sized;

    /// Reference handed to the engine as `container`.
    fn container(&self) -> &Self::Container;

    fn is_connected(&self) -> bool;

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), ElementError>;

    fn remove_attribute(&mut self, name: &str) -> Result<(), ElementError>;

    /// Resolved style value (`getComputedStyle`), e.g. `"inline"` or `"0px"`.
    fn computed_style(&self, property: &str) -> String;

    /// Inline style value; empty when not set.
    fn inline_style(&self, property: &str) -> String;

    fn set_inline_style(&mut self, property: &str, value: &str) -> Result<(), ElementError>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}
