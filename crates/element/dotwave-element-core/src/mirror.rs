//! JS-property mirror for a subset of attributes.
//!
//! Getters read the attribute; setters only write or remove the attribute.
//! Reconfiguration then happens through the host's attribute-change
//! notification, the same path markup edits take.

use crate::error::ElementError;
use crate::host::ElementHost;
use crate::schema::{format_js_number, parse_int_prefix};

pub const NUM_DOTS: &str = "num-dots";
pub const DOT_COLOR: &str = "dot-color";
pub const BACKGROUND_COLOR: &str = "background-color";
pub const REACTIVE: &str = "reactive";

const DEFAULT_NUM_DOTS: f64 = 400.0;
const DEFAULT_DOT_COLOR: &str = "white";
const DEFAULT_BACKGROUND_COLOR: &str = "black";

pub trait PropertyMirror: ElementHost {
    /// Integer-parsed `num-dots`; the default when absent or unparseable.
    fn num_dots(&self) -> f64 {
        self.attribute(NUM_DOTS)
            .and_then(|raw| parse_int_prefix(&raw))
            .unwrap_or(DEFAULT_NUM_DOTS)
    }

    fn set_num_dots(&mut self, value: Option<f64>) -> Result<(), ElementError> {
        match value {
            Some(n) => self.set_attribute(NUM_DOTS, &format_js_number(n)),
            None => self.remove_attribute(NUM_DOTS),
        }
    }

    fn dot_color(&self) -> String {
        non_empty_or(self.attribute(DOT_COLOR), DEFAULT_DOT_COLOR)
    }

    fn set_dot_color(&mut self, value: Option<&str>) -> Result<(), ElementError> {
        set_or_remove(self, DOT_COLOR, value)
    }

    fn background_color(&self) -> String {
        non_empty_or(self.attribute(BACKGROUND_COLOR), DEFAULT_BACKGROUND_COLOR)
    }

    fn set_background_color(&mut self, value: Option<&str>) -> Result<(), ElementError> {
        set_or_remove(self, BACKGROUND_COLOR, value)
    }

    /// Present and not `"false"`; `true` when absent.
    fn reactive(&self) -> bool {
        self.attribute(REACTIVE).map_or(true, |raw| raw != "false")
    }

    fn set_reactive(&mut self, value: bool) -> Result<(), ElementError> {
        self.set_attribute(REACTIVE, if value { "true" } else { "false" })
    }
}

impl<H: ElementHost + ?Sized> PropertyMirror for H {}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

// Empty strings count as unset, like a falsy JS value.
fn set_or_remove<H: ElementHost + ?Sized>(
    host: &mut H,
    name: &str,
    value: Option<&str>,
) -> Result<(), ElementError> {
    match value {
        Some(v) if !v.is_empty() => host.set_attribute(name, v),
        _ => host.remove_attribute(name),
    }
}
