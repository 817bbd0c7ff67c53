//! Attribute schema: the static table of recognized element attributes and
//! the typed coercion applied to their raw string values.
//!
//! Lookup is by external (kebab-case) name; table order carries no meaning.

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Declared type of an attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
}

/// Default value attached to a descriptor. Kept `'static` so the table can be
/// a plain `static`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Number(f64),
    Text(&'static str),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> AttributeValue {
        match self {
            DefaultValue::Number(n) => AttributeValue::Number(n),
            DefaultValue::Text(s) => AttributeValue::Text(s.to_string()),
            DefaultValue::Bool(b) => AttributeValue::Bool(b),
        }
    }
}

/// A coerced option value. Serializes as the bare JSON scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeValue::Bool(_) => ValueType::Boolean,
            AttributeValue::Number(_) => ValueType::Number,
            AttributeValue::Text(_) => ValueType::String,
        }
    }
}

/// Immutable mapping of one external attribute onto one engine option.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttributeDescriptor {
    pub external_name: &'static str,
    pub option_key: &'static str,
    pub value_type: ValueType,
    pub default_value: DefaultValue,
}

impl AttributeDescriptor {
    const fn number(external_name: &'static str, option_key: &'static str, default: f64) -> Self {
        Self {
            external_name,
            option_key,
            value_type: ValueType::Number,
            default_value: DefaultValue::Number(default),
        }
    }

    const fn text(
        external_name: &'static str,
        option_key: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            external_name,
            option_key,
            value_type: ValueType::String,
            default_value: DefaultValue::Text(default),
        }
    }

    const fn boolean(external_name: &'static str, option_key: &'static str, default: bool) -> Self {
        Self {
            external_name,
            option_key,
            value_type: ValueType::Boolean,
            default_value: DefaultValue::Bool(default),
        }
    }

    /// Coerce the raw value of a *present* attribute.
    ///
    /// - Boolean: everything except the literal `"false"` is `true`.
    /// - Number: `parseFloat` semantics; no parse falls back to the default.
    ///   No range clamping happens here.
    /// - String: non-empty value, else the default.
    pub fn coerce(&self, raw: &str) -> AttributeValue {
        match self.value_type {
            ValueType::Boolean => AttributeValue::Bool(raw != "false"),
            ValueType::Number => match parse_float_prefix(raw) {
                Some(n) => AttributeValue::Number(n),
                None => self.default_value.to_value(),
            },
            ValueType::String => {
                if raw.is_empty() {
                    self.default_value.to_value()
                } else {
                    AttributeValue::Text(raw.to_string())
                }
            }
        }
    }

    /// Value reported when the attribute is absent.
    #[inline]
    pub fn default(&self) -> AttributeValue {
        self.default_value.to_value()
    }
}

/// Every attribute the element observes.
pub static ATTRIBUTES: [AttributeDescriptor; 21] = [
    AttributeDescriptor::number("num-dots", "numDots", 400.0),
    AttributeDescriptor::text("dot-color", "dotColor", "white"),
    AttributeDescriptor::text("background-color", "backgroundColor", "black"),
    AttributeDescriptor::number("dot-min-size", "dotMinSize", 1.0),
    AttributeDescriptor::number("dot-max-size", "dotMaxSize", 3.0),
    AttributeDescriptor::number("dot-min-opacity", "dotMinOpacity", 0.5),
    AttributeDescriptor::number("dot-max-opacity", "dotMaxOpacity", 1.0),
    AttributeDescriptor::number("influence-radius", "influenceRadius", 100.0),
    AttributeDescriptor::number("influence-strength", "influenceStrength", 0.5),
    AttributeDescriptor::number("random-factor", "randomFactor", 0.05),
    AttributeDescriptor::number("friction", "friction", 0.97),
    AttributeDescriptor::number("max-speed", "maxSpeed", 3.0),
    AttributeDescriptor::boolean("reactive", "reactive", true),
    AttributeDescriptor::number("z-index", "zIndex", -1.0),
    AttributeDescriptor::number("mouse-speed-decay", "mouseSpeedDecay", 0.85),
    AttributeDescriptor::number("max-mouse-speed", "maxMouseSpeed", 15.0),
    AttributeDescriptor::boolean("dot-stretch", "dotStretch", true),
    AttributeDescriptor::number("dot-stretch-mult", "dotStretchMult", 10.0),
    AttributeDescriptor::number("dot-max-stretch", "dotMaxStretch", 20.0),
    AttributeDescriptor::boolean("rot-smoothing", "rotSmoothing", false),
    AttributeDescriptor::number("rot-smoothing-intensity", "rotSmoothingIntensity", 150.0),
];

static INDEX: Lazy<HashMap<&'static str, &'static AttributeDescriptor>> =
    Lazy::new(|| ATTRIBUTES.iter().map(|d| (d.external_name, d)).collect());

/// Look up a descriptor by external attribute name. Unknown names are not an
/// error; callers ignore them.
#[inline]
pub fn resolve(external_name: &str) -> Option<&'static AttributeDescriptor> {
    INDEX.get(external_name).copied()
}

/// External names of all recognized attributes (the element's observed list).
pub fn observed_attributes() -> impl Iterator<Item = &'static str> {
    ATTRIBUTES.iter().map(|d| d.external_name)
}

// ECMAScript StrWhiteSpaceChar: WhiteSpace + LineTerminator.
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}' | '\u{000B}' | '\u{000C}' | '\u{0020}' | '\u{00A0}' | '\u{FEFF}'
            | '\u{000A}' | '\u{000D}' | '\u{2028}' | '\u{2029}'
    ) || (c != '\u{0085}' && c.is_whitespace())
}

fn digits_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// `parseFloat`: skip leading whitespace and parse the longest decimal prefix.
///
/// Returns `None` when no prefix is a number (`NaN` in JS). Rust-only literal
/// spellings such as `inf` or `nan` are rejected.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start_matches(is_js_whitespace);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_len = digits_len(&bytes[end..]);
    end += int_len;
    let mut frac_len = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_len = digits_len(&bytes[end + 1..]);
        if int_len > 0 || frac_len > 0 {
            end += 1 + frac_len;
        }
    }
    if int_len == 0 && frac_len == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_len(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// `parseInt(value)` without a radix: skip leading whitespace and an optional
/// sign, then read a `0x`/`0X` hex run or else the longest decimal run.
///
/// Long digit runs keep their magnitude (precision degrades as it does for a
/// JS number) instead of saturating.
pub fn parse_int_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start_matches(is_js_whitespace);
    let bytes = s.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let sign = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let body = &bytes[sign..];

    let magnitude = if matches!(body, [b'0', b'x' | b'X', ..]) {
        let hex = &body[2..];
        let len = hex.iter().take_while(|b| b.is_ascii_hexdigit()).count();
        if len == 0 {
            return None;
        }
        hex[..len].iter().fold(0.0, |acc, b| {
            acc * 16.0 + f64::from(char::from(*b).to_digit(16).unwrap_or(0))
        })
    } else {
        let len = digits_len(body);
        if len == 0 {
            return None;
        }
        s[sign..sign + len].parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// `Number#toString` for a value written back into an attribute, so that
/// [`parse_float_prefix`] reads the same number again.
pub fn format_js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Covers -0, which JS prints as "0".
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    // Exponent form: Rust prints `1e21` and `1.5e-7`; JS wants `1e+21`.
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}
