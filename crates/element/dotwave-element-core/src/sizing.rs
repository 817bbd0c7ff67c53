//! One-time layout adjustment applied before the engine is constructed, so a
//! bare `<dot-wave>` tag still gets a positioned, non-empty box to paint into.

use crate::config::ElementConfig;
use crate::error::ElementError;
use crate::host::ElementHost;

/// Which adjustments were made.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizingReport {
    pub display: bool,
    pub position: bool,
    pub width: bool,
    pub height: bool,
    pub overflow: bool,
}

impl SizingReport {
    pub fn any(&self) -> bool {
        self.display || self.position || self.width || self.height || self.overflow
    }
}

/// Every adjustment is attempted even when the host rejects one; the first
/// rejected write is returned.
pub fn apply_sizing<H: ElementHost + ?Sized>(
    host: &mut H,
    config: &ElementConfig,
) -> Result<SizingReport, ElementError> {
    let mut report = SizingReport::default();
    let mut first_err = None;
    let mut write = |host: &mut H, property: &str, value: &str| match host
        .set_inline_style(property, value)
    {
        Ok(()) => true,
        Err(err) => {
            first_err.get_or_insert(err);
            false
        }
    };

    if host.computed_style("display") == "inline" {
        report.display = write(host, "display", "block");
    }

    if host.computed_style("position") == "static" {
        report.position = write(host, "position", "relative");
    }

    if host.inline_style("width").is_empty() && host.computed_style("width") == "0px" {
        report.width = write(host, "width", &config.fallback_width);
    }

    if host.inline_style("height").is_empty() && host.computed_style("height") == "0px" {
        report.height = write(host, "height", &config.fallback_height);
    }

    if host.inline_style("overflow").is_empty() {
        report.overflow = write(host, "overflow", "hidden");
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(report),
    }
}
