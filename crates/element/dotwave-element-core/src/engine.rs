//! Contract of the external animation engine. The engine itself (rendering,
//! motion) lives outside this crate; only construction and the handle's
//! control surface are modelled.

use crate::error::ElementError;
use crate::options::OptionsObject;

/// A live engine instance, exclusively owned by one controller.
pub trait EngineHandle {
    fn update_options(&mut self, options: &OptionsObject) -> Result<(), ElementError>;
    fn pause(&mut self) -> Result<(), ElementError>;
    fn resume(&mut self) -> Result<(), ElementError>;
    fn destroy(&mut self) -> Result<(), ElementError>;
}

/// Constructs engine handles. Injected into the controller so the core never
/// performs a global lookup itself.
pub trait EngineFactory {
    /// The element reference passed as `container` on construction.
    type Container: ?Sized;
    type Handle: EngineHandle;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "engine"
    }

    /// Whether the engine can be constructed right now. Checked before any
    /// options are read or styles are touched.
    fn is_available(&self) -> bool {
        true
    }

    fn construct(
        &mut self,
        container: &Self::Container,
        options: &OptionsObject,
    ) -> Result<Self::Handle, ElementError>;
}
