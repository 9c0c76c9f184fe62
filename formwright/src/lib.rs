//! # formwright
//!
//! Form fields derived from bound models.
//!
//! This is the meta-crate that re-exports the workspace crates. Depend on
//! `formwright` for everything, or on the individual crates for finer
//! control.

/// Settings, settings loading, logging, and error types.
pub use formwright_core as core;

/// Type inference, renderer discovery, wrappers, and field composition.
#[cfg(feature = "forms")]
pub use formwright_forms as forms;

/// The types most callers need.
pub mod prelude {
    pub use formwright_core::settings::{ComponentSettings, Settings, WrapperSettings};
    pub use formwright_core::{FormError, FormResult};

    #[cfg(feature = "forms")]
    pub use formwright_forms::fragment::{Control, ControlKind, Fragment, RenderedField};
    #[cfg(feature = "forms")]
    pub use formwright_forms::model::{BoundModel, Column, ColumnType, ModelSnapshot};
    #[cfg(feature = "forms")]
    pub use formwright_forms::options::{options, Options};
    #[cfg(feature = "forms")]
    pub use formwright_forms::{FormBuilder, FormEnvironment};
}
