//! # formwright-forms
//!
//! The field resolution pipeline: infers a semantic type for a bound-model
//! attribute, discovers the renderer for that type through an overridable,
//! cached lookup chain, and composes label, control, hint and error
//! fragments according to a configurable wrapper.
//!
//! ## Modules
//!
//! - [`builder`] - `FormEnvironment` and `FormBuilder`, the caller-facing API
//! - [`type_resolver`] - Semantic type inference
//! - [`mapping`] - The type → renderer registry and resolver
//! - [`discovery`] - Input namespaces and discovery caches
//! - [`wrappers`] - Wrapper templates and wrapper selection
//! - [`renderer`] - Field composition, full and control-only
//! - [`association`] - Association attributes and collections
//! - [`inputs`] - Built-in inputs and renderer factories
//! - [`components`] - Attribute decorators and label/hint/error components
//! - [`model`] - The bound-model trait and an in-memory implementation
//! - [`fragment`] - Abstract output fragments
//! - [`options`] - Field option maps

pub mod association;
pub mod builder;
pub mod components;
pub mod discovery;
pub mod fragment;
pub mod inputs;
pub mod mapping;
pub mod model;
pub mod options;
pub mod renderer;
pub mod type_resolver;
pub mod wrappers;

pub use builder::{FormBuilder, FormEnvironment};
pub use fragment::{Fragment, RenderedField};
pub use model::{BoundModel, ModelSnapshot};
pub use options::Options;
