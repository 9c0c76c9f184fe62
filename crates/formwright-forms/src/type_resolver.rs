//! Semantic type inference.
//!
//! [`TypeResolver::resolve`] turns an attribute name, its options and the
//! bound model's metadata into a semantic type such as `string`, `email`,
//! `select` or `file`. The result selects the renderer and is added to the
//! wrapper classes.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use formwright_core::settings::{InputMapping, Settings};
use formwright_core::{FormError, FormResult};

use crate::model::{BoundModel, Capabilities, Column};
use crate::options::{is_set, str_option, Options};

/// Name heuristics applied to string-like attributes, in match order.
const NAME_HEURISTICS: &[(&str, &str)] = &[
    ("password", "password"),
    ("time_zone", "time_zone"),
    ("country", "country"),
    ("email", "email"),
    ("phone", "tel"),
    ("url", "url"),
];

fn name_heuristics() -> &'static [(Regex, &'static str)] {
    static HEURISTICS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    HEURISTICS.get_or_init(|| {
        NAME_HEURISTICS
            .iter()
            .map(|(word, input_type)| {
                let pattern = format!(r"(?i)(?:\b|\W|_){word}(?:\b|\W|_)");
                (
                    Regex::new(&pattern).expect("name heuristic must be a valid regex"),
                    *input_type,
                )
            })
            .collect()
    })
}

/// Capability probes that mark an attribute as a file upload, in check order.
fn file_probes(name: &str) -> [String; 5] {
    [
        format!("{name}_attachment"),
        format!("{name}_attachments"),
        format!("remote_{name}_url"),
        format!("{name}_attacher"),
        format!("{name}_file_name"),
    ]
}

/// The slice of bound-model metadata type inference looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundMetadata {
    /// Column metadata for the attribute, if the model has a column.
    pub column: Option<Column>,
    /// Capability probes of the bound object.
    pub capabilities: Capabilities,
}

impl BoundMetadata {
    /// Reads the metadata for `attribute` from a bound model.
    pub fn from_model(model: &dyn BoundModel, attribute: &str) -> Self {
        Self {
            column: model.column(attribute),
            capabilities: model.capabilities().clone(),
        }
    }
}

/// Infers semantic field types.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    custom: Vec<(Regex, String)>,
}

impl TypeResolver {
    /// Compiles the custom pattern table.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigurationError`] if any pattern is not a
    /// valid regular expression.
    pub fn new(mappings: &[InputMapping]) -> FormResult<Self> {
        let custom = mappings
            .iter()
            .map(|mapping| {
                Regex::new(&mapping.pattern)
                    .map(|regex| (regex, mapping.input_type.clone()))
                    .map_err(|e| {
                        FormError::ConfigurationError(format!(
                            "invalid custom mapping pattern '{}': {e}",
                            mapping.pattern
                        ))
                    })
            })
            .collect::<FormResult<Vec<_>>>()?;
        Ok(Self { custom })
    }

    /// Builds a resolver from the `custom_mappings` setting.
    ///
    /// # Errors
    ///
    /// See [`TypeResolver::new`].
    pub fn from_settings(settings: &Settings) -> FormResult<Self> {
        Self::new(&settings.custom_mappings)
    }

    /// Resolves the semantic type of `name`.
    ///
    /// The first rule that applies wins:
    ///
    /// 1. the `as` option;
    /// 2. the first matching custom pattern;
    /// 3. `select` when a `collection` option is set;
    /// 4. for string-like or unknown columns, the name heuristics
    ///    (password, time_zone, country, email, phone as `tel`, url) and
    ///    then the file capability probes;
    /// 5. the column's base type, or `string`.
    pub fn resolve(&self, name: &str, options: &Options, metadata: Option<&BoundMetadata>) -> String {
        if let Some(explicit) = str_option(options, "as") {
            trace!(attribute = name, input_type = explicit, "explicit type");
            return explicit.to_string();
        }

        if let Some((_, input_type)) = self.custom.iter().find(|(regex, _)| regex.is_match(name)) {
            trace!(attribute = name, input_type = %input_type, "custom mapping matched");
            return input_type.clone();
        }

        if is_set(options, "collection") {
            trace!(attribute = name, "collection given, using select");
            return "select".to_string();
        }

        let column = metadata.and_then(|m| m.column.as_ref());
        if let Some(column) = column {
            if !column.column_type.is_string_like() {
                return column.column_type.base_input_type();
            }
        }

        if let Some((_, input_type)) = name_heuristics()
            .iter()
            .find(|(regex, _)| regex.is_match(name))
        {
            trace!(attribute = name, input_type, "name heuristic matched");
            return (*input_type).to_string();
        }

        if let Some(metadata) = metadata {
            if file_probes(name)
                .iter()
                .any(|probe| metadata.capabilities.has(probe))
            {
                trace!(attribute = name, "file capability found");
                return "file".to_string();
            }
        }

        column.map_or_else(|| "string".to_string(), |c| c.column_type.base_input_type())
    }
}
