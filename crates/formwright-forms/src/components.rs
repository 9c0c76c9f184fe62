//! Wrapper components.
//!
//! Two families exist. Attribute decorators (`html5`, `maxlength`, ...)
//! contribute attributes to the control before it is built. Output
//! components (`label`, `hint`, `error`, `full_error`) produce fragments of
//! their own.

use serde_json::Value;

use formwright_core::settings::ErrorMethod;
use formwright_core::utils::text::to_sentence;

use crate::fragment::{push_class, ErrorFragment, Fragment, HintFragment, LabelFragment};
use crate::inputs::{ControlAttributes, InputContext};
use crate::model::AttributeValidator;
use crate::options::{class_list, map_option, str_option, Options};

/// Components that only decorate control attributes.
pub const ATTRIBUTE_COMPONENTS: &[&str] = &[
    "html5",
    "min_max",
    "maxlength",
    "minlength",
    "placeholder",
    "pattern",
    "readonly",
];

const NUMERIC_TYPES: &[&str] = &["integer", "decimal", "float", "range"];

/// Returns `true` for attribute decorators.
pub fn is_decorator(name: &str) -> bool {
    ATTRIBUTE_COMPONENTS.contains(&name)
}

/// Applies the decorator `name` to `attributes`. Attributes already present
/// are kept.
pub fn decorate(name: &str, context: &InputContext, required: bool, attributes: &mut ControlAttributes) {
    match name {
        "html5" => html5(context, required, attributes),
        "placeholder" => {
            if let Some(text) = str_option(context.options(), "placeholder") {
                attributes.set_default("placeholder", Value::from(text));
            }
        }
        "maxlength" => {
            if let Some(max) = maxlength(context) {
                attributes.set_default("maxlength", Value::from(max));
            }
        }
        "minlength" => {
            if let Some(min) = minlength(context) {
                attributes.set_default("minlength", Value::from(min));
            }
        }
        "pattern" => {
            if let Some(pattern) = pattern(context) {
                attributes.set_default("pattern", Value::from(pattern));
            }
        }
        "min_max" => min_max(context, attributes),
        "readonly" => {
            if context.options().get("readonly") == Some(&Value::Bool(true)) {
                attributes.set_default("readonly", Value::Bool(true));
                push_class(&mut attributes.classes, "readonly");
            }
        }
        _ => {}
    }
}

fn html5(context: &InputContext, required: bool, attributes: &mut ControlAttributes) {
    attributes.html5 = true;
    if required && context.settings.browser_validations {
        attributes.set_default("required", Value::Bool(true));
        attributes.set_default("aria-required", Value::Bool(true));
    }
    if context.has_errors() {
        attributes.set_default("aria-invalid", Value::Bool(true));
    }
}

fn validators(context: &InputContext) -> Vec<AttributeValidator> {
    context.validators().unwrap_or_default()
}

fn numeric_option(options: &Options, key: &str) -> Option<u64> {
    options.get(key).and_then(Value::as_u64)
}

fn maxlength(context: &InputContext) -> Option<u64> {
    numeric_option(context.options(), "maxlength")
        .or_else(|| {
            validators(context).iter().find_map(|v| match v {
                AttributeValidator::Length { maximum, .. } => maximum.map(|m| m as u64),
                _ => None,
            })
        })
        .or_else(|| context.field.column().and_then(|c| c.limit).map(|l| l as u64))
}

fn minlength(context: &InputContext) -> Option<u64> {
    numeric_option(context.options(), "minlength").or_else(|| {
        validators(context).iter().find_map(|v| match v {
            AttributeValidator::Length { minimum, .. } => minimum.map(|m| m as u64),
            _ => None,
        })
    })
}

fn pattern(context: &InputContext) -> Option<String> {
    if let Some(pattern) = str_option(context.options(), "pattern") {
        return Some(pattern.to_string());
    }
    validators(context).into_iter().find_map(|v| match v {
        AttributeValidator::Format { pattern } => Some(pattern),
        _ => None,
    })
}

fn min_max(context: &InputContext, attributes: &mut ControlAttributes) {
    if !NUMERIC_TYPES.contains(&context.field.input_type.as_str()) {
        return;
    }
    let Some((gt, gte, lt, lte, only_integer)) = validators(context).into_iter().find_map(|v| match v {
        AttributeValidator::Numericality {
            greater_than,
            greater_than_or_equal_to,
            less_than,
            less_than_or_equal_to,
            only_integer,
        } => Some((
            greater_than,
            greater_than_or_equal_to,
            less_than,
            less_than_or_equal_to,
            only_integer,
        )),
        _ => None,
    }) else {
        return;
    };

    let integer = only_integer || context.field.input_type == "integer";
    let min = gte.or_else(|| gt.filter(|_| integer).map(|v| v + 1.0));
    let max = lte.or_else(|| lt.filter(|_| integer).map(|v| v - 1.0));
    if let Some(min) = min {
        attributes.set_default("min", number(min));
    }
    if let Some(max) = max {
        attributes.set_default("max", number(max));
    }
}

/// Whole numbers serialize as integers.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Classes from a component's `class` render option followed by the
/// field's `{component}_html.class` option.
fn component_classes(defaults: &[&str], spec_options: &Options, context: &InputContext, html_key: &str) -> Vec<String> {
    let mut classes = Vec::new();
    for class in defaults {
        push_class(&mut classes, class);
    }
    for class in class_list(spec_options.get("class")) {
        push_class(&mut classes, &class);
    }
    if let Some(html) = map_option(context.options(), html_key) {
        for class in class_list(html.get("class")) {
            push_class(&mut classes, &class);
        }
    }
    classes
}

/// The label fragment.
pub fn label(context: &InputContext, required: bool, spec_options: &Options) -> Fragment {
    let mut defaults = vec![context.field.input_type.as_str()];
    defaults.push(if required { "required" } else { "optional" });
    if context.is_disabled() {
        defaults.push("disabled");
    }
    Fragment::Label(LabelFragment {
        text: context.label_text(),
        for_id: Some(context.dom_id()),
        required,
        classes: component_classes(&defaults, spec_options, context, "label_html"),
    })
}

/// The hint fragment, when the field has a hint.
pub fn hint(context: &InputContext, spec_options: &Options) -> Option<Fragment> {
    let text = context.hint_text()?;
    Some(Fragment::Hint(HintFragment {
        text,
        classes: component_classes(&["hint"], spec_options, context, "hint_html"),
    }))
}

/// The error message for the field, reduced with the configured
/// `error_method`. A string `error` option replaces the messages.
pub fn error_text(context: &InputContext) -> Option<String> {
    let errors = context.errors();
    if errors.is_empty() {
        return None;
    }
    if let Some(custom) = str_option(context.options(), "error") {
        return Some(custom.to_string());
    }
    match context.settings.error_method {
        ErrorMethod::First => errors.into_iter().next(),
        ErrorMethod::ToSentence => Some(to_sentence(&errors)),
    }
}

/// The error fragment, when the field has errors.
pub fn error(context: &InputContext, spec_options: &Options) -> Option<Fragment> {
    let message = error_text(context)?;
    Some(Fragment::Error(ErrorFragment {
        message,
        full: false,
        classes: component_classes(&["error"], spec_options, context, "error_html"),
    }))
}

/// The full error fragment: the label text followed by the first error.
pub fn full_error(context: &InputContext, spec_options: &Options) -> Option<Fragment> {
    let first = context.errors().into_iter().next()?;
    Some(Fragment::Error(ErrorFragment {
        message: format!("{} {first}", context.label_text()),
        full: true,
        classes: component_classes(&["error"], spec_options, context, "error_html"),
    }))
}
