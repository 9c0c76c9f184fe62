//! Renderer factories and the built-in inputs.
//!
//! An input turns a resolved field into a [`Control`]. Inputs are created
//! through a [`RendererFactory`], which is what namespaces, the mapping
//! registry and the discovery cache hand around. Every built-in input lives
//! in the internal default namespace built by [`default_namespace`].

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use formwright_core::settings::Settings;
use formwright_core::utils::text::humanize;

use crate::discovery::{StaticNamespace, DEFAULT_NAMESPACE};
use crate::fragment::{push_class, Choice, Control, ControlKind, Fragment};
use crate::model::{AttributeValidator, BoundModel, Column, ColumnType};
use crate::options::{bool_option, display_value, is_set, map_option, str_option, Options};
use crate::type_resolver::BoundMetadata;

/// Built-in renderer names and the semantic types each one is registered for.
pub const BUILTIN_MAPPINGS: &[(&str, &[&str])] = &[
    ("BooleanInput", &["boolean"]),
    ("CollectionCheckBoxesInput", &["check_boxes"]),
    ("CollectionRadioButtonsInput", &["radio_buttons"]),
    ("CollectionSelectInput", &["select"]),
    ("DateTimeInput", &["date", "datetime", "time"]),
    ("NumericInput", &["decimal", "float", "integer"]),
    ("RangeInput", &["range"]),
    (
        "StringInput",
        &["email", "search", "tel", "url", "uuid", "citext", "string", "color"],
    ),
    ("PasswordInput", &["password"]),
    ("TextInput", &["text", "hstore", "json", "jsonb"]),
    ("FileInput", &["file"]),
    ("HiddenInput", &["hidden"]),
    ("PriorityInput", &["country", "time_zone"]),
];

type Constructor = dyn Fn(InputContext) -> Box<dyn Input> + Send + Sync;

/// Creates input instances for one renderer.
///
/// Factories are shared as `Arc<RendererFactory>`; two lookups that return
/// the same `Arc` refer to the same renderer.
pub struct RendererFactory {
    name: String,
    namespace: String,
    constructor: Arc<Constructor>,
}

impl RendererFactory {
    /// Creates a factory.
    pub fn new<F>(name: impl Into<String>, namespace: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(InputContext) -> Box<dyn Input> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            constructor: Arc::new(constructor),
        }
    }

    /// The unqualified renderer name (`StringInput`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace the factory was registered in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `namespace::Name`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// Instantiates the renderer for one field.
    pub fn build(&self, context: InputContext) -> Box<dyn Input> {
        (self.constructor)(context)
    }
}

impl fmt::Debug for RendererFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererFactory")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// A field ready to be rendered: attribute, semantic type, metadata and
/// merged options. Rebuilt for every render call.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// The attribute name (`email`, `author_id`).
    pub name: String,
    /// The resolved semantic type.
    pub input_type: String,
    /// Metadata read from the bound model.
    pub bound: Option<BoundMetadata>,
    /// Options after form defaults were merged in.
    pub options: Options,
    /// The association name, for fields built from an association.
    pub reflection: Option<String>,
}

impl FieldDescriptor {
    /// Creates a descriptor with no metadata and no association.
    pub fn new(name: impl Into<String>, input_type: impl Into<String>, options: Options) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            bound: None,
            options,
            reflection: None,
        }
    }

    /// The column metadata, if known.
    pub fn column(&self) -> Option<&Column> {
        self.bound.as_ref().and_then(|b| b.column.as_ref())
    }
}

/// Everything an input needs to render one field.
#[derive(Clone)]
pub struct InputContext {
    /// The form's object name (`user`).
    pub object_name: String,
    /// The bound object, if the form has one.
    pub object: Option<Arc<dyn BoundModel>>,
    /// The field being rendered.
    pub field: FieldDescriptor,
    /// Settings of the owning environment.
    pub settings: Arc<Settings>,
}

impl fmt::Debug for InputContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputContext")
            .field("object_name", &self.object_name)
            .field("has_object", &self.object.is_some())
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl InputContext {
    /// The field options.
    pub fn options(&self) -> &Options {
        &self.field.options
    }

    /// The `input_html` map of the options, if any.
    pub fn input_html(&self) -> Option<&Options> {
        map_option(self.options(), "input_html")
    }

    /// The DOM id of the control (`user_email`).
    pub fn dom_id(&self) -> String {
        let raw = format!("{}_{}", self.object_name, self.field.name);
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Returns `true` if the control submits multiple values.
    pub fn is_multiple(&self) -> bool {
        bool_option(self.options(), "multiple")
            .or_else(|| self.input_html().and_then(|html| bool_option(html, "multiple")))
            .unwrap_or(false)
    }

    /// The submitted parameter name (`user[email]`, `post[tag_ids][]`).
    pub fn input_name(&self) -> String {
        let base = if self.object_name.is_empty() {
            self.field.name.clone()
        } else {
            format!("{}[{}]", self.object_name, self.field.name)
        };
        if self.is_multiple() {
            format!("{base}[]")
        } else {
            base
        }
    }

    /// Validators for the attribute and, for association fields, for the
    /// association itself. `None` when the model exposes no validators.
    pub fn validators(&self) -> Option<Vec<AttributeValidator>> {
        let object = self.object.as_ref()?;
        let mut validators = object.validators_for(&self.field.name)?;
        if let Some(reflection) = &self.field.reflection {
            validators.extend(object.validators_for(reflection).unwrap_or_default());
        }
        Some(validators)
    }

    /// Whether the field is required.
    ///
    /// An explicit `required` option wins; otherwise an unconditional
    /// presence validator decides; models without validator reflection fall
    /// back to `required_by_default`.
    pub fn is_required(&self) -> bool {
        if let Some(required) = bool_option(self.options(), "required") {
            return required;
        }
        match self.validators() {
            Some(validators) => validators
                .iter()
                .any(|v| matches!(v, AttributeValidator::Presence { conditional: false })),
            None => self.settings.required_by_default,
        }
    }

    /// Error messages for the field.
    ///
    /// Errors on `{x}_id` include the errors on association `x`.
    pub fn errors(&self) -> Vec<String> {
        let Some(object) = &self.object else {
            return Vec::new();
        };
        let mut errors = object.errors_for(&self.field.name);
        let association = self
            .field
            .reflection
            .clone()
            .or_else(|| self.field.name.strip_suffix("_id").map(String::from));
        if let Some(association) = association {
            for message in object.errors_for(&association) {
                if !errors.contains(&message) {
                    errors.push(message);
                }
            }
        }
        errors
    }

    /// Returns `true` if the field has errors.
    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Returns `true` if the bound object has been validated.
    pub fn is_validated(&self) -> bool {
        self.object.as_ref().is_some_and(|o| o.validated())
    }

    /// Returns `true` if the field is disabled.
    pub fn is_disabled(&self) -> bool {
        bool_option(self.options(), "disabled").unwrap_or(false)
    }

    /// The current value of the attribute on the bound object.
    pub fn value(&self) -> Option<Value> {
        self.object
            .as_ref()
            .and_then(|o| o.value(&self.field.name))
            .filter(|v| !v.is_null())
    }

    /// The label text: the `label` option, the model's human attribute
    /// name, or the humanized attribute name.
    pub fn label_text(&self) -> String {
        if let Some(label) = str_option(self.options(), "label") {
            return label.to_string();
        }
        let attribute = self.field.reflection.as_deref().unwrap_or(&self.field.name);
        self.object
            .as_ref()
            .and_then(|o| o.human_attribute_name(attribute))
            .unwrap_or_else(|| humanize(attribute))
    }

    /// The hint text, if a `hint` option is set.
    pub fn hint_text(&self) -> Option<String> {
        str_option(self.options(), "hint").map(String::from)
    }

    /// Classes every control starts with: the semantic type, `required` or
    /// `optional`, `disabled`, and the configured `input_class`.
    pub fn base_classes(&self, required: bool) -> Vec<String> {
        let mut classes = Vec::new();
        push_class(&mut classes, &self.field.input_type);
        push_class(&mut classes, if required { "required" } else { "optional" });
        if self.is_disabled() {
            push_class(&mut classes, "disabled");
        }
        if let Some(class) = &self.settings.input_class {
            push_class(&mut classes, class);
        }
        classes
    }

    fn control(&self, kind: ControlKind, attributes: ControlAttributes) -> Control {
        let mut attrs = attributes.attributes;
        if self.is_disabled() {
            attrs.insert("disabled".into(), Value::Bool(true));
        }
        Control {
            kind,
            name: self.input_name(),
            id: self.dom_id(),
            value: self.value(),
            classes: attributes.classes,
            attributes: attrs,
        }
    }
}

/// Control attributes collected by the decorator components before the
/// input builds its control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlAttributes {
    /// CSS classes, in order.
    pub classes: Vec<String>,
    /// Attributes, in insertion order.
    pub attributes: Map<String, Value>,
    /// Set by the `html5` component: inputs may use HTML5 input types.
    pub html5: bool,
}

impl ControlAttributes {
    /// Starts from a list of classes.
    pub fn with_classes(classes: Vec<String>) -> Self {
        Self {
            classes,
            ..Self::default()
        }
    }

    /// Sets an attribute unless it is already present.
    pub fn set_default(&mut self, key: &str, value: Value) {
        self.attributes.entry(key.to_string()).or_insert(value);
    }
}

/// A renderer instance bound to one field.
pub trait Input: Send {
    /// The context the input was built with.
    fn context(&self) -> &InputContext;

    /// Produces the control fragment.
    fn render(&self, attributes: ControlAttributes) -> Fragment;

    /// Wrapper components this input switches off.
    fn disabled_components(&self) -> &'static [&'static str] {
        &[]
    }
}

macro_rules! input_struct {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            context: InputContext,
        }

        impl $name {
            /// Creates the input for one field.
            pub fn new(context: InputContext) -> Self {
                Self { context }
            }
        }
    };
}

input_struct!(
    /// Single-line text; uses the HTML5 type for email, tel, url, search and
    /// color fields.
    StringInput
);
input_struct!(
    /// A password field. Never echoes the current value.
    PasswordInput
);
input_struct!(
    /// A text area.
    TextInput
);
input_struct!(
    /// A number field with a step of `1` for integers and `any` otherwise.
    NumericInput
);
input_struct!(
    /// A range slider.
    RangeInput
);
input_struct!(
    /// A checkbox with a hidden unchecked value.
    BooleanInput
);
input_struct!(
    /// Date, datetime and time fields: part selects by default, native HTML5
    /// inputs with `html5: true`.
    DateTimeInput
);
input_struct!(
    /// A file upload.
    FileInput
);
input_struct!(
    /// A hidden field, rendered without label, hint or error.
    HiddenInput
);
input_struct!(
    /// A select box over a collection.
    CollectionSelectInput
);
input_struct!(
    /// Radio buttons over a collection.
    CollectionRadioButtonsInput
);
input_struct!(
    /// Check boxes over a collection.
    CollectionCheckBoxesInput
);
input_struct!(
    /// Country and time zone selects with priority entries first.
    PriorityInput
);

impl Input for StringInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let html_type = match self.context.field.input_type.as_str() {
            t @ ("email" | "tel" | "url" | "search" | "color") if attributes.html5 => t,
            _ => "text",
        };
        Fragment::Control(self.context.control(
            ControlKind::Input {
                input_type: html_type.to_string(),
            },
            attributes,
        ))
    }
}

impl Input for PasswordInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let mut control = self.context.control(
            ControlKind::Input {
                input_type: "password".to_string(),
            },
            attributes,
        );
        control.value = None;
        Fragment::Control(control)
    }
}

impl Input for TextInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        Fragment::Control(self.context.control(ControlKind::TextArea, attributes))
    }
}

fn numeric_control(context: &InputContext, html_type: &str, mut attributes: ControlAttributes) -> Control {
    let integer = context.field.input_type == "integer"
        || matches!(
            context.field.column().map(|c| &c.column_type),
            Some(ColumnType::Integer | ColumnType::BigInteger)
        );
    let html_type = if attributes.html5 { html_type } else { "text" };
    if attributes.html5 {
        attributes.set_default("step", if integer { Value::from(1) } else { Value::from("any") });
    }
    context.control(
        ControlKind::Input {
            input_type: html_type.to_string(),
        },
        attributes,
    )
}

impl Input for NumericInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        Fragment::Control(numeric_control(&self.context, "number", attributes))
    }
}

impl Input for RangeInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        Fragment::Control(numeric_control(&self.context, "range", attributes))
    }
}

impl Input for BooleanInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, mut attributes: ControlAttributes) -> Fragment {
        let options = self.context.options();
        let checked_value = options
            .get("checked_value")
            .map_or_else(|| "1".to_string(), display_value);
        let unchecked_value = match options.get("unchecked_value") {
            _ if bool_option(options, "include_hidden") == Some(false) => None,
            Some(value) => Some(display_value(value)),
            None => Some("0".to_string()),
        };
        let checked = self.context.value().is_some_and(|value| match &value {
            Value::Bool(b) => *b,
            other => display_value(other) == checked_value,
        });
        if checked {
            attributes.set_default("checked", Value::Bool(true));
        }
        Fragment::Control(self.context.control(
            ControlKind::Checkbox {
                checked_value,
                unchecked_value,
            },
            attributes,
        ))
    }
}

impl Input for DateTimeInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let precision = self.context.field.input_type.clone();
        let kind = if bool_option(self.context.options(), "html5") == Some(true) {
            let html_type = match precision.as_str() {
                "datetime" => "datetime-local",
                "time" => "time",
                _ => "date",
            };
            ControlKind::Input {
                input_type: html_type.to_string(),
            }
        } else {
            ControlKind::DateTimeSelect { precision }
        };
        Fragment::Control(self.context.control(kind, attributes))
    }
}

impl Input for FileInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let mut control = self.context.control(
            ControlKind::File {
                multiple: self.context.is_multiple(),
            },
            attributes,
        );
        control.value = None;
        Fragment::Control(control)
    }
}

impl Input for HiddenInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        Fragment::Control(self.context.control(ControlKind::Hidden, attributes))
    }

    fn disabled_components(&self) -> &'static [&'static str] {
        &["label", "hint", "error", "full_error", "required"]
    }
}

/// Whether a collection select shows a blank first option.
///
/// An explicit `include_blank` wins; multiple selects and selects with a
/// prompt get none.
fn include_blank(context: &InputContext) -> bool {
    bool_option(context.options(), "include_blank")
        .unwrap_or_else(|| !context.is_multiple() && !is_set(context.options(), "prompt"))
}

impl Input for CollectionSelectInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let prompt = str_option(self.context.options(), "prompt").map(String::from);
        let kind = ControlKind::Select {
            choices: collection_choices(&self.context),
            multiple: self.context.is_multiple(),
            include_blank: include_blank(&self.context),
            prompt,
        };
        Fragment::Control(self.context.control(kind, attributes))
    }
}

impl Input for CollectionRadioButtonsInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let kind = ControlKind::RadioButtons {
            choices: collection_choices(&self.context),
        };
        Fragment::Control(self.context.control(kind, attributes))
    }
}

impl Input for CollectionCheckBoxesInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let kind = ControlKind::CheckBoxes {
            choices: collection_choices(&self.context),
        };
        let mut control = self.context.control(kind, attributes);
        if !control.name.ends_with("[]") {
            control.name.push_str("[]");
        }
        Fragment::Control(control)
    }
}

impl Input for PriorityInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, attributes: ControlAttributes) -> Fragment {
        let source = self.context.field.input_type.clone();
        let priority = match self.context.options().get("priority") {
            Some(Value::Array(items)) => items.iter().map(display_value).collect(),
            _ if source == "time_zone" => self.context.settings.time_zone_priority.clone(),
            _ => self.context.settings.country_priority.clone(),
        };
        let kind = ControlKind::PrioritySelect {
            source,
            priority,
            include_blank: include_blank(&self.context),
        };
        Fragment::Control(self.context.control(kind, attributes))
    }
}

/// Stands in for a control with caller-supplied content.
#[derive(Debug, Clone)]
pub struct BlockInput {
    context: InputContext,
    body: String,
}

impl BlockInput {
    /// Creates a block input rendering `body` in place of a control.
    pub fn new(context: InputContext, body: impl Into<String>) -> Self {
        Self {
            context,
            body: body.into(),
        }
    }
}

impl Input for BlockInput {
    fn context(&self) -> &InputContext {
        &self.context
    }

    fn render(&self, _attributes: ControlAttributes) -> Fragment {
        Fragment::Content {
            body: self.body.clone(),
        }
    }
}

/// Builds the choices of a collection input.
///
/// The `collection` option may hold scalars, `[label, value]` pairs, or
/// record maps. Records are labelled through `label_method`/`value_method`
/// or the first key found in the configured detection lists. Without a
/// collection the field gets a Yes/No pair.
pub fn collection_choices(context: &InputContext) -> Vec<Choice> {
    let options = context.options();
    let items = match options.get("collection") {
        Some(Value::Array(items)) => items.clone(),
        _ => vec![
            Value::Array(vec![Value::from("Yes"), Value::Bool(true)]),
            Value::Array(vec![Value::from("No"), Value::Bool(false)]),
        ],
    };

    let label_keys = method_keys(options, "label_method", &context.settings.collection_label_methods);
    let value_keys = method_keys(options, "value_method", &context.settings.collection_value_methods);
    let selected = selected_values(context);

    items
        .iter()
        .map(|item| {
            let (label, value) = match item {
                Value::Array(pair) if !pair.is_empty() => {
                    let label = pair.first().map(display_value).unwrap_or_default();
                    let value = pair.last().map(display_value).unwrap_or_default();
                    (label, value)
                }
                Value::Object(record) => {
                    let value = detect(record, &value_keys).unwrap_or_default();
                    let label = detect(record, &label_keys).unwrap_or_else(|| value.clone());
                    (label, value)
                }
                scalar => (display_value(scalar), display_value(scalar)),
            };
            let mut choice = Choice::new(label, value);
            choice.selected = selected.contains(&choice.value);
            choice
        })
        .collect()
}

fn method_keys(options: &Options, key: &str, detection: &[String]) -> Vec<String> {
    str_option(options, key).map_or_else(|| detection.to_vec(), |method| vec![method.to_string()])
}

fn detect(record: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter()
        .find_map(|key| record.get(key).filter(|v| !v.is_null()))
        .map(display_value)
}

fn selected_values(context: &InputContext) -> Vec<String> {
    let value = context
        .options()
        .get("selected")
        .cloned()
        .or_else(|| context.value());
    match value {
        Some(Value::Array(items)) => items.iter().map(display_value).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(scalar) => vec![display_value(&scalar)],
    }
}

/// The internal namespace holding every built-in input.
pub fn default_namespace() -> StaticNamespace {
    StaticNamespace::new(DEFAULT_NAMESPACE)
        .with("BooleanInput", |ctx| Box::new(BooleanInput::new(ctx)))
        .with("CollectionCheckBoxesInput", |ctx| {
            Box::new(CollectionCheckBoxesInput::new(ctx))
        })
        .with("CollectionRadioButtonsInput", |ctx| {
            Box::new(CollectionRadioButtonsInput::new(ctx))
        })
        .with("CollectionSelectInput", |ctx| {
            Box::new(CollectionSelectInput::new(ctx))
        })
        .with("DateTimeInput", |ctx| Box::new(DateTimeInput::new(ctx)))
        .with("NumericInput", |ctx| Box::new(NumericInput::new(ctx)))
        .with("RangeInput", |ctx| Box::new(RangeInput::new(ctx)))
        .with("StringInput", |ctx| Box::new(StringInput::new(ctx)))
        .with("PasswordInput", |ctx| Box::new(PasswordInput::new(ctx)))
        .with("TextInput", |ctx| Box::new(TextInput::new(ctx)))
        .with("FileInput", |ctx| Box::new(FileInput::new(ctx)))
        .with("HiddenInput", |ctx| Box::new(HiddenInput::new(ctx)))
        .with("PriorityInput", |ctx| Box::new(PriorityInput::new(ctx)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::discovery::InputNamespace;
    use crate::model::{Capabilities, ModelSnapshot};
    use crate::options::options;
    use serde_json::json;

    pub(crate) fn context(
        object: Option<ModelSnapshot>,
        name: &str,
        input_type: &str,
        opts: Value,
    ) -> InputContext {
        let bound = object.as_ref().map(|o| BoundMetadata {
            column: o.column(name),
            capabilities: Capabilities::new(),
        });
        InputContext {
            object_name: "user".into(),
            object: object.map(|o| Arc::new(o) as Arc<dyn BoundModel>),
            field: FieldDescriptor {
                name: name.into(),
                input_type: input_type.into(),
                bound,
                options: options(opts),
                reflection: None,
            },
            settings: Arc::new(Settings::default()),
        }
    }

    fn render_control(input: &dyn Input, html5: bool) -> Control {
        let attrs = ControlAttributes {
            html5,
            ..ControlAttributes::default()
        };
        match input.render(attrs) {
            Fragment::Control(control) => control,
            other => panic!("expected a control, got {other:?}"),
        }
    }

    #[test]
    fn test_default_namespace_covers_builtin_mappings() {
        let ns = default_namespace();
        for (name, _) in BUILTIN_MAPPINGS {
            let factory = ns.lookup(name).unwrap_or_else(|| panic!("{name} missing"));
            assert_eq!(factory.namespace(), DEFAULT_NAMESPACE);
        }
        assert_eq!(ns.len(), BUILTIN_MAPPINGS.len());
    }

    #[test]
    fn test_dom_id_and_input_name() {
        let ctx = context(None, "email", "email", json!({}));
        assert_eq!(ctx.dom_id(), "user_email");
        assert_eq!(ctx.input_name(), "user[email]");

        let ctx = context(None, "tag_ids", "select", json!({"input_html": {"multiple": true}}));
        assert_eq!(ctx.input_name(), "user[tag_ids][]");
    }

    #[test]
    fn test_required_precedence() {
        let ctx = context(None, "email", "email", json!({}));
        assert!(ctx.is_required());

        let ctx = context(None, "email", "email", json!({"required": false}));
        assert!(!ctx.is_required());

        let model = ModelSnapshot::new("user")
            .validator("name", AttributeValidator::Presence { conditional: false });
        let ctx = context(Some(model.clone()), "email", "email", json!({}));
        assert!(!ctx.is_required());
        let ctx = context(Some(model), "name", "string", json!({}));
        assert!(ctx.is_required());

        let conditional = ModelSnapshot::new("user")
            .validator("name", AttributeValidator::Presence { conditional: true });
        let ctx = context(Some(conditional), "name", "string", json!({}));
        assert!(!ctx.is_required());
    }

    #[test]
    fn test_errors_include_association_errors() {
        let model = ModelSnapshot::new("post")
            .error("author_id", "is invalid")
            .error("author", "must exist");
        let ctx = context(Some(model), "author_id", "select", json!({}));
        assert_eq!(ctx.errors(), vec!["is invalid", "must exist"]);
        assert!(ctx.has_errors());
        assert!(ctx.is_validated());
    }

    #[test]
    fn test_label_text_precedence() {
        let model = ModelSnapshot::new("user").human_name("email", "E-mail address");
        let ctx = context(Some(model.clone()), "email", "email", json!({"label": "Your email"}));
        assert_eq!(ctx.label_text(), "Your email");
        let ctx = context(Some(model), "email", "email", json!({}));
        assert_eq!(ctx.label_text(), "E-mail address");
        let ctx = context(None, "first_name", "string", json!({}));
        assert_eq!(ctx.label_text(), "First name");
    }

    #[test]
    fn test_string_input_html5_types() {
        let ctx = context(None, "email", "email", json!({}));
        let control = render_control(&StringInput::new(ctx.clone()), true);
        assert_eq!(control.kind, ControlKind::Input { input_type: "email".into() });

        let control = render_control(&StringInput::new(ctx), false);
        assert_eq!(control.kind, ControlKind::Input { input_type: "text".into() });

        let ctx = context(None, "token", "uuid", json!({}));
        let control = render_control(&StringInput::new(ctx), true);
        assert_eq!(control.kind, ControlKind::Input { input_type: "text".into() });
    }

    #[test]
    fn test_password_never_echoes_value() {
        let model = ModelSnapshot::new("user").value("password", json!("hunter2"));
        let ctx = context(Some(model), "password", "password", json!({}));
        let control = render_control(&PasswordInput::new(ctx), true);
        assert!(control.value.is_none());
    }

    #[test]
    fn test_numeric_step() {
        let ctx = context(None, "age", "integer", json!({}));
        let control = render_control(&NumericInput::new(ctx), true);
        assert_eq!(control.attribute("step"), Some(&json!(1)));

        let ctx = context(None, "price", "decimal", json!({}));
        let control = render_control(&NumericInput::new(ctx), true);
        assert_eq!(control.attribute("step"), Some(&json!("any")));
        assert_eq!(control.kind, ControlKind::Input { input_type: "number".into() });
    }

    #[test]
    fn test_boolean_checked() {
        let model = ModelSnapshot::new("user").value("admin", json!(true));
        let ctx = context(Some(model), "admin", "boolean", json!({}));
        let control = render_control(&BooleanInput::new(ctx), true);
        assert_eq!(control.attribute("checked"), Some(&json!(true)));
        assert_eq!(
            control.kind,
            ControlKind::Checkbox {
                checked_value: "1".into(),
                unchecked_value: Some("0".into())
            }
        );

        let ctx = context(None, "admin", "boolean", json!({"include_hidden": false}));
        let control = render_control(&BooleanInput::new(ctx), true);
        assert!(control.attribute("checked").is_none());
        assert!(matches!(control.kind, ControlKind::Checkbox { unchecked_value: None, .. }));
    }

    #[test]
    fn test_datetime_select_or_html5() {
        let ctx = context(None, "born_on", "date", json!({}));
        let control = render_control(&DateTimeInput::new(ctx), true);
        assert_eq!(control.kind, ControlKind::DateTimeSelect { precision: "date".into() });

        let ctx = context(None, "starts_at", "datetime", json!({"html5": true}));
        let control = render_control(&DateTimeInput::new(ctx), true);
        assert_eq!(
            control.kind,
            ControlKind::Input { input_type: "datetime-local".into() }
        );
    }

    #[test]
    fn test_hidden_disables_components() {
        let ctx = context(None, "token", "hidden", json!({}));
        let input = HiddenInput::new(ctx);
        assert!(input.disabled_components().contains(&"label"));
        assert!(input.disabled_components().contains(&"error"));
        assert_eq!(render_control(&input, true).kind, ControlKind::Hidden);
    }

    #[test]
    fn test_collection_scalars_and_pairs() {
        let model = ModelSnapshot::new("user").value("role", json!("admin"));
        let ctx = context(Some(model), "role", "select", json!({"collection": ["admin", "guest"]}));
        let choices = collection_choices(&ctx);
        assert_eq!(choices.len(), 2);
        assert!(choices[0].selected);
        assert!(!choices[1].selected);

        let ctx = context(None, "level", "radio_buttons", json!({"collection": [["Low", 1], ["High", 2]]}));
        let choices = collection_choices(&ctx);
        assert_eq!(choices[1], Choice::new("High", "2"));
    }

    #[test]
    fn test_collection_records_with_detection() {
        let ctx = context(
            None,
            "author_id",
            "select",
            json!({"collection": [{"id": 7, "name": "Ada"}, {"id": 9, "title": "Grace"}], "selected": 9}),
        );
        let choices = collection_choices(&ctx);
        assert_eq!(choices[0].label, "Ada");
        assert_eq!(choices[0].value, "7");
        assert_eq!(choices[1].label, "Grace");
        assert!(choices[1].selected);
    }

    #[test]
    fn test_collection_explicit_methods() {
        let ctx = context(
            None,
            "author_id",
            "select",
            json!({"collection": [{"uid": "a1", "nick": "ada"}], "label_method": "nick", "value_method": "uid"}),
        );
        assert_eq!(collection_choices(&ctx), vec![Choice::new("ada", "a1")]);
    }

    #[test]
    fn test_boolean_collection_without_collection() {
        let ctx = context(None, "active", "radio_buttons", json!({}));
        let choices = collection_choices(&ctx);
        assert_eq!(choices, vec![Choice::new("Yes", "true"), Choice::new("No", "false")]);
    }

    #[test]
    fn test_select_include_blank_rules() {
        let ctx = context(None, "role", "select", json!({"collection": ["a"]}));
        let control = render_control(&CollectionSelectInput::new(ctx), true);
        assert!(matches!(control.kind, ControlKind::Select { include_blank: true, .. }));

        let ctx = context(None, "role", "select", json!({"collection": ["a"], "prompt": "Pick"}));
        let control = render_control(&CollectionSelectInput::new(ctx), true);
        assert!(matches!(control.kind, ControlKind::Select { include_blank: false, .. }));
    }

    #[test]
    fn test_check_boxes_submit_arrays() {
        let ctx = context(None, "roles", "check_boxes", json!({"collection": ["a", "b"]}));
        let control = render_control(&CollectionCheckBoxesInput::new(ctx), true);
        assert_eq!(control.name, "user[roles][]");
    }

    #[test]
    fn test_priority_from_settings() {
        let mut ctx = context(None, "country", "country", json!({}));
        let mut settings = Settings::default();
        settings.country_priority = vec!["DE".into(), "FR".into()];
        ctx.settings = Arc::new(settings);
        let control = render_control(&PriorityInput::new(ctx), true);
        assert_eq!(
            control.kind,
            ControlKind::PrioritySelect {
                source: "country".into(),
                priority: vec!["DE".into(), "FR".into()],
                include_blank: true,
            }
        );
    }

    #[test]
    fn test_block_input_renders_content() {
        let ctx = context(None, "bio", "text", json!({}));
        let input = BlockInput::new(ctx, "<editor/>");
        assert_eq!(
            input.render(ControlAttributes::default()),
            Fragment::Content { body: "<editor/>".into() }
        );
    }

    #[test]
    fn test_disabled_control() {
        let ctx = context(None, "email", "email", json!({"disabled": true}));
        assert!(ctx.base_classes(true).contains(&"disabled".to_string()));
        let control = render_control(&StringInput::new(ctx), true);
        assert_eq!(control.attribute("disabled"), Some(&json!(true)));
    }
}
