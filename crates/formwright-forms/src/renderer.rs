//! Field composition.
//!
//! [`FieldRenderer`] ties the pipeline together for one form: it describes a
//! field (merged options + semantic type), instantiates the renderer,
//! selects a wrapper and walks the wrapper's components in order.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use formwright_core::logging::field_span;
use formwright_core::settings::Settings;
use formwright_core::FormResult;

use crate::components::{self, is_decorator, ATTRIBUTE_COMPONENTS};
use crate::fragment::{push_class, Control, Fragment, GroupFragment, RenderedField};
use crate::inputs::{BlockInput, ControlAttributes, FieldDescriptor, Input, InputContext};
use crate::mapping::MappingResolver;
use crate::model::BoundModel;
use crate::options::{class_list, is_disabled, is_set, map_option, merge_defaults, Options};
use crate::type_resolver::{BoundMetadata, TypeResolver};
use crate::wrappers::{ComponentSpec, Wrapper, WrapperResolver};

/// Option keys never folded into control attributes in control-only mode.
const FIELD_ONLY_EXCLUDED: &[&str] = &[
    "as",
    "boolean_style",
    "collection",
    "disabled",
    "label_method",
    "value_method",
    "prompt",
];

/// Renders the fields of one form.
pub struct FieldRenderer<'a> {
    pub(crate) object_name: &'a str,
    pub(crate) object: Option<&'a Arc<dyn BoundModel>>,
    pub(crate) settings: &'a Arc<Settings>,
    pub(crate) types: &'a TypeResolver,
    pub(crate) mappings: MappingResolver<'a>,
    pub(crate) wrappers: WrapperResolver<'a>,
    pub(crate) defaults: &'a Options,
    pub(crate) wrapper_mappings: &'a HashMap<String, String>,
    pub(crate) default_wrapper: &'a str,
}

impl<'a> FieldRenderer<'a> {
    /// Merges the form defaults under `options` and resolves the semantic
    /// type of `attribute`.
    pub fn describe(&self, attribute: &str, options: Options) -> FieldDescriptor {
        let options = merge_defaults(self.defaults, options);
        let bound = self
            .object
            .map(|object| BoundMetadata::from_model(object.as_ref(), attribute));
        let input_type = self.types.resolve(attribute, &options, bound.as_ref());
        FieldDescriptor {
            name: attribute.to_string(),
            input_type,
            bound,
            options,
            reflection: None,
        }
    }

    fn context(&self, field: FieldDescriptor) -> InputContext {
        InputContext {
            object_name: self.object_name.to_string(),
            object: self.object.cloned(),
            field,
            settings: Arc::clone(self.settings),
        }
    }

    fn wrapper(&self, field: &FieldDescriptor) -> FormResult<Arc<Wrapper>> {
        self.wrappers.resolve(
            &field.input_type,
            field.options.get("wrapper"),
            self.wrapper_mappings,
            &self.settings.wrapper_mappings,
            self.default_wrapper,
        )
    }

    /// Renders a full field: the wrapper's components around the control.
    ///
    /// With `block`, the caller's content replaces the control and no
    /// renderer lookup happens; label, hint and error still render.
    ///
    /// # Errors
    ///
    /// Fails when no renderer is found for the semantic type or the wrapper
    /// cannot be resolved.
    pub fn render_field(&self, field: FieldDescriptor, block: Option<String>) -> FormResult<RenderedField> {
        let span = field_span(self.object_name, &field.name);
        let _guard = span.enter();

        let wrapper = self.wrapper(&field)?;
        let input: Box<dyn Input> = match block {
            Some(body) => Box::new(BlockInput::new(self.context(field), body)),
            None => {
                let factory = self.mappings.resolve(&field.input_type)?;
                debug!(renderer = %factory.qualified_name(), wrapper = %wrapper.name, "rendering field");
                factory.build(self.context(field))
            }
        };
        Ok(compose(input.as_ref(), &wrapper))
    }

    /// Renders only the control for `attribute`.
    ///
    /// Only the attribute decorators the resolved wrapper declares are
    /// applied. Remaining caller options become control attributes.
    ///
    /// # Errors
    ///
    /// Fails when no renderer is found or the wrapper cannot be resolved.
    pub fn render_field_only(&self, attribute: &str, options: Options) -> FormResult<Fragment> {
        let span = field_span(self.object_name, attribute);
        let _guard = span.enter();

        let mut field = self.describe(attribute, options.clone());
        let wrapper = self.wrapper(&field)?;
        let decorators: Vec<&str> = ATTRIBUTE_COMPONENTS
            .iter()
            .copied()
            .filter(|name| wrapper.declares(name))
            .collect();

        // Only call-site options are folded; form defaults contribute their
        // `input_html` alone.
        let mut call_site = options;
        let folded = fold_into_input_html(&call_site, &decorators);
        call_site.insert("input_html".into(), Value::Object(folded));
        field.options = merge_defaults(self.defaults, call_site);

        let factory = self.mappings.resolve(&field.input_type)?;
        let input = factory.build(self.context(field));
        let context = input.context();

        let required = context.is_required() && !input.disabled_components().contains(&"required");
        let mut attributes = ControlAttributes::with_classes(context.base_classes(required));
        for name in &decorators {
            components::decorate(name, context, required, &mut attributes);
        }

        let has_errors = context.has_errors();
        let extra_class = if has_errors {
            self.settings.input_field_error_class.as_deref()
        } else if context.is_validated() {
            self.settings.input_field_valid_class.as_deref()
        } else {
            None
        };
        if let Some(class) = extra_class {
            push_class(&mut attributes.classes, class);
        }

        Ok(render_control(input.as_ref(), attributes))
    }
}

/// Caller options become control attributes: everything except the excluded
/// keys and the active decorators, with `input_html` merged in last.
fn fold_into_input_html(options: &Options, decorators: &[&str]) -> Options {
    let mut folded: Options = options
        .iter()
        .filter(|(key, _)| {
            let key = key.as_str();
            key != "input_html" && !FIELD_ONLY_EXCLUDED.contains(&key) && !decorators.contains(&key)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if let Some(html) = map_option(options, "input_html") {
        for (key, value) in html {
            folded.insert(key.clone(), value.clone());
        }
    }
    folded
}

/// Builds the control and merges the field's `input_html` over it.
fn render_control(input: &dyn Input, attributes: ControlAttributes) -> Fragment {
    let mut fragment = input.render(attributes);
    if let (Fragment::Control(control), Some(html)) = (&mut fragment, input.context().input_html()) {
        apply_input_html(control, html);
    }
    fragment
}

fn apply_input_html(control: &mut Control, html: &Map<String, Value>) {
    for (key, value) in html {
        match key.as_str() {
            "class" => {
                for class in class_list(Some(value)) {
                    push_class(&mut control.classes, &class);
                }
            }
            "id" => {
                if let Some(id) = value.as_str() {
                    control.id = id.to_string();
                }
            }
            "name" => {
                if let Some(name) = value.as_str() {
                    control.name = name.to_string();
                }
            }
            "value" => control.value = Some(value.clone()),
            // Carried by the control kind and name.
            "multiple" => {}
            _ => {
                control.attributes.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Returns `true` if a component renders for this field.
///
/// A slot explicitly set to `false` or disabled by the renderer is off;
/// optional components need their slot set.
fn is_active(spec: &ComponentSpec, options: &Options, disabled: &[&str]) -> bool {
    if disabled.contains(&spec.name.as_str()) || is_disabled(options, &spec.name) {
        return false;
    }
    !spec.optional || is_set(options, &spec.name)
}

fn apply_decorators(
    components: &[ComponentSpec],
    context: &InputContext,
    required: bool,
    disabled: &[&str],
    attributes: &mut ControlAttributes,
) {
    for spec in components {
        if !is_active(spec, context.options(), disabled) {
            continue;
        }
        if spec.is_group() {
            apply_decorators(&spec.components, context, required, disabled, attributes);
        } else if is_decorator(&spec.name) {
            components::decorate(&spec.name, context, required, attributes);
        }
    }
}

struct Composition<'c> {
    context: &'c InputContext,
    control: &'c Fragment,
    required: bool,
    disabled: &'c [&'static str],
}

impl Composition<'_> {
    fn render(&self, components: &[ComponentSpec], out: &mut Vec<Fragment>) {
        let options = self.context.options();
        for spec in components {
            if !is_active(spec, options, self.disabled) {
                continue;
            }
            if spec.is_group() {
                let mut children = Vec::new();
                self.render(&spec.components, &mut children);
                if !children.is_empty() {
                    out.push(Fragment::Group(GroupFragment {
                        name: spec.name.clone(),
                        tag: spec.tag.clone(),
                        classes: spec.classes.clone(),
                        children,
                    }));
                }
                continue;
            }
            match spec.name.as_str() {
                "label" => out.push(self.label(&spec.options)),
                "input" => out.push(self.control.clone()),
                "label_input" => {
                    let label_on = !is_disabled(options, "label") && !self.disabled.contains(&"label");
                    if label_on {
                        out.push(self.label(&spec.options));
                    }
                    out.push(self.control.clone());
                }
                "hint" => out.extend(components::hint(self.context, &spec.options)),
                "error" => out.extend(components::error(self.context, &spec.options)),
                "full_error" => out.extend(components::full_error(self.context, &spec.options)),
                _ => {}
            }
        }
    }

    fn label(&self, spec_options: &Options) -> Fragment {
        components::label(self.context, self.required, spec_options)
    }
}

/// Renders `input` inside `wrapper`.
pub fn compose(input: &dyn Input, wrapper: &Wrapper) -> RenderedField {
    let context = input.context();
    let options = context.options();
    let disabled = input.disabled_components();
    let required = context.is_required() && !disabled.contains(&"required");

    let mut attributes = ControlAttributes::with_classes(context.base_classes(required));
    apply_decorators(&wrapper.components, context, required, disabled, &mut attributes);
    let control = render_control(input, attributes);

    let mut fragments = Vec::new();
    Composition {
        context,
        control: &control,
        required,
        disabled,
    }
    .render(&wrapper.components, &mut fragments);

    if is_disabled(options, "wrapper") {
        return RenderedField {
            tag: None,
            classes: Vec::new(),
            attributes: Map::new(),
            fragments,
        };
    }

    let has_errors = context.has_errors();
    let has_hint = fragments_contain_hint(&fragments);
    let mut classes = Vec::new();
    for class in &wrapper.classes {
        push_class(&mut classes, class);
    }
    push_class(&mut classes, &context.field.input_type);
    push_class(&mut classes, if required { "required" } else { "optional" });
    if context.is_disabled() {
        push_class(&mut classes, "disabled");
    }
    if has_errors {
        if let Some(class) = &wrapper.error_class {
            push_class(&mut classes, class);
        }
    }
    if has_hint {
        if let Some(class) = &wrapper.hint_class {
            push_class(&mut classes, class);
        }
    }
    if !has_errors && context.is_validated() {
        if let Some(class) = &wrapper.valid_class {
            push_class(&mut classes, class);
        }
    }

    let mut attributes = Map::new();
    if let Some(html) = map_option(options, "wrapper_html") {
        for (key, value) in html {
            if key == "class" {
                for class in class_list(Some(value)) {
                    push_class(&mut classes, &class);
                }
            } else {
                attributes.insert(key.clone(), value.clone());
            }
        }
    }

    RenderedField {
        tag: wrapper.tag.clone(),
        classes,
        attributes,
        fragments,
    }
}

fn fragments_contain_hint(fragments: &[Fragment]) -> bool {
    fragments.iter().any(|fragment| match fragment {
        Fragment::Hint(_) => true,
        Fragment::Group(group) => fragments_contain_hint(&group.children),
        _ => false,
    })
}
