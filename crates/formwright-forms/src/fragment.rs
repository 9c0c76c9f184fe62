//! Abstract output fragments.
//!
//! The pipeline never emits markup. A rendered field is a tree of
//! [`Fragment`] values that a view layer turns into HTML (or anything else).
//! Every type here is serde-serializable so the tree can cross process or
//! language boundaries unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One option of a collection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// The visible text.
    pub label: String,
    /// The submitted value.
    pub value: String,
    /// Whether this option is currently selected or checked.
    pub selected: bool,
}

impl Choice {
    /// Creates an unselected choice.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            selected: false,
        }
    }
}

/// The kind of form control a renderer produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ControlKind {
    /// A single-line input with an HTML `type`.
    Input { input_type: String },
    /// A multi-line text area.
    TextArea,
    /// A checkbox paired with a hidden "unchecked" value.
    Checkbox {
        checked_value: String,
        unchecked_value: Option<String>,
    },
    /// A select box.
    Select {
        choices: Vec<Choice>,
        multiple: bool,
        include_blank: bool,
        prompt: Option<String>,
    },
    /// A set of radio buttons.
    RadioButtons { choices: Vec<Choice> },
    /// A set of check boxes.
    CheckBoxes { choices: Vec<Choice> },
    /// A select whose options come from a named source list (countries,
    /// time zones), with priority entries listed first.
    PrioritySelect {
        source: String,
        priority: Vec<String>,
        include_blank: bool,
    },
    /// Separate selects for the parts of a date, a datetime or a time.
    DateTimeSelect { precision: String },
    /// A file upload field.
    File { multiple: bool },
    /// A hidden field.
    Hidden,
}

/// A form control with its identity and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// What kind of control this is.
    pub kind: ControlKind,
    /// The submitted parameter name (`user[email]`).
    pub name: String,
    /// The DOM id (`user_email`).
    pub id: String,
    /// The current value, if any.
    pub value: Option<Value>,
    /// CSS classes, in order, without duplicates.
    pub classes: Vec<String>,
    /// Extra attributes, in insertion order. Keys are unique.
    pub attributes: Map<String, Value>,
}

impl Control {
    /// Returns the attribute value for `key`.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns `true` if the control carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A label for a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFragment {
    pub text: String,
    /// The id of the control this label is for.
    pub for_id: Option<String>,
    /// Whether a required marker is shown.
    pub required: bool,
    pub classes: Vec<String>,
}

/// A hint shown below a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintFragment {
    pub text: String,
    pub classes: Vec<String>,
}

/// An error message for a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFragment {
    pub message: String,
    /// `true` for full errors, which are prefixed with the label text.
    pub full: bool,
    pub classes: Vec<String>,
}

/// A nested element produced by a wrapper component group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFragment {
    /// The component name the group was declared with.
    pub name: String,
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub children: Vec<Fragment>,
}

/// A form button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonFragment {
    /// The button kind (`submit`, `button`, `reset`).
    pub button_type: String,
    pub value: String,
    pub classes: Vec<String>,
    pub attributes: Map<String, Value>,
}

/// A piece of rendered output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fragment", rename_all = "snake_case")]
pub enum Fragment {
    Label(LabelFragment),
    Control(Control),
    Hint(HintFragment),
    Error(ErrorFragment),
    Group(GroupFragment),
    /// Caller-supplied content standing in for a control.
    Content { body: String },
    Button(ButtonFragment),
}

impl Fragment {
    /// A short name for the fragment kind: `label`, `control`, `hint`,
    /// `error`, `group`, `content` or `button`.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Label(_) => "label",
            Self::Control(_) => "control",
            Self::Hint(_) => "hint",
            Self::Error(_) => "error",
            Self::Group(_) => "group",
            Self::Content { .. } => "content",
            Self::Button(_) => "button",
        }
    }

    /// Returns the control, if this fragment is one.
    pub const fn as_control(&self) -> Option<&Control> {
        match self {
            Self::Control(control) => Some(control),
            _ => None,
        }
    }
}

/// The complete output for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedField {
    /// The outer element tag, or `None` when the field is unwrapped.
    pub tag: Option<String>,
    /// Classes on the outer element.
    pub classes: Vec<String>,
    /// Extra attributes on the outer element (from `wrapper_html`).
    pub attributes: Map<String, Value>,
    /// The rendered components, in wrapper order.
    pub fragments: Vec<Fragment>,
}

impl RenderedField {
    /// The kind names of the top-level fragments, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.fragments.iter().map(Fragment::kind_name).collect()
    }

    /// The kind names of every leaf fragment, flattening groups.
    pub fn flat_kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        collect_kinds(&self.fragments, &mut kinds);
        kinds
    }

    /// Finds the control anywhere in the tree.
    pub fn control(&self) -> Option<&Control> {
        find_control(&self.fragments)
    }

    /// Returns `true` if the outer element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

fn collect_kinds(fragments: &[Fragment], out: &mut Vec<&'static str>) {
    for fragment in fragments {
        match fragment {
            Fragment::Group(group) => collect_kinds(&group.children, out),
            other => out.push(other.kind_name()),
        }
    }
}

fn find_control(fragments: &[Fragment]) -> Option<&Control> {
    fragments.iter().find_map(|fragment| match fragment {
        Fragment::Control(control) => Some(control),
        Fragment::Group(group) => find_control(&group.children),
        _ => None,
    })
}

/// Appends `class` to `classes` unless it is already present or empty.
pub(crate) fn push_class(classes: &mut Vec<String>, class: &str) {
    if !class.is_empty() && !classes.iter().any(|c| c == class) {
        classes.push(class.to_string());
    }
}
