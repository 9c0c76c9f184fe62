//! The bound-model collaborator.
//!
//! Field resolution never talks to an ORM directly. Instead the host exposes
//! the object behind a form through the [`BoundModel`] trait: column types,
//! attribute presence, association reflections, capability probes, values,
//! errors, and validators. [`ModelSnapshot`] is an in-memory implementation
//! for hosts that already hold this metadata as plain data (and for tests).

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record returned by a record source: attribute name → value.
pub type Record = serde_json::Map<String, Value>;

/// Storage type of a model attribute, as reported by the bound model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Citext,
    Text,
    Integer,
    BigInteger,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Timestamp,
    Binary,
    Uuid,
    Json,
    Jsonb,
    Hstore,
    /// An attribute stored through an encryption wrapper.
    Encrypted(Box<ColumnType>),
    /// Any other storage type, by name.
    Other(String),
}

impl ColumnType {
    /// The base semantic type derived from this storage type.
    ///
    /// `timestamp` normalizes to `datetime` and encrypted attributes to
    /// `string`.
    pub fn base_input_type(&self) -> String {
        match self {
            Self::String | Self::Binary | Self::Encrypted(_) => "string".to_string(),
            Self::Citext => "citext".to_string(),
            Self::Text => "text".to_string(),
            Self::Integer | Self::BigInteger => "integer".to_string(),
            Self::Float => "float".to_string(),
            Self::Decimal => "decimal".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Date => "date".to_string(),
            Self::DateTime | Self::Timestamp => "datetime".to_string(),
            Self::Time => "time".to_string(),
            Self::Uuid => "uuid".to_string(),
            Self::Json => "json".to_string(),
            Self::Jsonb => "jsonb".to_string(),
            Self::Hstore => "hstore".to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    /// Returns `true` for types that take part in the name heuristics.
    pub const fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Citext | Self::Encrypted(_))
    }
}

/// Column metadata for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// The storage type.
    pub column_type: ColumnType,
    /// Maximum length, when the storage enforces one.
    pub limit: Option<usize>,
}

impl Column {
    /// Creates column metadata without a length limit.
    pub const fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            limit: None,
        }
    }

    /// Sets the length limit.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A set of named boolean probes the bound model answers "yes" to.
///
/// Used for capability checks such as file-attachment detection
/// (`avatar_attachment`, `remote_avatar_url`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    probes: BTreeSet<String>,
}

impl Capabilities {
    /// Creates an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a probe.
    #[must_use]
    pub fn with(mut self, probe: impl Into<String>) -> Self {
        self.probes.insert(probe.into());
        self
    }

    /// Returns `true` if the probe is present.
    pub fn has(&self, probe: &str) -> bool {
        self.probes.contains(probe)
    }

    /// Returns `true` if no probe is present.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

/// Validator metadata for an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeValidator {
    /// The attribute must be present.
    Presence {
        /// Conditional validators (`if`/`unless`) do not mark a field required.
        conditional: bool,
    },
    /// Length bounds.
    Length {
        minimum: Option<usize>,
        maximum: Option<usize>,
    },
    /// Numeric bounds.
    Numericality {
        greater_than: Option<f64>,
        greater_than_or_equal_to: Option<f64>,
        less_than: Option<f64>,
        less_than_or_equal_to: Option<f64>,
        only_integer: bool,
    },
    /// The value must match a regular expression.
    Format { pattern: String },
}

/// The kind of association macro a reflection was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroKind {
    BelongsTo,
    HasOne,
    HasMany,
    HasAndBelongsToMany,
}

impl MacroKind {
    /// The cardinality implied by the macro.
    pub const fn cardinality(self) -> Cardinality {
        match self {
            Self::BelongsTo | Self::HasOne => Cardinality::Single,
            Self::HasMany | Self::HasAndBelongsToMany => Cardinality::Multiple,
        }
    }
}

/// How many records an association attribute refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Single,
    Multiple,
}

/// A reference to an association, as used to derive an attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationReference {
    /// The association macro.
    pub macro_kind: MacroKind,
    /// The association name (`author`, `tags`).
    pub target_name: String,
    /// Explicit foreign key for `belongs_to`.
    pub foreign_key: Option<String>,
}

/// A query against the records of an association target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Equality conditions, all of which must hold.
    pub conditions: Vec<(String, Value)>,
    /// Ordering, e.g. `"name"` or `"created_at desc"`.
    pub order: Option<String>,
}

impl Query {
    /// The unscoped "all records" query.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn filter(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.conditions.push((attribute.into(), value));
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }
}

/// A scope function declared on an association.
///
/// The variant records the declared arity: class scopes take no argument and
/// run against the target model; instance scopes receive the bound object.
#[derive(Clone)]
pub enum AssociationScope {
    Class(Arc<dyn Fn() -> Query + Send + Sync>),
    Instance(Arc<dyn Fn(&dyn BoundModel) -> Query + Send + Sync>),
}

impl fmt::Debug for AssociationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(_) => f.write_str("AssociationScope::Class(..)"),
            Self::Instance(_) => f.write_str("AssociationScope::Instance(..)"),
        }
    }
}

/// Declared `conditions` on an association.
#[derive(Clone)]
pub enum Conditions {
    Static(Vec<(String, Value)>),
    /// Evaluated against the bound object at fetch time.
    Computed(Arc<dyn Fn(&dyn BoundModel) -> Vec<(String, Value)> + Send + Sync>),
}

impl fmt::Debug for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(conditions) => f.debug_tuple("Conditions::Static").field(conditions).finish(),
            Self::Computed(_) => f.write_str("Conditions::Computed(..)"),
        }
    }
}

/// Association metadata reported by the bound model.
#[derive(Debug, Clone)]
pub struct AssociationReflection {
    /// The association name.
    pub name: String,
    /// The association macro.
    pub macro_kind: MacroKind,
    /// The target model name used to fetch candidate records.
    pub target: String,
    /// Explicit foreign key.
    pub foreign_key: Option<String>,
    /// Declared scope function.
    pub scope: Option<AssociationScope>,
    /// Declared ordering.
    pub order: Option<String>,
    /// Declared conditions.
    pub conditions: Option<Conditions>,
}

impl AssociationReflection {
    /// Creates a reflection with no scope, order, conditions or foreign key.
    pub fn new(name: impl Into<String>, macro_kind: MacroKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            macro_kind,
            target: target.into(),
            foreign_key: None,
            scope: None,
            order: None,
            conditions: None,
        }
    }

    /// Sets the foreign key.
    #[must_use]
    pub fn foreign_key(mut self, key: impl Into<String>) -> Self {
        self.foreign_key = Some(key.into());
        self
    }

    /// Sets the scope function.
    #[must_use]
    pub fn scope(mut self, scope: AssociationScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the declared ordering.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets the declared conditions.
    #[must_use]
    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// The association reference used for attribute naming.
    pub fn reference(&self) -> AssociationReference {
        AssociationReference {
            macro_kind: self.macro_kind,
            target_name: self.name.clone(),
            foreign_key: self.foreign_key.clone(),
        }
    }
}

/// The object a form is bound to.
///
/// Only [`model_name`](BoundModel::model_name), [`column`](BoundModel::column)
/// and [`capabilities`](BoundModel::capabilities) are required; every other
/// method defaults to "no information", which the pipeline treats as the
/// documented fallback rather than an error.
pub trait BoundModel: Send + Sync {
    /// The param key used for control names and ids (`user`).
    fn model_name(&self) -> &str;

    /// Column metadata for an attribute.
    fn column(&self, attribute: &str) -> Option<Column>;

    /// Returns `true` if the attribute is a known model attribute.
    fn has_attribute(&self, attribute: &str) -> bool {
        self.column(attribute).is_some()
    }

    /// Named capability probes.
    fn capabilities(&self) -> &Capabilities;

    /// Association metadata by association name.
    fn reflect_association(&self, _name: &str) -> Option<AssociationReflection> {
        None
    }

    /// The records of an association, if already materialized on the object.
    fn loaded_association(&self, _name: &str) -> Option<Vec<Record>> {
        None
    }

    /// The current value of an attribute.
    fn value(&self, _attribute: &str) -> Option<Value> {
        None
    }

    /// Error messages for an attribute.
    fn errors_for(&self, _attribute: &str) -> Vec<String> {
        Vec::new()
    }

    /// Returns `true` once the object has been validated.
    fn validated(&self) -> bool {
        false
    }

    /// Validators for an attribute, or `None` if the model does not expose
    /// validator reflection at all.
    fn validators_for(&self, _attribute: &str) -> Option<Vec<AttributeValidator>> {
        None
    }

    /// The human-readable attribute name.
    fn human_attribute_name(&self, _attribute: &str) -> Option<String> {
        None
    }

    /// Fetches records of `target` matching `query`.
    fn fetch_records(&self, _target: &str, _query: &Query) -> Vec<Record> {
        Vec::new()
    }
}

/// An in-memory [`BoundModel`].
///
/// # Examples
///
/// ```
/// use formwright_forms::model::{BoundModel, Column, ColumnType, ModelSnapshot};
///
/// let user = ModelSnapshot::new("user")
///     .column("email", Column::new(ColumnType::String))
///     .value("email", serde_json::json!("ada@example.com"));
/// assert!(user.has_attribute("email"));
/// assert!(!user.has_attribute("name"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelSnapshot {
    model_name: String,
    columns: HashMap<String, Column>,
    values: HashMap<String, Value>,
    errors: HashMap<String, Vec<String>>,
    validated: bool,
    validators: HashMap<String, Vec<AttributeValidator>>,
    reflects_validators: bool,
    human_names: HashMap<String, String>,
    capabilities: Capabilities,
    associations: HashMap<String, AssociationReflection>,
    loaded: HashMap<String, Vec<Record>>,
    tables: HashMap<String, Vec<Record>>,
}

impl ModelSnapshot {
    /// Creates an empty snapshot for the given model name.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// Declares an attribute column.
    #[must_use]
    pub fn column(mut self, attribute: impl Into<String>, column: Column) -> Self {
        self.columns.insert(attribute.into(), column);
        self
    }

    /// Sets an attribute value.
    #[must_use]
    pub fn value(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.values.insert(attribute.into(), value);
        self
    }

    /// Adds an error to an attribute and marks the object validated.
    #[must_use]
    pub fn error(mut self, attribute: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(attribute.into())
            .or_default()
            .push(message.into());
        self.validated = true;
        self
    }

    /// Marks the object as validated.
    #[must_use]
    pub const fn validated(mut self) -> Self {
        self.validated = true;
        self
    }

    /// Declares a validator. Once any validator is declared, the snapshot
    /// reports validator reflection for every attribute.
    #[must_use]
    pub fn validator(mut self, attribute: impl Into<String>, validator: AttributeValidator) -> Self {
        self.validators
            .entry(attribute.into())
            .or_default()
            .push(validator);
        self.reflects_validators = true;
        self
    }

    /// Sets the human-readable name of an attribute.
    #[must_use]
    pub fn human_name(mut self, attribute: impl Into<String>, name: impl Into<String>) -> Self {
        self.human_names.insert(attribute.into(), name.into());
        self
    }

    /// Adds a capability probe.
    #[must_use]
    pub fn capability(mut self, probe: impl Into<String>) -> Self {
        self.capabilities = self.capabilities.with(probe);
        self
    }

    /// Declares an association.
    #[must_use]
    pub fn association(mut self, reflection: AssociationReflection) -> Self {
        self.associations.insert(reflection.name.clone(), reflection);
        self
    }

    /// Marks an association as materialized with the given records.
    #[must_use]
    pub fn loaded(mut self, association: impl Into<String>, records: Vec<Record>) -> Self {
        self.loaded.insert(association.into(), records);
        self
    }

    /// Sets the records a target model holds.
    #[must_use]
    pub fn table(mut self, target: impl Into<String>, records: Vec<Record>) -> Self {
        self.tables.insert(target.into(), records);
        self
    }
}

impl BoundModel for ModelSnapshot {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn column(&self, attribute: &str) -> Option<Column> {
        self.columns.get(attribute).cloned()
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn reflect_association(&self, name: &str) -> Option<AssociationReflection> {
        self.associations.get(name).cloned()
    }

    fn loaded_association(&self, name: &str) -> Option<Vec<Record>> {
        self.loaded.get(name).cloned()
    }

    fn value(&self, attribute: &str) -> Option<Value> {
        self.values.get(attribute).cloned()
    }

    fn errors_for(&self, attribute: &str) -> Vec<String> {
        self.errors.get(attribute).cloned().unwrap_or_default()
    }

    fn validated(&self) -> bool {
        self.validated
    }

    fn validators_for(&self, attribute: &str) -> Option<Vec<AttributeValidator>> {
        self.reflects_validators
            .then(|| self.validators.get(attribute).cloned().unwrap_or_default())
    }

    fn human_attribute_name(&self, attribute: &str) -> Option<String> {
        self.human_names.get(attribute).cloned()
    }

    fn fetch_records(&self, target: &str, query: &Query) -> Vec<Record> {
        let Some(records) = self.tables.get(target) else {
            return Vec::new();
        };
        let mut matched: Vec<Record> = records
            .iter()
            .filter(|record| {
                query
                    .conditions
                    .iter()
                    .all(|(attribute, expected)| record.get(attribute) == Some(expected))
            })
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            let mut parts = order.split_whitespace();
            let attribute = parts.next().unwrap_or_default().to_string();
            let descending = parts
                .next()
                .is_some_and(|direction| direction.eq_ignore_ascii_case("desc"));
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(&attribute), b.get(&attribute));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        matched
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
