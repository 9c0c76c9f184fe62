//! Association fields.
//!
//! An association (`author`, `tags`) is not itself an attribute. These
//! resolvers turn it into one (`author_id`, `tag_ids`) with adjusted options,
//! and fetch the candidate records offered by the control.

use serde_json::Value;
use tracing::debug;

use formwright_core::utils::text::singularize;
use formwright_core::{FormError, FormResult};

use crate::model::{
    AssociationReference, AssociationReflection, AssociationScope, BoundModel, Cardinality, Conditions,
    MacroKind, Query, Record,
};
use crate::options::{bool_option, map_option, map_option_mut, str_option, Options};

/// An association turned into a resolvable attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationAttribute {
    /// The attribute the control submits (`author_id`, `tag_ids`).
    pub attribute: String,
    /// Single for `belongs_to`, multiple for `has_many`/`habtm`.
    pub cardinality: Cardinality,
    /// The options after association adjustments.
    pub options: Options,
    /// The already-loaded associated records, when preloading applied.
    pub preloaded: Option<Vec<Record>>,
}

/// Derives the attribute and options of an association field.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationAttributeResolver;

impl AssociationAttributeResolver {
    /// Resolves `reference` against the bound object.
    ///
    /// `belongs_to` uses the foreign key or `{name}_id`. `has_many` and
    /// `has_and_belongs_to_many` use `{singular name}_ids`; when rendered as
    /// a select they become multi-selects unless the caller set `multiple`.
    /// Loaded associated records are preloaded (unless `preload: false`) and
    /// their ids become the selected values.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigurationError`] for `has_one` associations.
    pub fn resolve(
        reference: &AssociationReference,
        mut options: Options,
        object: &dyn BoundModel,
    ) -> FormResult<AssociationAttribute> {
        let cardinality = reference.macro_kind.cardinality();
        let attribute = match reference.macro_kind {
            MacroKind::BelongsTo => reference
                .foreign_key
                .clone()
                .unwrap_or_else(|| format!("{}_id", reference.target_name)),
            MacroKind::HasOne => {
                return Err(FormError::ConfigurationError(format!(
                    "has_one association '{}' cannot be rendered as a field",
                    reference.target_name
                )));
            }
            MacroKind::HasMany | MacroKind::HasAndBelongsToMany => {
                if str_option(&options, "as").unwrap_or("select") == "select" {
                    let caller_set = map_option(&options, "input_html")
                        .is_some_and(|html| html.contains_key("multiple"));
                    if !caller_set {
                        map_option_mut(&mut options, "input_html").insert("multiple".into(), Value::Bool(true));
                    }
                }
                format!("{}_ids", singularize(&reference.target_name))
            }
        };

        let preload = bool_option(&options, "preload") != Some(false);
        options.remove("preload");
        let preloaded = if preload && cardinality == Cardinality::Multiple {
            object.loaded_association(&reference.target_name)
        } else {
            None
        };

        if let Some(records) = &preloaded {
            if !options.contains_key("selected") {
                let ids: Vec<Value> = records.iter().filter_map(|r| r.get("id").cloned()).collect();
                options.insert("selected".into(), Value::Array(ids));
            }
        }

        debug!(
            association = %reference.target_name,
            attribute = %attribute,
            preloaded = preloaded.is_some(),
            "association resolved"
        );
        Ok(AssociationAttribute {
            attribute,
            cardinality,
            options,
            preloaded,
        })
    }
}

/// Fetches the records an association control offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationCollectionResolver;

impl AssociationCollectionResolver {
    /// Returns the collection for `reflection`.
    ///
    /// An explicit collection wins. Otherwise a declared scope decides the
    /// query (instance scopes receive the bound object). Without a scope,
    /// declared conditions and ordering apply to the unscoped query; with
    /// neither, every record of the target is returned.
    pub fn fetch(
        reflection: &AssociationReflection,
        explicit: Option<&Value>,
        object: &dyn BoundModel,
    ) -> Vec<Value> {
        match explicit {
            Some(Value::Array(items)) => return items.clone(),
            Some(Value::Null | Value::Bool(false)) | None => {}
            Some(other) => return vec![other.clone()],
        }

        let query = match &reflection.scope {
            Some(AssociationScope::Class(scope)) => scope(),
            Some(AssociationScope::Instance(scope)) => scope(object),
            None => {
                let conditions = match &reflection.conditions {
                    Some(Conditions::Static(conditions)) => conditions.clone(),
                    Some(Conditions::Computed(compute)) => compute(object),
                    None => Vec::new(),
                };
                Query {
                    conditions,
                    order: reflection.order.clone(),
                }
            }
        };

        object
            .fetch_records(&reflection.target, &query)
            .into_iter()
            .map(Value::Object)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSnapshot;
    use crate::options::options;
    use serde_json::json;
    use std::sync::Arc;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    fn reference(macro_kind: MacroKind, name: &str) -> AssociationReference {
        AssociationReference {
            macro_kind,
            target_name: name.into(),
            foreign_key: None,
        }
    }

    #[test]
    fn test_belongs_to() {
        let post = ModelSnapshot::new("post");
        let resolved =
            AssociationAttributeResolver::resolve(&reference(MacroKind::BelongsTo, "author"), Options::new(), &post)
                .unwrap();
        assert_eq!(resolved.attribute, "author_id");
        assert_eq!(resolved.cardinality, Cardinality::Single);
        assert!(resolved.options.get("input_html").is_none());
    }

    #[test]
    fn test_belongs_to_foreign_key() {
        let post = ModelSnapshot::new("post");
        let mut r = reference(MacroKind::BelongsTo, "author");
        r.foreign_key = Some("writer_id".into());
        let resolved = AssociationAttributeResolver::resolve(&r, Options::new(), &post).unwrap();
        assert_eq!(resolved.attribute, "writer_id");
    }

    #[test]
    fn test_has_one_fails() {
        let user = ModelSnapshot::new("user");
        let err = AssociationAttributeResolver::resolve(&reference(MacroKind::HasOne, "profile"), Options::new(), &user)
            .unwrap_err();
        assert!(matches!(err, FormError::ConfigurationError(_)));
    }

    #[test]
    fn test_has_many_forces_multiple_select() {
        let post = ModelSnapshot::new("post");
        for kind in [MacroKind::HasMany, MacroKind::HasAndBelongsToMany] {
            let resolved = AssociationAttributeResolver::resolve(
                &reference(kind, "categories"),
                options(json!({"as": "select"})),
                &post,
            )
            .unwrap();
            assert_eq!(resolved.attribute, "category_ids");
            assert_eq!(resolved.cardinality, Cardinality::Multiple);
            assert_eq!(resolved.options["input_html"]["multiple"], json!(true));
        }
    }

    #[test]
    fn test_has_many_respects_caller_multiple() {
        let post = ModelSnapshot::new("post");
        let resolved = AssociationAttributeResolver::resolve(
            &reference(MacroKind::HasMany, "tags"),
            options(json!({"input_html": {"multiple": false}})),
            &post,
        )
        .unwrap();
        assert_eq!(resolved.options["input_html"]["multiple"], json!(false));
    }

    #[test]
    fn test_has_many_check_boxes_not_forced() {
        let post = ModelSnapshot::new("post");
        let resolved = AssociationAttributeResolver::resolve(
            &reference(MacroKind::HasMany, "tags"),
            options(json!({"as": "check_boxes"})),
            &post,
        )
        .unwrap();
        assert!(resolved.options.get("input_html").is_none());
    }

    #[test]
    fn test_preload_sets_selected() {
        let post = ModelSnapshot::new("post").loaded(
            "tags",
            vec![record(json!({"id": 1, "name": "rust"})), record(json!({"id": 4, "name": "c"}))],
        );
        let resolved =
            AssociationAttributeResolver::resolve(&reference(MacroKind::HasMany, "tags"), Options::new(), &post)
                .unwrap();
        assert_eq!(resolved.preloaded.as_ref().map(Vec::len), Some(2));
        assert_eq!(resolved.options["selected"], json!([1, 4]));

        let resolved = AssociationAttributeResolver::resolve(
            &reference(MacroKind::HasMany, "tags"),
            options(json!({"preload": false})),
            &post,
        )
        .unwrap();
        assert!(resolved.preloaded.is_none());
        assert!(resolved.options.get("selected").is_none());
        assert!(resolved.options.get("preload").is_none());
    }

    fn tags_model() -> ModelSnapshot {
        ModelSnapshot::new("post").value("blog_id", json!(2)).table(
            "Tag",
            vec![
                record(json!({"id": 1, "name": "rust", "blog_id": 1})),
                record(json!({"id": 2, "name": "go", "blog_id": 2})),
                record(json!({"id": 3, "name": "ada", "blog_id": 2})),
            ],
        )
    }

    #[test]
    fn test_fetch_explicit_collection_wins() {
        let reflection = AssociationReflection::new("tags", MacroKind::HasMany, "Tag")
            .scope(AssociationScope::Class(Arc::new(|| Query::all().filter("id", json!(1)))));
        let explicit = json!([{"id": 9}]);
        let records = AssociationCollectionResolver::fetch(&reflection, Some(&explicit), &tags_model());
        assert_eq!(records, vec![json!({"id": 9})]);
    }

    #[test]
    fn test_fetch_class_scope() {
        let reflection = AssociationReflection::new("tags", MacroKind::HasMany, "Tag")
            .scope(AssociationScope::Class(Arc::new(|| Query::all().filter("id", json!(1)))))
            .order("name");
        let records = AssociationCollectionResolver::fetch(&reflection, None, &tags_model());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "rust");
    }

    #[test]
    fn test_fetch_instance_scope() {
        let reflection = AssociationReflection::new("tags", MacroKind::HasMany, "Tag").scope(
            AssociationScope::Instance(Arc::new(|object: &dyn BoundModel| {
                Query::all().filter("blog_id", object.value("blog_id").unwrap_or(Value::Null))
            })),
        );
        let records = AssociationCollectionResolver::fetch(&reflection, None, &tags_model());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_fetch_conditions_and_order() {
        let reflection = AssociationReflection::new("tags", MacroKind::HasMany, "Tag")
            .conditions(Conditions::Computed(Arc::new(|object: &dyn BoundModel| {
                vec![("blog_id".to_string(), object.value("blog_id").unwrap_or(Value::Null))]
            })))
            .order("name");
        let records = AssociationCollectionResolver::fetch(&reflection, None, &tags_model());
        let names: Vec<&Value> = records.iter().map(|r| &r["name"]).collect();
        assert_eq!(names, vec![&json!("ada"), &json!("go")]);

        let reflection = AssociationReflection::new("tags", MacroKind::HasMany, "Tag")
            .conditions(Conditions::Static(vec![("blog_id".into(), json!(1))]));
        assert_eq!(AssociationCollectionResolver::fetch(&reflection, None, &tags_model()).len(), 1);
    }

    #[test]
    fn test_fetch_all_records() {
        let reflection = AssociationReflection::new("tags", MacroKind::HasMany, "Tag");
        assert_eq!(AssociationCollectionResolver::fetch(&reflection, None, &tags_model()).len(), 3);
    }
}
