//! Model registry: per-run lookup tables derived from the schema description.
//!
//! The registry is built in a single pass over all models before any rewrite
//! begins, because retyping a foreign key of model A needs the nominal type of
//! model B regardless of declaration order.

use indexmap::IndexMap;
use tracing::debug;

use crate::{Field, FieldKind, Model, SchemaDescription};

/// The field name a model's identifier must carry.
pub const IDENTIFIER_FIELD: &str = "id";

/// The scalar type an identifier must have to be branded.
const STRING_SCALAR: &str = "String";

/// The generated nominal identifier type of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NominalType {
    /// Type name, e.g. `UserId`.
    pub name: String,
    /// String literal keying the phantom brand, e.g. `__UserId`.
    pub brand_key: String,
}

impl NominalType {
    pub fn for_model(model: &str) -> Self {
        let name = nominal_type_name(model);
        let brand_key = format!("__{name}");
        Self { name, brand_key }
    }
}

/// Name of the nominal identifier type generated for `model`.
pub fn nominal_type_name(model: &str) -> String {
    format!("{model}Id")
}

/// Conventional foreign-key column name for references to `model` (`User` -> `userId`).
pub fn conventional_column_name(model: &str) -> String {
    let mut chars = model.chars();
    match chars.next() {
        Some(first) => format!("{}{}Id", first.to_lowercase(), chars.as_str()),
        None => String::from("id"),
    }
}

/// How a field takes part in identifier rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// The model's own single-field identifier.
    Identifier,
    /// A scalar column referencing the identifier of `target`.
    ForeignKey { target: String },
    Other,
}

/// A scalar column that stores the identifier of another model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// The local scalar column, e.g. `authorId`.
    pub column: String,
    /// The referenced model, e.g. `User`.
    pub target: String,
    /// The relation field the column backs, e.g. `author`.
    pub relation: String,
}

/// Everything the registry knows about one model.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredModel {
    pub name: String,
    identifier: Option<Field>,
    nominal: Option<NominalType>,
    foreign_keys: Vec<ForeignKey>,
}

impl RegisteredModel {
    pub fn identifier(&self) -> Option<&Field> {
        self.identifier.as_ref()
    }

    pub fn nominal(&self) -> Option<&NominalType> {
        self.nominal.as_ref()
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }
}

/// Lookup tables for one run of the rewrite engine.
///
/// Models keep schema order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, RegisteredModel>,
}

impl ModelRegistry {
    pub fn build(schema: &SchemaDescription) -> Self {
        // Identifiers first: foreign keys may point forward in schema order.
        let mut models: IndexMap<String, RegisteredModel> = schema
            .models
            .iter()
            .map(|model| {
                let identifier = qualifying_identifier(model).cloned();
                let nominal = identifier
                    .as_ref()
                    .map(|_| NominalType::for_model(&model.name));
                if nominal.is_none() {
                    debug!(model = %model.name, "no single string identifier, skipping");
                }
                let entry = RegisteredModel {
                    name: model.name.clone(),
                    identifier,
                    nominal,
                    foreign_keys: Vec::new(),
                };
                (model.name.clone(), entry)
            })
            .collect();

        for model in &schema.models {
            let foreign_keys = collect_foreign_keys(model, &models);
            if let Some(entry) = models.get_mut(&model.name) {
                entry.foreign_keys = foreign_keys;
            }
        }

        Self { models }
    }

    /// All models in schema order.
    pub fn models(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.values()
    }

    /// Models that receive a nominal identifier type, in schema order.
    pub fn branded_models(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.values().filter(|model| model.nominal.is_some())
    }

    pub fn get(&self, model: &str) -> Option<&RegisteredModel> {
        self.models.get(model)
    }

    /// The model's qualifying identifier field, if any.
    pub fn resolve_identifier_field(&self, model: &str) -> Option<&Field> {
        self.get(model)?.identifier()
    }

    pub fn nominal_type(&self, model: &str) -> Option<&NominalType> {
        self.get(model)?.nominal()
    }

    pub fn nominal_type_name(&self, model: &str) -> Option<&str> {
        self.nominal_type(model).map(|nominal| nominal.name.as_str())
    }

    pub fn brand_key(&self, model: &str) -> Option<&str> {
        self.nominal_type(model)
            .map(|nominal| nominal.brand_key.as_str())
    }

    /// `(column, referenced model)` pairs for every foreign key of `model`
    /// whose target has a nominal type.
    pub fn foreign_key_targets(&self, model: &str) -> Vec<(&str, &str)> {
        self.get(model)
            .map(|entry| {
                entry
                    .foreign_keys
                    .iter()
                    .map(|fk| (fk.column.as_str(), fk.target.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn field_role(&self, model: &str, field: &str) -> FieldRole {
        let Some(entry) = self.get(model) else {
            return FieldRole::Other;
        };
        if entry
            .identifier
            .as_ref()
            .is_some_and(|identifier| identifier.name == field)
        {
            return FieldRole::Identifier;
        }
        match entry.foreign_keys.iter().find(|fk| fk.column == field) {
            Some(fk) => FieldRole::ForeignKey {
                target: fk.target.clone(),
            },
            None => FieldRole::Other,
        }
    }

    /// Models declaring `column` as a foreign key to `target`, in schema order.
    pub fn models_referencing<'a>(
        &'a self,
        target: &'a str,
        column: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.models.values().filter_map(move |model| {
            model
                .foreign_keys
                .iter()
                .any(|fk| fk.target == target && fk.column == column)
                .then_some(model.name.as_str())
        })
    }

    /// The model a generated declaration name belongs to.
    ///
    /// The owner is the longest model name that prefixes `declaration` (a
    /// leading `$` is ignored) and is followed by an uppercase letter or the
    /// end of the name. `UserProfileWhereInput` belongs to `UserProfile` when
    /// both `User` and `UserProfile` exist; `UsersOnGroups` never belongs to
    /// `User`.
    pub fn owner_of(&self, declaration: &str) -> Option<&str> {
        let name = declaration.strip_prefix('$').unwrap_or(declaration);
        self.models
            .keys()
            .filter(|model| {
                name.strip_prefix(model.as_str()).is_some_and(|rest| {
                    rest.chars().next().is_none_or(|c| c.is_ascii_uppercase())
                })
            })
            .max_by_key(|model| model.len())
            .map(String::as_str)
    }
}

/// The single field named `id`, flagged as identifier, of string scalar type.
fn qualifying_identifier(model: &Model) -> Option<&Field> {
    model.fields.iter().find(|field| {
        field.name == IDENTIFIER_FIELD
            && field.is_id
            && field.kind == FieldKind::Scalar
            && field
                .type_name
                .as_deref()
                .is_none_or(|ty| ty == STRING_SCALAR)
    })
}

/// Foreign-key columns of `model` that point at a branded identifier.
fn collect_foreign_keys(
    model: &Model,
    models: &IndexMap<String, RegisteredModel>,
) -> Vec<ForeignKey> {
    // A primary key shared with the referenced model keeps the model's own type.
    let own_identifier = models
        .get(&model.name)
        .and_then(|entry| entry.nominal.as_ref().and(entry.identifier.as_ref()))
        .map(|field| field.name.as_str());
    let mut foreign_keys: Vec<ForeignKey> = Vec::new();
    for relation in model.fields.iter().filter(|field| field.is_relation()) {
        let Some(target) = relation.type_name.as_deref() else {
            continue;
        };
        let Some(target_identifier) = models
            .get(target)
            .and_then(|entry| entry.nominal.as_ref().and(entry.identifier.as_ref()))
        else {
            continue;
        };
        for (index, column) in relation.relation_from_fields.iter().enumerate() {
            let references_identifier = match relation.relation_to_fields.get(index) {
                Some(to) => *to == target_identifier.name,
                // No explicit reference list: the relation points at the identifier.
                None => relation.relation_to_fields.is_empty(),
            };
            if !references_identifier {
                debug!(
                    model = %model.name,
                    column = %column,
                    "column does not reference an identifier, skipping"
                );
                continue;
            }
            if own_identifier == Some(column.as_str()) {
                debug!(
                    model = %model.name,
                    column = %column,
                    "column is the model's own identifier, skipping"
                );
                continue;
            }
            if foreign_keys.iter().any(|fk| fk.column == *column) {
                continue;
            }
            foreign_keys.push(ForeignKey {
                column: column.clone(),
                target: target.to_string(),
                relation: relation.name.clone(),
            });
        }
    }
    foreign_keys
}
