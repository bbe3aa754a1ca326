//! Serde representation of the schema description.
//!
//! Only the parts of the data model document the rewrite engine reads are
//! modelled here. Unknown keys are ignored so that newer documents with extra
//! metadata still load.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::SchemaError;

/// Ordered list of models in a schema.
///
/// Deserializes from either the full data model document
/// (`{"datamodel": {"models": [...]}}`) or the bare datamodel
/// (`{"models": [...]}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "SchemaEnvelope")]
pub struct SchemaDescription {
    pub models: Vec<Model>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaEnvelope {
    Document { datamodel: Datamodel },
    Datamodel(Datamodel),
}

#[derive(Deserialize)]
struct Datamodel {
    #[serde(default)]
    models: Vec<Model>,
}

impl From<SchemaEnvelope> for SchemaDescription {
    fn from(envelope: SchemaEnvelope) -> Self {
        let (SchemaEnvelope::Document { datamodel } | SchemaEnvelope::Datamodel(datamodel)) =
            envelope;
        SchemaDescription {
            models: datamodel.models,
        }
    }
}

impl SchemaDescription {
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }

    /// Parse a schema description from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a schema description file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Look up a model by name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.name == name)
    }
}

/// A model and its ordered fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    /// Composite primary key, if the model declares one instead of an `@id` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_primary_key(mut self, fields: &[&str]) -> Self {
        self.primary_key = Some(PrimaryKey {
            name: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A multi-field primary key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrimaryKey {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<String>,
}

/// Field kind as reported by the data model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Scalar,
    /// A relation to another model.
    Object,
    Enum,
    Unsupported,
}

/// A single field of a model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Scalar type name (`String`, `Int`, ...) or the referenced model for relations.
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub is_id: bool,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub relation_name: Option<String>,
    /// Local scalar columns backing the relation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub relation_from_fields: Vec<String>,
    /// Fields of the referenced model the columns point at, paired positionally.
    #[serde(default, deserialize_with = "null_as_default")]
    pub relation_to_fields: Vec<String>,
}

impl Field {
    /// A required scalar field.
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar,
            type_name: Some(type_name.into()),
            is_required: true,
            ..Default::default()
        }
    }

    /// A relation field backed by `from` columns pointing at `to` fields of `target`.
    pub fn relation(
        name: impl Into<String>,
        target: impl Into<String>,
        from: &[&str],
        to: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object,
            type_name: Some(target.into()),
            is_required: true,
            relation_from_fields: from.iter().map(|f| f.to_string()).collect(),
            relation_to_fields: to.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn identifier(mut self) -> Self {
        self.is_id = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    pub fn is_relation(&self) -> bool {
        self.kind == FieldKind::Object
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "datamodel": {
                "models": [
                    {
                        "name": "User",
                        "dbName": null,
                        "fields": [
                            { "name": "id", "kind": "scalar", "type": "String", "isId": true, "isRequired": true },
                            { "name": "posts", "kind": "object", "type": "Post", "isList": true,
                              "relationName": "PostToUser", "relationFromFields": [], "relationToFields": [] }
                        ],
                        "primaryKey": null
                    }
                ],
                "enums": []
            }
        }"#;

        let schema = SchemaDescription::from_json(json).unwrap();
        assert_eq!(schema.models.len(), 1);
        let user = schema.model("User").unwrap();
        assert!(user.field("id").unwrap().is_id);
        assert!(user.field("posts").unwrap().is_relation());
        assert!(user.primary_key.is_none());
    }

    #[test]
    fn test_parse_bare_datamodel() {
        let json = r#"{ "models": [ { "name": "Tag", "fields": [] } ] }"#;
        let schema = SchemaDescription::from_json(json).unwrap();
        assert_eq!(schema.models[0].name, "Tag");
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let json = r#"{ "models": [ { "name": "Post", "fields": [
            { "name": "title", "kind": "scalar", "type": "String", "relationFromFields": null }
        ] } ] }"#;
        let schema = SchemaDescription::from_json(json).unwrap();
        assert!(schema.models[0].fields[0].relation_from_fields.is_empty());
    }

    #[test]
    fn test_composite_primary_key() {
        let json = r#"{ "models": [ { "name": "Membership",
            "fields": [
                { "name": "userId", "kind": "scalar", "type": "String" },
                { "name": "groupId", "kind": "scalar", "type": "String" }
            ],
            "primaryKey": { "name": null, "fields": ["userId", "groupId"] } } ] }"#;
        let schema = SchemaDescription::from_json(json).unwrap();
        let pk = schema.models[0].primary_key.as_ref().unwrap();
        assert_eq!(pk.fields, vec!["userId", "groupId"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = SchemaDescription::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = SchemaDescription::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
