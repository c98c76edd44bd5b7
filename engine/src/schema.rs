//! Document shape definition and checking.
//!
//! Schemas describe which fields a JSON document must carry and of which
//! type. Checking never stops at the first problem: every failure is
//! collected with a JSON-pointer path so a client can fix a document in one
//! round trip.

use crate::error::{FieldError, FieldErrorKind};
use serde_json::Value;
use std::sync::OnceLock;

/// Field types supported in schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    /// Number that must be `>= 0`
    NonNegativeNumber,
    /// Nested object with its own schema
    Object(ObjectSchema),
    /// Array whose items all have the given type
    Array(Box<FieldType>),
}

impl FieldType {
    /// Only scalar optionals may be sent as `null`.
    fn is_nullable(&self) -> bool {
        matches!(self, FieldType::String)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::NonNegativeNumber => write!(f, "number"),
            FieldType::Object(schema) => write!(f, "{} object", schema.name),
            FieldType::Array(_) => write!(f, "array"),
        }
    }
}

/// Definition of a field in an object.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldDef {
    /// Create a new required field definition.
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
        }
    }

    /// Create a new optional field definition.
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }

    fn check(&self, value: Option<&Value>, path: &str, errors: &mut Vec<FieldError>) {
        match value {
            None | Some(Value::Null) if self.required => {
                errors.push(FieldError::new(path, FieldErrorKind::Schema, "is required"));
            }
            None => {}
            Some(Value::Null) if self.field_type.is_nullable() => {}
            Some(v) => check_type(&self.field_type, v, path, errors),
        }
    }
}

fn check_type(field_type: &FieldType, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    match (field_type, value) {
        (FieldType::String, Value::String(_)) => {}
        (FieldType::NonNegativeNumber, Value::Number(n)) => {
            if n.as_f64().is_some_and(|n| n < 0.0) {
                errors.push(FieldError::new(path, FieldErrorKind::Schema, "must be >= 0"));
            }
        }
        (FieldType::Object(schema), Value::Object(_)) => schema.check_at(value, path, errors),
        (FieldType::Array(item), Value::Array(items)) => {
            for (index, item_value) in items.iter().enumerate() {
                check_type(item, item_value, &format!("{path}/{index}"), errors);
            }
        }
        (expected, got) => errors.push(FieldError::new(
            path,
            FieldErrorKind::Schema,
            format!("expected {expected}, got {}", json_type_name(got)),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema for one kind of object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    /// Name used in error messages
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl ObjectSchema {
    /// Create a new object schema.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Check a document against this schema, returning every failure.
    ///
    /// Fields not named by the schema are allowed.
    pub fn check(&self, document: &Value) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.check_at(document, "", &mut errors);
        errors
    }

    fn check_at(&self, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
        let Some(obj) = value.as_object() else {
            let field = if path.is_empty() { "/" } else { path };
            errors.push(FieldError::new(
                field,
                FieldErrorKind::Schema,
                format!("expected {} object, got {}", self.name, json_type_name(value)),
            ));
            return;
        };

        for field in &self.fields {
            let field_path = format!("{path}/{}", field.name);
            field.check(obj.get(&field.name), &field_path, errors);
        }
    }
}

fn cost_share_schema() -> ObjectSchema {
    ObjectSchema::new(
        "costShare",
        vec![
            FieldDef::required("objectId", FieldType::String),
            FieldDef::required("_org", FieldType::String),
            FieldDef::optional("objectType", FieldType::String),
            FieldDef::required("deductible", FieldType::NonNegativeNumber),
            FieldDef::required("copay", FieldType::NonNegativeNumber),
        ],
    )
}

fn linked_service_schema() -> ObjectSchema {
    let identity = ObjectSchema::new(
        "linkedService",
        vec![
            FieldDef::required("objectId", FieldType::String),
            FieldDef::required("_org", FieldType::String),
            FieldDef::optional("objectType", FieldType::String),
            FieldDef::optional("name", FieldType::String),
        ],
    );

    ObjectSchema::new(
        "linkedServices item",
        vec![
            FieldDef::required("objectId", FieldType::String),
            FieldDef::required("_org", FieldType::String),
            FieldDef::optional("objectType", FieldType::String),
            FieldDef::required("linkedService", FieldType::Object(identity)),
            FieldDef::required("costShare", FieldType::Object(cost_share_schema())),
        ],
    )
}

/// The shape every plan document must have.
pub fn plan_schema() -> &'static ObjectSchema {
    static PLAN: OnceLock<ObjectSchema> = OnceLock::new();
    PLAN.get_or_init(|| {
        ObjectSchema::new(
            "plan",
            vec![
                FieldDef::required("objectId", FieldType::String),
                FieldDef::required("_org", FieldType::String),
                FieldDef::optional("objectType", FieldType::String),
                FieldDef::optional("name", FieldType::String),
                FieldDef::optional("type", FieldType::String),
                FieldDef::optional("creationDate", FieldType::String),
                FieldDef::required("costShare", FieldType::Object(cost_share_schema())),
                FieldDef::optional(
                    "linkedServices",
                    FieldType::Array(Box::new(FieldType::Object(linked_service_schema()))),
                ),
            ],
        )
    })
}
