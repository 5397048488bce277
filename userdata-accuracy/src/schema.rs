//! Payload schemas
//!
//! Each category model publishes a [`PayloadSchema`] describing the JSON
//! object it accepts. The same schema value is used by the classifier and by
//! inbound layers that validate submissions before they are stored.

use crate::error::SchemaViolation;
use serde::Serialize;
use serde_json::Value;

/// JSON type a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    String,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Number => write!(f, "number"),
            FieldKind::String => write!(f, "string"),
        }
    }
}

/// One field of a payload schema
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            minimum: None,
            maximum: None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            minimum: None,
            maximum: None,
        }
    }

    pub const fn bounded(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub const fn at_least(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    fn check(&self, value: &Value) -> Result<(), SchemaViolation> {
        let wrong_type = || SchemaViolation::WrongType {
            field: self.name,
            expected: self.kind,
        };

        match self.kind {
            FieldKind::String => {
                if !value.is_string() {
                    return Err(wrong_type());
                }
            }
            FieldKind::Number => {
                let number = value.as_f64().ok_or_else(wrong_type)?;
                let below = self.minimum.is_some_and(|min| number < min);
                let above = self.maximum.is_some_and(|max| number > max);
                if below || above {
                    return Err(SchemaViolation::OutOfRange {
                        field: self.name,
                        value: number,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Shape of a category payload: a JSON object with a known set of fields
///
/// `null` is accepted for optional fields and treated as absent. Keys the
/// schema does not list are ignored, so extra client fields (sensor
/// metadata and the like) never block scoring of a comparison group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadSchema {
    pub fields: &'static [FieldSpec],
}

impl PayloadSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Check `payload` against the schema, reporting the first violation
    pub fn validate(&self, payload: &Value) -> Result<(), SchemaViolation> {
        let object = payload.as_object().ok_or(SchemaViolation::NotAnObject)?;

        for spec in self.fields {
            match object.get(spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(SchemaViolation::MissingField(spec.name));
                }
                None | Some(Value::Null) => {}
                Some(value) => spec.check(value)?,
            }
        }

        Ok(())
    }
}
