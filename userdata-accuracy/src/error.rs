//! Classification error types

use crate::schema::FieldKind;
use thiserror::Error;
use userdata_common::Category;
use uuid::Uuid;

/// Why a payload does not satisfy its category schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: FieldKind,
    },

    #[error("field '{field}' value {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },

    /// Passed the field checks but still failed to deserialize
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A record in the comparison group failed its category schema
///
/// Aborts the whole classification call: one malformed historical record
/// blocks scoring of the new one too.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record {record_id} failed {category} schema: {violation}")]
pub struct ValidationError {
    pub record_id: Uuid,
    pub category: Category,
    #[source]
    pub violation: SchemaViolation,
}
