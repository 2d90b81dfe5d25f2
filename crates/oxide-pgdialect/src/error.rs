//! Error types for the dialect.

/// Errors raised while generating SQL from a schema definition.
///
/// These are configuration errors: the schema or record handed in cannot be
/// expressed as valid SQL, so generation aborts instead of emitting a broken
/// statement.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// The table has no primary key field (neither flagged nor named `id`).
    #[error("Table '{table}' has no primary key")]
    MissingPrimaryKey {
        /// The table name.
        table: String,
    },

    /// More than one field is flagged as primary key.
    #[error("Table '{table}' has more than one primary key: {}", .fields.join(", "))]
    AmbiguousPrimaryKey {
        /// The table name.
        table: String,
        /// The fields flagged as primary key.
        fields: Vec<String>,
    },

    /// A field type has no storage mapping in this dialect.
    #[error("Field '{field}' of table '{table}' has no storage type mapping")]
    UnmappedType {
        /// The table name.
        table: String,
        /// The field name.
        field: String,
    },

    /// A foreign key is not of the form `<type>:<column>`.
    #[error("Invalid foreign key '{value}' on field '{field}', expected '<type>:<column>'")]
    InvalidForeignKey {
        /// The field carrying the foreign key.
        field: String,
        /// The raw foreign key value.
        value: String,
    },

    /// A referenced type could not be resolved.
    #[error("Field '{field}' references unknown type '{reference}'")]
    UnresolvedReference {
        /// The field carrying the reference.
        field: String,
        /// The unresolved type reference.
        reference: String,
    },

    /// A record value cannot be rendered as a literal for its field.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// The field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A connection URL could not be parsed.
    #[error("Invalid connection url: {0}")]
    InvalidUrl(String),

    /// A duration or interval could not be parsed.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
