//! Storage types of the PostgreSQL dialect.

use crate::schema::{Field, SemanticType};

/// Maps a semantic type to its PostgreSQL storage type.
///
/// Date/time values map to `timestamp`; narrowing by granularity is left to
/// the callers. Nested records and opaque values have no storage type.
#[must_use]
pub const fn storage_type(semantic_type: SemanticType) -> Option<&'static str> {
    match semantic_type {
        // Length limits belong to the application, not the column.
        SemanticType::String
        | SemanticType::CharSequence
        | SemanticType::Uri
        | SemanticType::Enumeration => Some("text"),
        SemanticType::Duration => Some("interval"),
        SemanticType::Bytes => Some("bytea"),
        SemanticType::Integer => Some("integer"),
        SemanticType::Long | SemanticType::BigInteger => Some("bigint"),
        SemanticType::Float | SemanticType::Double | SemanticType::Decimal => Some("decimal"),
        SemanticType::Short => Some("smallint"),
        SemanticType::Boolean => Some("boolean"),
        SemanticType::Uuid => Some("uuid"),
        SemanticType::DateTime => Some("timestamp"),
        SemanticType::Record | SemanticType::Opaque => None,
    }
}

/// Returns the type name the driver needs to bind an explicit NULL.
///
/// A bare NULL cannot tell a scalar column from an array column, so list
/// fields get the driver's `_array` variant (`uuid_array`, `integer_array`).
#[must_use]
pub fn null_type_name(field: &Field) -> Option<String> {
    storage_type(field.semantic_type).map(|name| {
        if field.list {
            format!("{name}_array")
        } else {
            name.to_string()
        }
    })
}

/// Returns the column type of a field, date/time narrowed by granularity.
pub(super) fn column_type(field: &Field) -> Option<&'static str> {
    match field.semantic_type {
        SemanticType::DateTime => Some(field.granularity().sql_type()),
        other => storage_type(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_types() {
        assert_eq!(storage_type(SemanticType::String), Some("text"));
        assert_eq!(storage_type(SemanticType::Uri), Some("text"));
        assert_eq!(storage_type(SemanticType::Enumeration), Some("text"));
        assert_eq!(storage_type(SemanticType::Duration), Some("interval"));
        assert_eq!(storage_type(SemanticType::Bytes), Some("bytea"));
        assert_eq!(storage_type(SemanticType::Integer), Some("integer"));
        assert_eq!(storage_type(SemanticType::Long), Some("bigint"));
        assert_eq!(storage_type(SemanticType::BigInteger), Some("bigint"));
        assert_eq!(storage_type(SemanticType::Float), Some("decimal"));
        assert_eq!(storage_type(SemanticType::Decimal), Some("decimal"));
        assert_eq!(storage_type(SemanticType::Short), Some("smallint"));
        assert_eq!(storage_type(SemanticType::Boolean), Some("boolean"));
        assert_eq!(storage_type(SemanticType::Uuid), Some("uuid"));
        assert_eq!(storage_type(SemanticType::DateTime), Some("timestamp"));
        assert_eq!(storage_type(SemanticType::Record), None);
        assert_eq!(storage_type(SemanticType::Opaque), None);
    }

    #[test]
    fn test_null_type_name() {
        let field = Field::new("ids", SemanticType::Integer).list();
        assert_eq!(null_type_name(&field).as_deref(), Some("integer_array"));
        let field = Field::new("id", SemanticType::Uuid);
        assert_eq!(null_type_name(&field).as_deref(), Some("uuid"));
        let field = Field::new("child", SemanticType::Record);
        assert_eq!(null_type_name(&field), None);
    }

    #[test]
    fn test_column_type_narrows_dates() {
        let field = Field::new("born", SemanticType::DateTime).format("yyyy-MM-dd");
        assert_eq!(column_type(&field), Some("date"));
        let field = Field::new("opens", SemanticType::DateTime).format("time");
        assert_eq!(column_type(&field), Some("time"));
        let field = Field::new("seen", SemanticType::DateTime);
        assert_eq!(column_type(&field), Some("timestamp"));
    }
}
