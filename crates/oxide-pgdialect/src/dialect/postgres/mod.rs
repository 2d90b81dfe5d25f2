//! PostgreSQL dialect.

mod ddl;
mod dml;
mod rewrite;
mod types;

pub use ddl::{index_name, sequence_name};
pub use dml::insert_sql_at;
pub use rewrite::{LIST_CAST_EXCEPTIONS, ParameterScanner, ParameterToken};
pub use types::{null_type_name, storage_type};

use crate::config::DEFAULT_PORT;
use crate::error::Result;
use crate::schema::{Field, SchemaDefinition, SchemaResolver};
use crate::value::Record;

use super::SqlDialect;

/// PostgreSQL dialect for SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    fn rewrite(&self, sql: &str, input: &SchemaDefinition) -> String {
        rewrite::rewrite(sql, input)
    }

    fn create_sql(
        &self,
        schema: &SchemaDefinition,
        resolver: &dyn SchemaResolver,
        compact: bool,
    ) -> Result<String> {
        ddl::create_sql(schema, resolver, compact)
    }

    fn insert_sql(
        &self,
        schema: &SchemaDefinition,
        record: &Record,
        compact: bool,
    ) -> Result<String> {
        dml::insert_sql(schema, record, compact)
    }

    fn null_type_name(&self, field: &Field) -> Option<String> {
        types::null_type_name(field)
    }

    fn supports_numeric_group_by(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SemanticType;

    #[test]
    fn test_dialect_properties() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.name(), "postgresql");
        assert_eq!(dialect.default_port(), 5432);
        assert!(dialect.supports_numeric_group_by());
    }

    #[test]
    fn test_null_type_name_through_dialect() {
        let dialect = PostgresDialect::new();
        let field = Field::new("ids", SemanticType::Uuid).list();
        assert_eq!(dialect.null_type_name(&field).as_deref(), Some("uuid_array"));
    }

    #[test]
    fn test_usable_as_trait_object() {
        let dialect: Box<dyn SqlDialect> = Box::new(PostgresDialect::new());
        let schema = SchemaDefinition::new("input").field(Field::new("id", SemanticType::Uuid));
        assert_eq!(dialect.rewrite("id = :id", &schema), "id = :id::uuid");
    }
}
