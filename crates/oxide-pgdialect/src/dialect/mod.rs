//! Dialect-specific SQL generation.
//!
//! The execution layer talks to a database through a [`SqlDialect`]: it asks
//! the dialect to rewrite query templates before execution, to generate the
//! DDL and DML for a schema, and to classify the errors the database returns.

mod postgres;

pub use postgres::{
    LIST_CAST_EXCEPTIONS, ParameterScanner, ParameterToken, PostgresDialect, index_name,
    insert_sql_at, null_type_name, sequence_name, storage_type,
};

use std::error::Error;

use crate::classify::{self, ErrorClassification};
use crate::error::Result;
use crate::schema::{Field, SchemaDefinition, SchemaResolver};
use crate::value::Record;

/// Trait for dialect-specific SQL generation.
pub trait SqlDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the default server port.
    fn default_port(&self) -> u16;

    /// Rewrites a query template so its named parameters bind correctly.
    ///
    /// Unknown parameters are left untouched; rewriting never fails.
    fn rewrite(&self, sql: &str, input: &SchemaDefinition) -> String;

    /// Generates the statements creating the table of `schema`.
    fn create_sql(
        &self,
        schema: &SchemaDefinition,
        resolver: &dyn SchemaResolver,
        compact: bool,
    ) -> Result<String>;

    /// Generates an INSERT statement for `record`.
    fn insert_sql(
        &self,
        schema: &SchemaDefinition,
        record: &Record,
        compact: bool,
    ) -> Result<String>;

    /// Returns the type name used when binding an explicit NULL to `field`.
    fn null_type_name(&self, field: &Field) -> Option<String>;

    /// Appends OFFSET and LIMIT clauses, each only when given.
    fn limit(&self, sql: &str, offset: Option<u64>, limit: Option<u32>) -> String {
        let mut sql = sql.to_string();
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }

    /// Wraps a query so it counts the rows it would return.
    fn total_count_query(&self, query: &str) -> String {
        let query = query.trim().trim_end_matches(';').trim_end();
        format!("select count(*) as total from ({query}) total_count_query")
    }

    /// Classifies an error returned by statement execution.
    fn classify_error(&self, error: &(dyn Error + 'static)) -> ErrorClassification {
        classify::classify(error)
    }

    /// Returns whether GROUP BY accepts column positions.
    fn supports_numeric_group_by(&self) -> bool {
        false
    }
}
