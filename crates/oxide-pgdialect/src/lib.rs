//! # oxide-pgdialect
//!
//! PostgreSQL dialect rules for a schema-driven data layer.
//!
//! This crate provides:
//! - Named parameter rewriting with the casts PostgreSQL needs to bind UUIDs,
//!   dates, intervals, booleans and NULL arrays
//! - DDL generation (sequences, tables, foreign keys, indexes) from schema
//!   definitions
//! - DML generation with defaults synthesized for mandatory fields
//! - Pagination and row counting wrappers
//! - Classification of database errors such as unique violations
//! - Connection parameters convertible to `sqlx` connect options
//!
//! ## Generating DDL
//!
//! ```rust
//! use oxide_pgdialect::prelude::*;
//!
//! let person = SchemaDefinition::new("person")
//!     .field(Field::new("id", SemanticType::Uuid))
//!     .field(Field::new("lastName", SemanticType::String));
//!
//! let sql = PostgresDialect::new()
//!     .create_sql(&person, &SchemaRegistry::new(), true)
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "create table person (id uuid primary key, last_name text not null);\n"
//! );
//! ```
//!
//! ## Rewriting parameters
//!
//! ```rust
//! use oxide_pgdialect::prelude::*;
//!
//! let input = SchemaDefinition::new("input")
//!     .field(Field::new("ids", SemanticType::Uuid).list());
//!
//! let sql = PostgresDialect::new().rewrite("select * from t where id in (:ids)", &input);
//! assert_eq!(sql, "select * from t where id = any(:ids::uuid[])");
//! ```

pub mod classify;
pub mod config;
pub mod dialect;
pub mod error;
pub mod interval;
pub mod schema;
pub mod value;

pub use error::{DialectError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::classify::{ErrorClassification, ErrorKind};
    pub use crate::config::ConnectionParameters;
    pub use crate::dialect::{PostgresDialect, SqlDialect};
    pub use crate::error::{DialectError, Result};
    pub use crate::interval::Interval;
    pub use crate::schema::{
        Field, Granularity, SchemaDefinition, SchemaRegistry, SchemaResolver, SemanticType,
    };
    pub use crate::value::{Record, ToValue, Value};
}
