//! CREATE statements for a schema.

use super::types::column_type;
use crate::error::{DialectError, Result};
use crate::schema::{Field, SchemaDefinition, SchemaResolver, SemanticType, storage_name};

/// Returns the sequence feeding a generated column.
#[must_use]
pub fn sequence_name(table: &str, field: &Field) -> String {
    format!("seq_{table}_{}", field.column_name())
}

/// Returns the index created for an indexed column.
#[must_use]
pub fn index_name(table: &str, field: &Field) -> String {
    format!("idx_{table}_{}", field.column_name())
}

/// Generates the sequences, table and indexes of `schema`.
///
/// `compact` puts the table on a single line; it never changes the
/// statements themselves. A schema without a key of its own gets the key of
/// its super type.
pub fn create_sql(
    schema: &SchemaDefinition,
    resolver: &dyn SchemaResolver,
    compact: bool,
) -> Result<String> {
    let schema = schema.inherit_key(resolver)?;
    let schema = schema.as_ref();
    let table = schema.table_name();
    let primary_key = schema.primary_key()?;

    let mut sql = String::new();
    for field in schema.fields_in_table().filter(|f| f.generated) {
        sql.push_str(&format!("create sequence {};\n", sequence_name(&table, field)));
    }

    let columns = schema
        .fields_in_table()
        .map(|field| column_definition(schema, &table, field, primary_key, resolver))
        .collect::<Result<Vec<_>>>()?;
    if compact {
        sql.push_str(&format!("create table {table} ({});\n", columns.join(", ")));
    } else {
        sql.push_str(&format!(
            "create table {table} (\n\t{}\n);\n",
            columns.join(",\n\t")
        ));
    }

    for field in schema.fields_in_table().filter(|f| f.indexed) {
        sql.push_str(&format!(
            "create index {} on {table}({});\n",
            index_name(&table, field),
            field.column_name()
        ));
    }

    tracing::debug!(table = %table, columns = columns.len(), "Generated create statements");
    Ok(sql)
}

/// Generates the clause of one column.
fn column_definition(
    schema: &SchemaDefinition,
    table: &str,
    field: &Field,
    primary_key: &Field,
    resolver: &dyn SchemaResolver,
) -> Result<String> {
    let column = field.column_name();
    let mut sql = if field.semantic_type == SemanticType::Record {
        format!("{column}_id uuid")
    } else {
        let data_type = column_type(field).ok_or_else(|| DialectError::UnmappedType {
            table: table.to_string(),
            field: field.name.clone(),
        })?;
        format!("{column} {data_type}")
    };
    if field.list {
        sql.push_str("[]");
    }

    let is_primary_key = field.name == primary_key.name;
    if is_primary_key {
        sql.push_str(" primary key");
    } else {
        let mandatory = field.is_mandatory() || field.generated;
        if mandatory {
            sql.push_str(" not null");
        }
        match field.default_literal() {
            // The sequence provides the default of generated columns.
            Some(_) if field.generated => {}
            Some(default) => {
                sql.push_str(" default ");
                sql.push_str(default);
            }
            // Mandatory booleans can be added to existing tables later on.
            None if mandatory && field.semantic_type == SemanticType::Boolean && !field.list => {
                sql.push_str(" default false");
            }
            None => {}
        }
    }

    if let Some(target) = field.foreign_key_target()? {
        let referenced =
            resolver
                .resolve(&target.type_ref)
                .ok_or_else(|| DialectError::UnresolvedReference {
                    field: field.name.clone(),
                    reference: target.type_ref.clone(),
                })?;
        sql.push_str(&format!(
            " references {}({})",
            referenced.table_name(),
            storage_name(&target.column)
        ));
    } else if is_primary_key {
        if let Some(ref super_ref) = schema.super_type {
            let super_type =
                resolver
                    .resolve(super_ref)
                    .ok_or_else(|| DialectError::UnresolvedReference {
                        field: field.name.clone(),
                        reference: super_ref.clone(),
                    })?;
            // Inheritance by reference: the child row shares its parent's key.
            let shares_key = super_type
                .inherit_key(resolver)?
                .primary_key()
                .is_ok_and(|super_key| super_key.name == field.name);
            if shares_key {
                sql.push_str(&format!(" references {}({column})", super_type.table_name()));
            }
        }
    }

    if field.unique {
        sql.push_str(" unique");
    }

    if field.generated {
        sql.push_str(&format!(" default nextval('{}')", sequence_name(table, field)));
    }

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn person() -> SchemaDefinition {
        SchemaDefinition::new("person")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("firstName", SemanticType::String))
            .field(Field::new("nickName", SemanticType::String).optional())
            .field(Field::new("active", SemanticType::Boolean))
    }

    #[test]
    fn test_create_table_layout() {
        let sql = create_sql(&person(), &SchemaRegistry::new(), false).unwrap();
        assert_eq!(
            sql,
            "create table person (\n\
             \tid uuid primary key,\n\
             \tfirst_name text not null,\n\
             \tnick_name text,\n\
             \tactive boolean not null default false\n\
             );\n"
        );
    }

    #[test]
    fn test_create_table_compact() {
        let sql = create_sql(&person(), &SchemaRegistry::new(), true).unwrap();
        assert_eq!(
            sql,
            "create table person (id uuid primary key, first_name text not null, \
             nick_name text, active boolean not null default false);\n"
        );
    }

    #[test]
    fn test_optional_boolean_has_no_default() {
        let schema = SchemaDefinition::new("flag")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("enabled", SemanticType::Boolean).optional());
        let sql = create_sql(&schema, &SchemaRegistry::new(), true).unwrap();
        assert!(sql.contains("enabled boolean,") || sql.contains("enabled boolean)"));
        assert!(!sql.contains("default false"));
    }

    #[test]
    fn test_explicit_default_wins() {
        let schema = SchemaDefinition::new("flag")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("enabled", SemanticType::Boolean).default_value("true"));
        let sql = create_sql(&schema, &SchemaRegistry::new(), true).unwrap();
        assert!(sql.contains("enabled boolean not null default true"));
        assert!(!sql.contains("default false"));
    }

    #[test]
    fn test_generated_column() {
        let schema = SchemaDefinition::new("invoiceLine")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("lineNumber", SemanticType::Long).generated().optional());
        let sql = create_sql(&schema, &SchemaRegistry::new(), false).unwrap();
        assert!(sql.starts_with("create sequence seq_invoice_line_line_number;\n"));
        assert!(sql.contains(
            "line_number bigint not null default nextval('seq_invoice_line_line_number')"
        ));
    }

    #[test]
    fn test_indexes_and_unique() {
        let schema = SchemaDefinition::new("account")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("email", SemanticType::String).unique().indexed());
        let sql = create_sql(&schema, &SchemaRegistry::new(), true).unwrap();
        assert!(sql.contains("email text not null unique"));
        assert!(sql.ends_with("create index idx_account_email on account(email);\n"));
    }

    #[test]
    fn test_list_and_record_columns() {
        let schema = SchemaDefinition::new("post")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("tags", SemanticType::String).list().optional())
            .field(Field::new("author", SemanticType::Record).optional());
        let sql = create_sql(&schema, &SchemaRegistry::new(), true).unwrap();
        assert!(sql.contains("tags text[],"));
        assert!(sql.contains("author_id uuid)"));
    }

    #[test]
    fn test_date_columns_narrowed() {
        let schema = SchemaDefinition::new("event")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("day", SemanticType::DateTime).format("date"))
            .field(Field::new("at", SemanticType::DateTime).format("HH:mm:ss"))
            .field(Field::new("created", SemanticType::DateTime));
        let sql = create_sql(&schema, &SchemaRegistry::new(), true).unwrap();
        assert!(sql.contains("day date not null"));
        assert!(sql.contains("at time not null"));
        assert!(sql.contains("created timestamp not null"));
    }

    #[test]
    fn test_foreign_key_resolved() {
        let registry = SchemaRegistry::new()
            .with(SchemaDefinition::new("crm.Company").collection("companies"));
        let schema = SchemaDefinition::new("employee")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("companyId", SemanticType::Uuid).references("crm.Company:id"));
        let sql = create_sql(&schema, &registry, true).unwrap();
        assert!(sql.contains("company_id uuid not null references companies(id)"));
    }

    #[test]
    fn test_foreign_key_errors() {
        let schema = SchemaDefinition::new("employee")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("companyId", SemanticType::Uuid).references("crm.Company:id"));
        assert!(matches!(
            create_sql(&schema, &SchemaRegistry::new(), true),
            Err(DialectError::UnresolvedReference { .. })
        ));

        let schema = SchemaDefinition::new("employee")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("companyId", SemanticType::Uuid).references("crm.Company"));
        assert!(matches!(
            create_sql(&schema, &SchemaRegistry::new(), true),
            Err(DialectError::InvalidForeignKey { .. })
        ));
    }

    #[test]
    fn test_super_type_reference() {
        let registry = SchemaRegistry::new().with(
            SchemaDefinition::new("node").field(Field::new("id", SemanticType::Uuid).primary_key()),
        );
        let schema = SchemaDefinition::new("document")
            .extends("node")
            .field(Field::new("id", SemanticType::Uuid).primary_key())
            .field(Field::new("title", SemanticType::String));
        let sql = create_sql(&schema, &registry, true).unwrap();
        assert!(sql.contains("id uuid primary key references node(id)"));
    }

    #[test]
    fn test_super_type_key_mirrored() {
        let registry = SchemaRegistry::new().with(
            SchemaDefinition::new("node").field(Field::new("id", SemanticType::Uuid).primary_key()),
        );
        let schema = SchemaDefinition::new("document")
            .extends("node")
            .field(Field::new("title", SemanticType::String));
        let sql = create_sql(&schema, &registry, true).unwrap();
        assert_eq!(
            sql,
            "create table document (id uuid primary key references node(id), \
             title text not null);\n"
        );
    }

    #[test]
    fn test_super_type_key_mirrored_through_levels() {
        let registry = SchemaRegistry::new()
            .with(SchemaDefinition::new("node").field(Field::new("id", SemanticType::Uuid)))
            .with(SchemaDefinition::new("document").extends("node"));
        let schema = SchemaDefinition::new("page")
            .extends("document")
            .field(Field::new("slug", SemanticType::String));
        let sql = create_sql(&schema, &registry, true).unwrap();
        assert!(sql.contains("id uuid primary key references document(id), slug"));
    }

    #[test]
    fn test_super_type_with_other_key_is_not_referenced() {
        let registry = SchemaRegistry::new().with(
            SchemaDefinition::new("node")
                .field(Field::new("code", SemanticType::String).primary_key()),
        );
        let schema = SchemaDefinition::new("document")
            .extends("node")
            .field(Field::new("id", SemanticType::Uuid).primary_key());
        let sql = create_sql(&schema, &registry, true).unwrap();
        assert!(!sql.contains("references"));
    }

    #[test]
    fn test_unmapped_type_aborts() {
        let schema = SchemaDefinition::new("blob")
            .field(Field::new("id", SemanticType::Uuid))
            .field(Field::new("payload", SemanticType::Opaque));
        match create_sql(&schema, &SchemaRegistry::new(), false) {
            Err(DialectError::UnmappedType { table, field }) => {
                assert_eq!(table, "blob");
                assert_eq!(field, "payload");
            }
            other => panic!("Expected unmapped type error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_primary_key_aborts() {
        let schema = SchemaDefinition::new("loose").field(Field::new("name", SemanticType::String));
        assert!(matches!(
            create_sql(&schema, &SchemaRegistry::new(), false),
            Err(DialectError::MissingPrimaryKey { .. })
        ));
    }
}
