#![allow(dead_code)]

use oxide_pgdialect::prelude::*;

/// Schemas of a small CRM, as stored in a schemas file.
pub const CRM_SCHEMAS: &str = r#"[
    {
        "name": "crm.Company",
        "collection_name": "companies",
        "fields": [
            {"name": "id", "type": "uuid"},
            {"name": "legalName", "type": "string", "unique": true}
        ]
    },
    {
        "name": "crm.Contact",
        "fields": [
            {"name": "id", "type": "uuid"},
            {"name": "fullName", "type": "string"},
            {"name": "email", "type": "string", "unique": true, "indexed": true},
            {"name": "companyId", "type": "uuid", "foreign_key": "crm.Company:id"},
            {"name": "tags", "type": "string", "list": true, "min_occurs": 0},
            {"name": "vip", "type": "boolean"},
            {"name": "birthday", "type": "date_time", "format": "yyyy-MM-dd", "min_occurs": 0},
            {"name": "number", "type": "long", "generated": true},
            {"name": "score", "type": "integer"},
            {"name": "notes", "type": "record", "list": true},
            {"name": "display", "type": "string", "transient": true}
        ]
    }
]"#;

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::from_json(CRM_SCHEMAS)
        .unwrap_or_else(|e| panic!("Invalid fixture schemas: {e}"))
}

pub fn schema(name: &str) -> SchemaDefinition {
    registry()
        .resolve(name)
        .cloned()
        .unwrap_or_else(|| panic!("Unknown fixture schema: {name}"))
}

/// Parameters of a contact search query.
pub fn search_input() -> SchemaDefinition {
    SchemaDefinition::new("contactSearch")
        .field(Field::new("id", SemanticType::Uuid))
        .field(Field::new("ids", SemanticType::Uuid).list())
        .field(Field::new("tags", SemanticType::String).list())
        .field(Field::new("scores", SemanticType::Integer).list())
        .field(Field::new("since", SemanticType::DateTime))
        .field(Field::new("name", SemanticType::String))
}

pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
