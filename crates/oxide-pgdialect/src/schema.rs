//! Schema descriptors consumed by the dialect.
//!
//! A [`SchemaDefinition`] describes one storage entity: an ordered list of typed
//! [`Field`]s plus the metadata the generators need (primary key, uniqueness,
//! indexes, sequences, foreign keys). The types are deliberately engine neutral;
//! the dialect decides how each [`SemanticType`] is stored and cast.
//!
//! Definitions are immutable once built and can be loaded from JSON:
//!
//! ```rust
//! use oxide_pgdialect::schema::{Field, SchemaDefinition, SemanticType};
//!
//! let users = SchemaDefinition::new("userAccount")
//!     .field(Field::new("id", SemanticType::Uuid))
//!     .field(Field::new("emailAddress", SemanticType::String).unique())
//!     .field(Field::new("nickName", SemanticType::String).optional());
//!
//! assert_eq!(users.table_name(), "user_account");
//! assert_eq!(users.primary_key().unwrap().name, "id");
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// Engine-neutral classification of a field's value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Unicode string.
    String,
    /// Raw character sequence.
    CharSequence,
    /// URI.
    Uri,
    /// Enumerated value, stored by name.
    Enumeration,
    /// Duration (years down to seconds).
    Duration,
    /// Byte sequence.
    Bytes,
    /// 16-bit integer.
    Short,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Arbitrary-precision integer.
    BigInteger,
    /// Single precision floating point.
    Float,
    /// Double precision floating point.
    Double,
    /// Arbitrary-precision decimal.
    Decimal,
    /// Boolean.
    Boolean,
    /// UUID.
    Uuid,
    /// Date, time or timestamp, narrowed by the field's format.
    DateTime,
    /// Nested record, stored through a surrogate `<column>_id` reference.
    Record,
    /// Simple value without a relational representation.
    Opaque,
}

impl SemanticType {
    /// Returns true for numeric types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Short
                | Self::Integer
                | Self::Long
                | Self::BigInteger
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }

    /// Returns true for types stored as text.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Self::String | Self::CharSequence | Self::Uri | Self::Enumeration
        )
    }

    /// Returns true for everything but nested records.
    #[must_use]
    pub const fn is_simple(self) -> bool {
        !matches!(self, Self::Record)
    }
}

/// Precision of a date/time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// Date only.
    Date,
    /// Time of day only.
    Time,
    /// Full timestamp.
    #[default]
    Timestamp,
}

impl Granularity {
    /// Derives the granularity from a format annotation.
    ///
    /// Named formats (`date`, `time`, `dateTime`, `timestamp`) map directly,
    /// anything else is read as a date pattern.
    #[must_use]
    pub fn from_format(format: &str) -> Self {
        match format.trim() {
            "date" => Self::Date,
            "time" => Self::Time,
            "dateTime" | "timestamp" => Self::Timestamp,
            pattern => {
                let mut has_date = false;
                let mut has_time = false;
                let mut quoted = false;
                for c in pattern.chars() {
                    match c {
                        '\'' => quoted = !quoted,
                        _ if quoted => {}
                        'y' | 'Y' | 'M' | 'd' | 'D' | 'E' | 'u' | 'w' => has_date = true,
                        'H' | 'h' | 'k' | 'K' | 'm' | 's' | 'S' | 'a' => has_time = true,
                        _ => {}
                    }
                }
                match (has_date, has_time) {
                    (true, false) => Self::Date,
                    (false, true) => Self::Time,
                    _ => Self::Timestamp,
                }
            }
        }
    }

    /// Returns the PostgreSQL type for this granularity.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
        }
    }
}

/// A parsed `<type>:<column>` foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyTarget {
    /// Reference to the target type, resolved through a [`SchemaResolver`].
    pub type_ref: String,
    /// The referenced column.
    pub column: String,
}

impl ForeignKeyTarget {
    /// Parses a foreign key declared on `field`.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let mut parts = value.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(type_ref), Some(column), None)
                if !type_ref.trim().is_empty() && !column.trim().is_empty() =>
            {
                Ok(Self {
                    type_ref: type_ref.trim().to_string(),
                    column: column.trim().to_string(),
                })
            }
            _ => Err(DialectError::InvalidForeignKey {
                field: field.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

const fn default_min_occurs() -> u32 {
    1
}

// serde passes `skip_serializing_if` arguments by reference.
#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_default_min_occurs(value: &u32) -> bool {
    *value == 1
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A named, typed column-level unit of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Logical name.
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    /// Whether the value is a list of the base type.
    #[serde(default, skip_serializing_if = "is_false")]
    pub list: bool,
    /// Minimum occurrences, 0 means optional.
    #[serde(
        default = "default_min_occurs",
        skip_serializing_if = "is_default_min_occurs"
    )]
    pub min_occurs: u32,
    /// Whether this is explicitly the primary key.
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    /// Whether values are unique.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    /// Whether an index is created on the column.
    #[serde(default, skip_serializing_if = "is_false")]
    pub indexed: bool,
    /// Whether the value comes from a database sequence.
    #[serde(default, skip_serializing_if = "is_false")]
    pub generated: bool,
    /// Whether the field is kept out of the table.
    #[serde(default, skip_serializing_if = "is_false")]
    pub transient: bool,
    /// Foreign key as `<type>:<column>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// Raw SQL default literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Format annotation, used for date/time granularity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Field {
    /// Creates a mandatory scalar field.
    #[must_use]
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            list: false,
            min_occurs: 1,
            primary_key: false,
            unique: false,
            indexed: false,
            generated: false,
            transient: false,
            foreign_key: None,
            default_value: None,
            format: None,
        }
    }

    /// Marks the field as a list.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Marks the field as optional (min occurs 0).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.min_occurs = 0;
        self
    }

    /// Marks the field as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the field as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the field as indexed.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Marks the field as sequence generated.
    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Keeps the field out of the table.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Sets a `<type>:<column>` foreign key.
    #[must_use]
    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.foreign_key = Some(target.into());
        self
    }

    /// Sets a raw default literal.
    #[must_use]
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }

    /// Sets the format annotation.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Returns true if a value is required.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.min_occurs > 0
    }

    /// Returns the storage column name.
    #[must_use]
    pub fn column_name(&self) -> String {
        storage_name(&self.name)
    }

    /// Returns the date/time granularity, defaulting to timestamp.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.format
            .as_deref()
            .map_or(Granularity::Timestamp, Granularity::from_format)
    }

    /// Returns the default literal, ignoring blank values.
    #[must_use]
    pub fn default_literal(&self) -> Option<&str> {
        self.default_value
            .as_deref()
            .map(str::trim)
            .filter(|literal| !literal.is_empty())
    }

    /// Parses the foreign key, if any.
    pub fn foreign_key_target(&self) -> Result<Option<ForeignKeyTarget>> {
        self.foreign_key
            .as_deref()
            .map(|value| ForeignKeyTarget::parse(&self.name, value))
            .transpose()
    }
}

/// An ordered set of fields stored as one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Logical name, also the key under which the schema is resolved.
    pub name: String,
    /// Storage collection name, falls back to the logical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    /// Reference to the super type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl SchemaDefinition {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection_name: None,
            super_type: None,
            fields: Vec::new(),
        }
    }

    /// Sets the storage collection name.
    #[must_use]
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    /// Sets the super type reference.
    #[must_use]
    pub fn extends(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by logical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the fields persisted directly in the table.
    ///
    /// Transient fields and lists of nested records have no column.
    pub fn fields_in_table(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| !f.transient && !(f.list && f.semantic_type == SemanticType::Record))
    }

    /// Returns the collection name, or the logical name if unset.
    #[must_use]
    pub fn collection_name(&self) -> &str {
        self.collection_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the storage table name.
    #[must_use]
    pub fn table_name(&self) -> String {
        storage_name(self.collection_name())
    }

    /// Returns the primary key field.
    ///
    /// An explicitly flagged field wins, otherwise the field named `id`.
    pub fn primary_key(&self) -> Result<&Field> {
        let flagged: Vec<&Field> = self.fields_in_table().filter(|f| f.primary_key).collect();
        match flagged.as_slice() {
            [field] => Ok(*field),
            [] => self
                .fields_in_table()
                .find(|f| f.name == "id")
                .ok_or_else(|| DialectError::MissingPrimaryKey {
                    table: self.table_name(),
                }),
            _ => Err(DialectError::AmbiguousPrimaryKey {
                table: self.table_name(),
                fields: flagged.iter().map(|f| f.name.clone()).collect(),
            }),
        }
    }

    /// Returns this schema with the primary key of its super type mirrored in.
    ///
    /// A schema extending another shares its parent's key. When it has no
    /// key of its own, the parent's key field is prepended as its primary
    /// key; otherwise the schema is returned as is.
    pub fn inherit_key(&self, resolver: &dyn SchemaResolver) -> Result<Cow<'_, Self>> {
        self.inherit_key_from(resolver, &mut Vec::new())
    }

    fn inherit_key_from(
        &self,
        resolver: &dyn SchemaResolver,
        visited: &mut Vec<String>,
    ) -> Result<Cow<'_, Self>> {
        let Some(ref super_ref) = self.super_type else {
            return Ok(Cow::Borrowed(self));
        };
        match self.primary_key() {
            Err(DialectError::MissingPrimaryKey { .. }) => {}
            Err(e) => return Err(e),
            Ok(_) => return Ok(Cow::Borrowed(self)),
        }

        let unresolved = || DialectError::UnresolvedReference {
            field: self.name.clone(),
            reference: super_ref.clone(),
        };
        // A cycle of key-less schemas never reaches a key.
        if visited.contains(&self.name) {
            return Err(unresolved());
        }
        visited.push(self.name.clone());

        let parent = resolver.resolve(super_ref).ok_or_else(unresolved)?;
        let parent = parent.inherit_key_from(resolver, visited)?;
        let key = parent.primary_key()?;
        let mirrored = Field {
            list: false,
            min_occurs: 1,
            primary_key: true,
            unique: false,
            indexed: false,
            generated: false,
            transient: false,
            foreign_key: None,
            default_value: None,
            ..key.clone()
        };

        let mut schema = self.clone();
        schema.fields.insert(0, mirrored);
        Ok(Cow::Owned(schema))
    }
}

/// Resolves type references to schema definitions.
pub trait SchemaResolver {
    /// Returns the schema registered under `reference`.
    fn resolve(&self, reference: &str) -> Option<&SchemaDefinition>;
}

/// A set of schemas keyed by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    schemas: Vec<SchemaDefinition>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schemas: Vec::new(),
        }
    }

    /// Adds a schema, replacing any schema with the same name.
    #[must_use]
    pub fn with(mut self, schema: SchemaDefinition) -> Self {
        self.register(schema);
        self
    }

    /// Adds a schema, replacing any schema with the same name.
    pub fn register(&mut self, schema: SchemaDefinition) {
        self.schemas.retain(|s| s.name != schema.name);
        self.schemas.push(schema);
    }

    /// Parses a JSON array of schema definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the number of schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaResolver for SchemaRegistry {
    fn resolve(&self, reference: &str) -> Option<&SchemaDefinition> {
        self.schemas.iter().find(|s| s.name == reference)
    }
}

/// Converts a logical identifier to a lower, underscore separated storage name.
///
/// `firstName` becomes `first_name`, `HTTPServer` becomes `http_server`.
#[must_use]
pub fn storage_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == '.' || c.is_whitespace() {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}
