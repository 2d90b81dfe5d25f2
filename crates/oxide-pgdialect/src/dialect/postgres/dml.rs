//! INSERT statements for a record.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::{DialectError, Result};
use crate::interval::Interval;
use crate::schema::{Field, Granularity, SchemaDefinition, SemanticType};
use crate::value::{Record, Value};

/// Layout of timestamp literals, always rendered in UTC.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Generates an INSERT statement for `record`, stamped with the current time.
pub fn insert_sql(schema: &SchemaDefinition, record: &Record, compact: bool) -> Result<String> {
    insert_sql_at(schema, record, Utc::now(), compact)
}

/// Generates an INSERT statement for `record`.
///
/// Mandatory fields without a value get a synthesized one: a random UUID,
/// `now` for dates (the same instant for every date of the row), zero for
/// numbers and false for booleans. Generated fields without a value are left
/// to their sequence.
pub fn insert_sql_at(
    schema: &SchemaDefinition,
    record: &Record,
    now: DateTime<Utc>,
    compact: bool,
) -> Result<String> {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for field in schema
        .fields_in_table()
        .filter(|f| f.semantic_type.is_simple())
    {
        let value = match record.get(&field.name) {
            Some(value) if !value.is_null() => Some(Cow::Borrowed(value)),
            _ if field.generated => continue,
            _ if field.is_mandatory() => synthesize(field, now).map(Cow::Owned),
            _ => None,
        };
        columns.push(field.column_name());
        values.push(match value {
            Some(value) => literal(field, &value)?,
            None => String::from("null"),
        });
    }

    let table = schema.table_name();
    let sql = if compact {
        format!(
            "insert into {table} ({}) values ({});",
            columns.join(", "),
            values.join(", ")
        )
    } else {
        format!(
            "insert into {table} (\n\t{}\n) values (\n\t{}\n);",
            columns.join(",\n\t"),
            values.join(",\n\t")
        )
    };
    tracing::debug!(table = %table, columns = columns.len(), "Generated insert statement");
    Ok(sql)
}

/// Returns a value for a mandatory field that has none.
fn synthesize(field: &Field, now: DateTime<Utc>) -> Option<Value> {
    if field.list {
        return None;
    }
    match field.semantic_type {
        SemanticType::Uuid => Some(Value::Uuid(Uuid::new_v4())),
        SemanticType::DateTime => Some(Value::Timestamp(now)),
        SemanticType::Boolean => Some(Value::Bool(false)),
        t if t.is_numeric() => Some(Value::Int(0)),
        _ => None,
    }
}

/// Renders a value as a literal for `field`.
fn literal(field: &Field, value: &Value) -> Result<String> {
    match value {
        Value::List(items) if field.list => {
            if items.is_empty() {
                return Ok(String::from("'{}'"));
            }
            let elements = items
                .iter()
                .map(|item| scalar_literal(field, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("array[{}]", elements.join(", ")))
        }
        Value::List(_) => Err(invalid(field, "list given for a scalar field")),
        scalar if field.list => Ok(format!("array[{}]", scalar_literal(field, scalar)?)),
        scalar => scalar_literal(field, scalar),
    }
}

fn scalar_literal(field: &Field, value: &Value) -> Result<String> {
    if value.is_null() {
        return Ok(String::from("null"));
    }
    match field.semantic_type {
        SemanticType::DateTime => Ok(format!(
            "timestamp '{}'",
            timestamp(field, value)?.format(TIMESTAMP_FORMAT)
        )),
        t if t.is_textual() || t == SemanticType::Uuid => match value {
            Value::Text(s) => Ok(quote(s)),
            Value::Uuid(u) => Ok(quote(&u.to_string())),
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => Ok(quote(&plain(value))),
            _ => Err(invalid(field, "expected text")),
        },
        SemanticType::Duration => match value {
            Value::Interval(interval) => Ok(interval.to_sql_literal()),
            Value::Text(s) => Ok(Interval::from_str(s)
                .map_err(|e| invalid(field, &e.to_string()))?
                .to_sql_literal()),
            _ => Err(invalid(field, "expected a duration")),
        },
        SemanticType::Boolean => match value {
            Value::Bool(b) => Ok(b.to_string()),
            Value::Text(s) => s
                .trim()
                .parse::<bool>()
                .map(|b| b.to_string())
                .map_err(|_| invalid(field, "expected true or false")),
            _ => Err(invalid(field, "expected a boolean")),
        },
        t if t.is_numeric() => match value {
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) if f.is_finite() => Ok(f.to_string()),
            Value::Text(s) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => {
                Ok(s.trim().to_string())
            }
            _ => Err(invalid(field, "expected a number")),
        },
        SemanticType::Bytes => match value {
            Value::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
                Ok(format!("'\\x{hex}'"))
            }
            Value::Text(s) => Ok(quote(s)),
            _ => Err(invalid(field, "expected bytes")),
        },
        _ => match value {
            Value::Text(s) => Ok(quote(s)),
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => Ok(plain(value)),
            _ => Err(invalid(field, "unsupported value")),
        },
    }
}

/// Reads a point in time from a value.
fn timestamp(field: &Field, value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::Int(millis) => DateTime::from_timestamp_millis(*millis)
            .ok_or_else(|| invalid(field, "timestamp out of range")),
        Value::Text(s) => parse_timestamp(s.trim())
            .or_else(|| match field.granularity() {
                Granularity::Time => parse_time_of_day(s.trim()),
                _ => None,
            })
            .ok_or_else(|| invalid(field, &format!("unrecognized date '{s}'"))),
        _ => Err(invalid(field, "expected a date")),
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reads a time of day, anchored on the epoch date.
fn parse_time_of_day(text: &str) -> Option<DateTime<Utc>> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
        .map(|time| NaiveDate::default().and_time(time).and_utc())
}

fn plain(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Quotes text, doubling embedded single quotes.
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn invalid(field: &Field, reason: &str) -> DialectError {
    DialectError::InvalidValue {
        field: field.name.clone(),
        reason: reason.to_string(),
    }
}
