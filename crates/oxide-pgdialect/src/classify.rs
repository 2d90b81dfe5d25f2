//! Classification of database errors.
//!
//! Errors coming back from statement execution are unwound to their deepest
//! cause and matched against the messages PostgreSQL produces, so callers can
//! treat for example a unique violation as a validation failure instead of a
//! transport failure.

use std::error::Error;
use std::fmt;

const UNIQUE_VIOLATION_MESSAGE: &str = "duplicate key value violates unique constraint";

/// Semantic kind of a database error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A unique constraint was violated.
    UniqueViolation,
    /// No known pattern matched.
    Unrecognized,
}

impl ErrorKind {
    /// Returns the stable code of this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The outcome of classifying a database error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassification {
    /// The semantic kind.
    pub kind: ErrorKind,
    /// The offending constraint or field, when one could be extracted.
    pub detail: Option<String>,
}

impl ErrorClassification {
    /// Classification for errors no pattern matched.
    #[must_use]
    pub const fn unrecognized() -> Self {
        Self {
            kind: ErrorKind::Unrecognized,
            detail: None,
        }
    }

    /// Returns true if a known pattern matched.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.kind != ErrorKind::Unrecognized
    }

    /// Returns a human readable description.
    #[must_use]
    pub fn description(&self) -> String {
        match self.kind {
            ErrorKind::UniqueViolation => format!(
                "Unique constraint violation for {}",
                self.detail
                    .as_deref()
                    .map_or_else(|| "unknown field".to_string(), |d| format!("'{d}'"))
            ),
            ErrorKind::Unrecognized => String::from("Unrecognized database error"),
        }
    }
}

/// Returns the deepest cause of an error chain.
#[must_use]
pub fn root_cause<'a>(error: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current
}

/// Classifies an error by its deepest cause.
#[must_use]
pub fn classify(error: &(dyn Error + 'static)) -> ErrorClassification {
    let classification = classify_message(&root_cause(error).to_string());
    tracing::debug!(
        kind = %classification.kind,
        detail = ?classification.detail,
        "Classified database error"
    );
    classification
}

/// Classifies a raw PostgreSQL error message.
#[must_use]
pub fn classify_message(message: &str) -> ErrorClassification {
    if message.contains(UNIQUE_VIOLATION_MESSAGE) {
        return ErrorClassification {
            kind: ErrorKind::UniqueViolation,
            detail: first_quoted(message),
        };
    }
    ErrorClassification::unrecognized()
}

/// Returns the text between the first pair of double quotes.
fn first_quoted(message: &str) -> Option<String> {
    let (_, rest) = message.split_once('"')?;
    let (quoted, _) = rest.split_once('"')?;
    Some(quoted.to_string())
}
