//! Selector union for identifying users across entry points.
//!
//! Every entry point (path segment, query parameter, request-body entry,
//! RPC message) constructs the same tagged union, so downstream processing
//! dispatches on selector kind and never on transport origin.

use serde_json::{Map, Value};

use super::UserId;

/// A single identifying token for a user: a numeric id or a name string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(UserId),
    Name(String),
}

/// Construction failures for selectors, distinguishable from not-found.
///
/// The rendered message names the offending raw value so the caller can
/// correct it; batch processing reports these through the same failure list
/// as unresolved selectors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorParseError {
    /// An `id` entry whose value does not parse as an integer.
    #[error("User ID '{raw}' is not a valid number")]
    InvalidId { raw: String },
    /// An entry carrying neither an `id` nor a `name` key.
    #[error("Invalid request object: {raw}")]
    Unrecognised { raw: String },
}

impl SelectorParseError {
    pub fn invalid_id(raw: impl Into<String>) -> Self {
        Self::InvalidId { raw: raw.into() }
    }

    pub fn unrecognised(raw: impl Into<String>) -> Self {
        Self::Unrecognised { raw: raw.into() }
    }
}

/// Outcome of constructing a selector from one raw request entry.
pub type ParsedSelector = Result<Selector, SelectorParseError>;

impl Selector {
    /// Build a selector from one request-body object.
    ///
    /// An `id` key wins over a `name` key when both are present, matching
    /// the precedence the delete entry points have always applied. Numeric
    /// ids may arrive as JSON numbers or as numeric strings.
    pub fn from_entry(entry: &Map<String, Value>) -> ParsedSelector {
        if let Some(raw) = entry.get("id") {
            return Self::from_id_value(raw);
        }
        if let Some(raw) = entry.get("name") {
            let name = match raw.as_str() {
                Some(name) => name.to_owned(),
                None => raw.to_string(),
            };
            return Ok(Self::Name(name));
        }
        Err(SelectorParseError::unrecognised(
            Value::Object(entry.clone()).to_string(),
        ))
    }

    /// Build an id selector from a raw JSON value.
    pub fn from_id_value(raw: &Value) -> ParsedSelector {
        if let Some(id) = raw.as_i64() {
            return Ok(Self::Id(id));
        }
        if let Some(text) = raw.as_str() {
            return Self::from_id_text(text);
        }
        Err(SelectorParseError::invalid_id(raw.to_string()))
    }

    /// Build an id selector from query-parameter or path text.
    pub fn from_id_text(text: &str) -> ParsedSelector {
        text.trim()
            .parse::<UserId>()
            .map(Self::Id)
            .map_err(|_| SelectorParseError::invalid_id(text))
    }
}
