//! Normalization of user-provided identifiers.
//!
//! Search terms keep only word characters, whitespace, apostrophes and hyphens. Dataset names go
//! through the same filter and must then form exactly one path segment, so a [`DatasetId`] can be
//! joined onto a datasets root without escaping it.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^\w\s'-]").expect("valid regex");
}

/// Strip every disallowed character and trim surrounding whitespace.
///
/// ```
/// use ludus_engine::sanitize::sanitize;
///
/// assert_eq!(sanitize("  Power Strike!  "), "Power Strike");
/// assert_eq!(sanitize("Dragon's Bane-2"), "Dragon's Bane-2");
/// ```
pub fn sanitize(input: &str) -> String {
    DISALLOWED.replace_all(input, "").trim().to_string()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("dataset name '{0}' is empty after sanitizing")]
    Empty(String),
    #[error("dataset name '{0}' is not a single path segment")]
    NotASegment(String),
}

/// A dataset name validated once to be a single, non-traversing path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DatasetId(String);

impl DatasetId {
    /// Sanitize `raw` and check that the result is a plain basename.
    ///
    /// # Errors
    /// Returns [`SanitizeError`] when nothing usable remains or the result is not one segment.
    pub fn new(raw: &str) -> Result<Self, SanitizeError> {
        let cleaned = sanitize(raw);
        if cleaned.is_empty() {
            return Err(SanitizeError::Empty(raw.to_string()));
        }
        let is_segment = !cleaned.contains(['/', '\\'])
            && cleaned != "."
            && cleaned != ".."
            && !cleaned.starts_with('.');
        if !is_segment {
            return Err(SanitizeError::NotASegment(raw.to_string()));
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DatasetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Component, Path};

    #[test]
    fn traversal_collapses_to_one_segment() {
        let id = DatasetId::new("Mod/../../etc").unwrap();
        assert_eq!(id.as_str(), "Modetc");

        let joined = Path::new("/srv/datasets").join(id.as_str());
        assert!(joined.starts_with("/srv/datasets"));
        assert_eq!(Path::new(id.as_str()).components().count(), 1);
        assert!(matches!(Path::new(id.as_str()).components().next(), Some(Component::Normal(_))));
    }

    #[test]
    fn separators_and_dots_are_removed() {
        assert_eq!(sanitize(r"..\windows\system32"), "windowssystem32");
        assert_eq!(sanitize("a.b/c"), "abc");
    }

    #[test]
    fn empty_names_are_rejected() {
        assert_eq!(DatasetId::new("../.."), Err(SanitizeError::Empty("../..".into())));
        assert!(DatasetId::new("   ").is_err());
    }

    #[test]
    fn readable_names_survive() {
        let id = DatasetId::new("  Vanilla Plus ").unwrap();
        assert_eq!(id.to_string(), "Vanilla Plus");
    }
}
