use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-fatal finding recorded while parsing or cross-referencing a dataset.
///
/// None of these abort a query; they travel alongside the result so a caller can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A line or record failed its grammar and was skipped.
    MalformedRecord { file: String, line: usize, context: String },
    /// A name matched several candidates; the first in file order was used.
    AmbiguousReference { kind: String, name: String, chosen: String },
    /// A link (sub-skill, item skill, prize) could not be followed.
    UnresolvedReference { kind: String, name: String, context: String },
    /// A recruit declaration names a unit the roster does not know.
    UnknownRecruit { name: String, location: String },
    /// A roster unit of the queried class is declared in no location.
    UnreachableUnit { name: String, class_name: String },
    /// A stat set could not take part in level-30 ranking.
    UnrankedStatSet { id: u32, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRecord { file, line, context } => {
                write!(f, "malformed record in '{file}' line {line} ({context})")
            },
            Diagnostic::AmbiguousReference { kind, name, chosen } => {
                write!(f, "ambiguous {kind} '{name}', using '{chosen}'")
            },
            Diagnostic::UnresolvedReference { kind, name, context } => {
                write!(f, "unresolved {kind} '{name}' ({context})")
            },
            Diagnostic::UnknownRecruit { name, location } => {
                write!(f, "unknown recruit '{name}' declared in '{location}'")
            },
            Diagnostic::UnreachableUnit { name, class_name } => {
                write!(f, "{class_name} '{name}' is not recruitable anywhere")
            },
            Diagnostic::UnrankedStatSet { id, reason } => {
                write!(f, "stat set {id} not ranked ({reason})")
            },
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_item() {
        let diag = Diagnostic::UnknownRecruit {
            name: "Ghost".into(),
            location: "imperia".into(),
        };
        assert_eq!(diag.to_string(), "unknown recruit 'Ghost' declared in 'imperia'");

        let diag = Diagnostic::MalformedRecord {
            file: "skills.tok".into(),
            line: 12,
            context: "no key".into(),
        };
        assert!(diag.to_string().contains("line 12"));
    }
}
