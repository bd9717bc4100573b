//! Shared data model for Ludus datasets.

pub mod defs;
pub mod diagnostic;
pub mod record;

pub use defs::*;
pub use diagnostic::Diagnostic;
pub use record::{Field, Record};
