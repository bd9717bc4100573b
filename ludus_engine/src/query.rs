//! Query facade.
//!
//! Each query loads a fresh [`DatasetSnapshot`] holding just the files it needs, runs one resolver
//! over it and returns a result that carries every diagnostic gathered on the way. Nothing is kept
//! between queries.

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use ludus_data::Diagnostic;

use crate::classes::{self, ClassListing, ClassReport};
use crate::combo::{self, ComboChain};
use crate::config::DatasetLayout;
use crate::items::{self, ItemSkillReport};
use crate::prizes::{self, PrizeReport};
use crate::roster::{self, RecruitReport, StatSetMode};
use crate::sanitize::{DatasetId, SanitizeError};
use crate::skills::{self, SkillResolution};
use crate::snapshot::{DatasetFile, DatasetSnapshot};
use crate::store::{DatasetStore, StoreError};

/// The typed outcomes a query can end with instead of a result.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("dataset '{dataset}' has no '{path}'")]
    MissingDatasetFile { dataset: String, path: String },
    #[error("no {kind} matching '{name}'")]
    NotFound { kind: &'static str, name: String },
    #[error(transparent)]
    InvalidIdentifier(#[from] SanitizeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Every canonical class of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ClassCatalog {
    pub dataset: String,
    pub classes: Vec<ClassListing>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The combo chain of one skill, looked up by display name.
#[derive(Debug, Clone, Serialize)]
pub struct ComboReport {
    pub skill_create_name: String,
    pub display_name: String,
    /// `None` when the skill has no chain meter.
    pub chain: Option<ComboChain>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs queries against the datasets of one store.
#[derive(Debug, Clone)]
pub struct QueryEngine<S: DatasetStore> {
    store: S,
    layout: DatasetLayout,
}

impl<S: DatasetStore> QueryEngine<S> {
    pub fn new(store: S, layout: DatasetLayout) -> Self {
        Self { store, layout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    fn snapshot(&self, dataset: &DatasetId, required: &[DatasetFile], optional: &[DatasetFile]) -> Result<DatasetSnapshot, QueryError> {
        let snapshot = DatasetSnapshot::load(&self.store, &self.layout, dataset, required, optional)?;
        if !snapshot.diagnostics.is_empty() {
            warn!("dataset '{dataset}': {} diagnostics while parsing", snapshot.diagnostics.len());
        }
        Ok(snapshot)
    }

    /// Resolve a class by canonical name, variant code or display text.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn resolve_class(&self, dataset: &DatasetId, name: &str) -> Result<ClassReport, QueryError> {
        info!("resolve_class '{name}' in '{dataset}'");
        let snapshot = self.snapshot(
            dataset,
            &[DatasetFile::Classes],
            &[DatasetFile::Lookup, DatasetFile::Roster],
        )?;
        classes::resolve_class(&snapshot, name)
    }

    /// List every canonical class.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn list_classes(&self, dataset: &DatasetId) -> Result<ClassCatalog, QueryError> {
        info!("list_classes in '{dataset}'");
        let snapshot = self.snapshot(
            dataset,
            &[DatasetFile::Classes],
            &[DatasetFile::Lookup, DatasetFile::Roster],
        )?;
        Ok(ClassCatalog {
            dataset: dataset.to_string(),
            classes: classes::list_classes(&snapshot),
            diagnostics: snapshot.diagnostics,
        })
    }

    /// Resolve every skill shown as `display_name`, optionally limited to one class.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn resolve_skill(&self, dataset: &DatasetId, display_name: &str, class_filter: Option<&str>) -> Result<SkillResolution, QueryError> {
        info!("resolve_skill '{display_name}' in '{dataset}'");
        let snapshot = self.snapshot(dataset, &[DatasetFile::Skills], &[DatasetFile::Lookup])?;
        skills::resolve_skill(&snapshot, display_name, class_filter)
    }

    /// Follow the combo chain of the skill shown as `display_name`.
    ///
    /// When several skills share the name, the first in file order is used.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn resolve_combo_chain(&self, dataset: &DatasetId, display_name: &str) -> Result<ComboReport, QueryError> {
        info!("resolve_combo_chain '{display_name}' in '{dataset}'");
        let snapshot = self.snapshot(dataset, &[DatasetFile::Skills], &[DatasetFile::Lookup])?;
        let matches = skills::find_skills(&snapshot, display_name, None);
        let skill = *matches.first().ok_or_else(|| QueryError::NotFound {
            kind: "skill",
            name: display_name.to_string(),
        })?;

        let mut diagnostics = snapshot.diagnostics.clone();
        if matches.iter().any(|other| other.create_name != skill.create_name) {
            diagnostics.push(Diagnostic::AmbiguousReference {
                kind: "skill".to_string(),
                name: display_name.to_string(),
                chosen: skill.create_name.clone(),
            });
        }
        let chain = combo::resolve_combo_chain(skill, &snapshot.skills, &mut diagnostics);
        Ok(ComboReport {
            skill_create_name: skill.create_name.clone(),
            display_name: snapshot.lookup.display_or(skill.display_name_id, &skill.create_name),
            chain,
            diagnostics,
        })
    }

    /// Find the items that grant a skill.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn find_items_granting_skill(&self, dataset: &DatasetId, skill_name: &str) -> Result<ItemSkillReport, QueryError> {
        info!("find_items_granting_skill '{skill_name}' in '{dataset}'");
        let snapshot = self.snapshot(dataset, &[DatasetFile::Skills, DatasetFile::Items], &[DatasetFile::Lookup])?;
        items::find_items_granting_skill(&snapshot, skill_name)
    }

    /// Find where units of a class are recruited and pick the class's stat set.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn find_recruit_locations(&self, dataset: &DatasetId, class_name: &str, mode: StatSetMode) -> Result<RecruitReport, QueryError> {
        info!("find_recruit_locations '{class_name}' ({mode:?}) in '{dataset}'");
        let snapshot = self.snapshot(
            dataset,
            &[DatasetFile::Roster, DatasetFile::Locations],
            &[DatasetFile::Classes, DatasetFile::Lookup, DatasetFile::StatSets],
        )?;
        roster::find_recruit_locations(&snapshot, class_name, mode)
    }

    /// Find the prizes of a league or encounter.
    ///
    /// # Errors
    /// See [`QueryError`].
    pub fn find_prizes(&self, dataset: &DatasetId, name: &str) -> Result<PrizeReport, QueryError> {
        info!("find_prizes '{name}' in '{dataset}'");
        let snapshot = self.snapshot(
            dataset,
            &[DatasetFile::Locations, DatasetFile::Prizes],
            &[DatasetFile::Lookup],
        )?;
        prizes::find_prizes(&snapshot, name)
    }
}
