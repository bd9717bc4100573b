//! Dataset snapshots: every file a query needs, read and parsed once.
//!
//! A snapshot is built at the start of a top-level query, passed by reference into the resolvers and
//! dropped with the query result. Nothing is cached between queries.

use log::{info, warn};

use ludus_data::{ClassEntity, Diagnostic, GladiatorRecord, ItemEntity, Prize, SkillEntity, StatSet};

use crate::classes::build_classes;
use crate::config::DatasetLayout;
use crate::extract::{FileKind, extract_records};
use crate::items::build_items;
use crate::localization::LocalizationTable;
use crate::locations::{Location, parse_location};
use crate::prizes::build_prizes;
use crate::query::QueryError;
use crate::roster::{parse_roster, parse_stat_sets};
use crate::sanitize::DatasetId;
use crate::skills::build_skills;
use crate::store::{DatasetStore, StoreError};

/// The files a query can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFile {
    Lookup,
    Classes,
    Skills,
    Items,
    Prizes,
    Roster,
    StatSets,
    Locations,
}

impl DatasetFile {
    pub fn path(self, layout: &DatasetLayout) -> &str {
        match self {
            DatasetFile::Lookup => &layout.lookup,
            DatasetFile::Classes => &layout.classes,
            DatasetFile::Skills => &layout.skills,
            DatasetFile::Items => &layout.items,
            DatasetFile::Prizes => &layout.prizes,
            DatasetFile::Roster => &layout.roster,
            DatasetFile::StatSets => &layout.stat_sets,
            DatasetFile::Locations => &layout.locations,
        }
    }
}

/// Parsed contents of one dataset, limited to the files that were loaded.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub dataset: DatasetId,
    pub lookup: LocalizationTable,
    pub classes: Vec<ClassEntity>,
    pub skills: Vec<SkillEntity>,
    pub items: Vec<ItemEntity>,
    pub prizes: Vec<Prize>,
    pub roster: Vec<GladiatorRecord>,
    pub stat_sets: Vec<StatSet>,
    /// Location files in name order.
    pub locations: Vec<Location>,
    /// Everything skipped or suspicious while parsing.
    pub diagnostics: Vec<Diagnostic>,
}

impl DatasetSnapshot {
    /// A snapshot with nothing loaded.
    pub fn empty(dataset: DatasetId) -> Self {
        Self {
            dataset,
            lookup: LocalizationTable::default(),
            classes: Vec::new(),
            skills: Vec::new(),
            items: Vec::new(),
            prizes: Vec::new(),
            roster: Vec::new(),
            stat_sets: Vec::new(),
            locations: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Read and parse the `required` and `optional` files of `dataset`.
    ///
    /// A missing optional file is logged and left empty.
    ///
    /// # Errors
    /// [`QueryError::MissingDatasetFile`] when a required file or folder is absent, and
    /// [`QueryError::Store`] when the store fails for any other reason.
    pub fn load(
        store: &dyn DatasetStore,
        layout: &DatasetLayout,
        dataset: &DatasetId,
        required: &[DatasetFile],
        optional: &[DatasetFile],
    ) -> Result<Self, QueryError> {
        let mut snapshot = Self::empty(dataset.clone());
        let wanted = required.iter().map(|f| (*f, true)).chain(optional.iter().map(|f| (*f, false)));
        for (file, is_required) in wanted {
            match snapshot.load_file(store, layout, file) {
                Ok(()) => {},
                Err(StoreError::NotFound { .. }) if !is_required => {
                    warn!(
                        "optional file '{}' missing from dataset '{dataset}', continuing without it",
                        file.path(layout)
                    );
                },
                Err(StoreError::NotFound { .. }) => {
                    return Err(QueryError::MissingDatasetFile {
                        dataset: dataset.to_string(),
                        path: file.path(layout).to_string(),
                    });
                },
                Err(err) => return Err(QueryError::Store(err)),
            }
        }
        info!(
            "dataset '{dataset}' loaded: {} texts, {} classes, {} skills, {} items, {} units, {} stat sets, {} locations, {} prizes, {} diagnostics",
            snapshot.lookup.len(),
            snapshot.classes.len(),
            snapshot.skills.len(),
            snapshot.items.len(),
            snapshot.roster.len(),
            snapshot.stat_sets.len(),
            snapshot.locations.len(),
            snapshot.prizes.len(),
            snapshot.diagnostics.len()
        );
        Ok(snapshot)
    }

    fn load_file(&mut self, store: &dyn DatasetStore, layout: &DatasetLayout, file: DatasetFile) -> Result<(), StoreError> {
        let path = file.path(layout);
        let diagnostics = &mut self.diagnostics;
        match file {
            DatasetFile::Lookup => {
                self.lookup = LocalizationTable::parse(&store.read_file(&self.dataset, path)?);
            },
            DatasetFile::Classes => {
                let text = store.read_file(&self.dataset, path)?;
                let records = extract_records(&text, FileKind::Classes, path, diagnostics);
                self.classes = build_classes(&records, path, diagnostics);
            },
            DatasetFile::Skills => {
                let text = store.read_file(&self.dataset, path)?;
                let records = extract_records(&text, FileKind::Skills, path, diagnostics);
                self.skills = build_skills(&records, path, diagnostics);
            },
            DatasetFile::Items => {
                let text = store.read_file(&self.dataset, path)?;
                let records = extract_records(&text, FileKind::Items, path, diagnostics);
                self.items = build_items(&records, path, diagnostics);
            },
            DatasetFile::Prizes => {
                let text = store.read_file(&self.dataset, path)?;
                let records = extract_records(&text, FileKind::Prizes, path, diagnostics);
                self.prizes = build_prizes(&records, path, diagnostics);
            },
            DatasetFile::Roster => {
                self.roster = parse_roster(&store.read_file(&self.dataset, path)?, path, diagnostics);
            },
            DatasetFile::StatSets => {
                self.stat_sets = parse_stat_sets(&store.read_file(&self.dataset, path)?, path, diagnostics);
            },
            DatasetFile::Locations => {
                let extension = format!(".{}", layout.location_extension.trim_start_matches('.'));
                let mut locations = Vec::new();
                for name in store.list_files(&self.dataset, path)? {
                    let Some(stem) = name.strip_suffix(&extension) else {
                        continue;
                    };
                    let file_path = format!("{}/{name}", path.trim_end_matches('/'));
                    let text = store.read_file(&self.dataset, &file_path)?;
                    locations.push(parse_location(stem, &text, &file_path, diagnostics));
                }
                self.locations = locations;
            },
        }
        Ok(())
    }
}
