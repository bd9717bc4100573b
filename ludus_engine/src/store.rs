//! Dataset stores: where dataset files are read from.
//!
//! The engine only ever reads through [`DatasetStore`]. Paths inside a dataset are `/`-separated and
//! relative to the dataset directory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::sanitize::DatasetId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("'{path}' not found")]
    NotFound { path: String },
    #[error("reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Read access to the files of named datasets.
pub trait DatasetStore {
    /// Read a whole text file.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when the file does not exist, [`StoreError::Io`] for other failures.
    fn read_file(&self, dataset: &DatasetId, path: &str) -> Result<String, StoreError>;

    /// True if `path` names an existing file or folder of the dataset.
    fn exists(&self, dataset: &DatasetId, path: &str) -> bool;

    /// File names (not paths) directly inside `folder`, sorted.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when the folder does not exist.
    fn list_files(&self, dataset: &DatasetId, folder: &str) -> Result<Vec<String>, StoreError>;
}

/// Datasets stored as directories under a common root.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` below the dataset directory, refusing anything but plain components.
    fn resolve(&self, dataset: &DatasetId, path: &str) -> Option<PathBuf> {
        let mut full = self.root.join(dataset.as_str());
        for part in path.split(['/', '\\']).filter(|p| !p.is_empty()) {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) => full.push(name),
                _ => return None,
            }
        }
        Some(full)
    }
}

impl DatasetStore for FsStore {
    fn read_file(&self, dataset: &DatasetId, path: &str) -> Result<String, StoreError> {
        let full = self.resolve(dataset, path).ok_or_else(|| not_found(dataset, path))?;
        match fs::read(&full) {
            // game text files are not always valid UTF-8
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(not_found(dataset, path)),
            Err(source) => Err(StoreError::Io {
                path: full.display().to_string(),
                source,
            }),
        }
    }

    fn exists(&self, dataset: &DatasetId, path: &str) -> bool {
        self.resolve(dataset, path).is_some_and(|full| full.exists())
    }

    fn list_files(&self, dataset: &DatasetId, folder: &str) -> Result<Vec<String>, StoreError> {
        let full = self.resolve(dataset, folder).ok_or_else(|| not_found(dataset, folder))?;
        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(not_found(dataset, folder)),
            Err(source) => {
                return Err(StoreError::Io {
                    path: full.display().to_string(),
                    source,
                });
            },
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: full.display().to_string(),
                source,
            })?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Datasets held in memory, keyed by dataset and `/`-separated path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: &str, path: &str, contents: impl Into<String>) {
        self.files
            .insert((dataset.to_string(), normalize(path)), contents.into());
    }

    /// Builder-style [`MemoryStore::insert`].
    #[must_use]
    pub fn with_file(mut self, dataset: &str, path: &str, contents: impl Into<String>) -> Self {
        self.insert(dataset, path, contents);
        self
    }
}

impl DatasetStore for MemoryStore {
    fn read_file(&self, dataset: &DatasetId, path: &str) -> Result<String, StoreError> {
        self.files
            .get(&(dataset.as_str().to_string(), normalize(path)))
            .cloned()
            .ok_or_else(|| not_found(dataset, path))
    }

    fn exists(&self, dataset: &DatasetId, path: &str) -> bool {
        let path = normalize(path);
        let prefix = format!("{path}/");
        self.files
            .keys()
            .any(|(ds, file)| ds == dataset.as_str() && (*file == path || file.starts_with(&prefix)))
    }

    fn list_files(&self, dataset: &DatasetId, folder: &str) -> Result<Vec<String>, StoreError> {
        if !self.exists(dataset, folder) {
            return Err(not_found(dataset, folder));
        }
        let prefix = format!("{}/", normalize(folder));
        // BTreeMap keys are already sorted
        Ok(self
            .files
            .keys()
            .filter(|(ds, _)| ds == dataset.as_str())
            .filter_map(|(_, file)| file.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }
}

fn normalize(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn not_found(dataset: &DatasetId, path: &str) -> StoreError {
    StoreError::NotFound {
        path: format!("{dataset}/{path}"),
    }
}
