use std::env;
use std::path::{Path, PathBuf};

use log::debug;

/// Environment variable overriding the datasets root.
pub const DATASETS_ENV: &str = "LUDUS_DATASETS";

/// Pick the datasets root: explicit choice, then `LUDUS_DATASETS`, then configuration, then detection.
pub fn resolve_datasets_root(explicit: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(from_env) = env::var(DATASETS_ENV)
        && !from_env.trim().is_empty()
    {
        return PathBuf::from(from_env);
    }
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    detect_datasets_root()
}

/// Resolve the most likely location of the datasets directory.
fn detect_datasets_root() -> PathBuf {
    let mut candidates = vec![PathBuf::from("datasets"), PathBuf::from("data/datasets")];

    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("datasets"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("datasets"));
        }
    }

    let found = candidates.into_iter().find(|candidate| candidate.is_dir());
    debug!("detected datasets root: {found:?}");
    found.unwrap_or_else(|| PathBuf::from("datasets"))
}
