//! Package discovery for GDF2 file pairs.
//!
//! A GDF2 package is a definition (`.dfn`) file next to a data (`.dat`)
//! file sharing the same stem. Discovery accepts a bare base path, the
//! definition file itself, or a path carrying any of the other
//! conventional package extensions.

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, warn};

use crate::error::{GdfError, Result};

/// A located package file pair.
///
/// The data file is optional: a definition file on its own still supports
/// catalogue inspection, and the first data access reports the gap.
#[derive(Debug, Clone)]
pub struct GdfPackage {
    pub dfn_path: PathBuf,
    pub dat_path: Option<PathBuf>,
}

/// Locate the package at or near `path`.
///
/// Candidates are all filesystem entries matching `<path>*`; the first one
/// that is, or sits next to, a definition file wins.
pub fn locate_package(path: &Path) -> Result<GdfPackage> {
    let pattern = format!("{}*", path.display());
    for entry in glob(&pattern)? {
        let Ok(candidate) = entry else { continue };
        if let Some(dfn_path) = definition_file_for(&candidate) {
            debug!("found definition file: {}", dfn_path.display());
            let dat_path = find_dat_file(&dfn_path);
            if dat_path.is_none() {
                warn!("no data file located for {}", dfn_path.display());
            }
            return Ok(GdfPackage { dfn_path, dat_path });
        }
    }
    Err(GdfError::PackageNotFound {
        path: path.to_path_buf(),
    })
}

/// Resolve a candidate path to a definition file: either the candidate
/// itself (`.dfn`/`.DFN`) or a sibling with the extension swapped.
fn definition_file_for(candidate: &Path) -> Option<PathBuf> {
    if candidate
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dfn"))
        && candidate.is_file()
    {
        return Some(candidate.to_path_buf());
    }
    for ext in ["DFN", "dfn"] {
        let sibling = candidate.with_extension(ext);
        if sibling.is_file() {
            return Some(sibling);
        }
    }
    None
}

/// Sibling data file for a definition file, if any.
fn find_dat_file(dfn_path: &Path) -> Option<PathBuf> {
    for ext in ["dat", "DAT"] {
        let candidate = dfn_path.with_extension(ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
