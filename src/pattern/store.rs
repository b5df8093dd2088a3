//! Persistence of pattern mappings.
//!
//! The mapping only needs an opaque round trip of `RegionKey -> converter`
//! tables. [`JsonPatternStore`] is the stock implementation: one JSON file
//! per saved sheet, discovered by its suffix.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::TiledPatternConverter;
use crate::errors::PersistError;
use crate::sheet::RegionKey;

/// Converters keyed by region value identity.
pub type PatternTable = HashMap<RegionKey, TiledPatternConverter>;

/// File name suffix of persisted pattern mappings.
pub const PATTERN_FILE_SUFFIX: &str = ".patternInfo.json";

/// Load/save round trip for pattern tables. Implementations must not retry
/// internally; failures go straight back to the caller.
pub trait PatternStore {
    /// Persisted mappings found in `dir`. A directory that does not exist
    /// holds no mappings.
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, PersistError>;

    fn load(&self, path: &Path) -> Result<PatternTable, PersistError>;

    fn save(&self, table: &PatternTable, path: &Path) -> Result<(), PersistError>;
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    region: RegionKey,
    converter: TiledPatternConverter,
}

/// Stores each table as a pretty-printed JSON array, sorted by region name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatternStore;

impl PatternStore for JsonPatternStore {
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, PersistError> {
        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };
        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| PersistError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // Hidden files are skipped, like editor swap files.
            if name.starts_with('.') || !name.ends_with(PATTERN_FILE_SUFFIX) {
                continue;
            }
            if entry.file_type().is_ok_and(|t| t.is_file()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, path: &Path) -> Result<PatternTable, PersistError> {
        let bytes = fs::read(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<StoredEntry> = serde_json::from_slice(&bytes).map_err(|source| PersistError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(entries.into_iter().map(|e| (e.region, e.converter)).collect())
    }

    fn save(&self, table: &PatternTable, path: &Path) -> Result<(), PersistError> {
        let mut entries: Vec<StoredEntry> = table
            .iter()
            .map(|(region, converter)| StoredEntry {
                region: region.clone(),
                converter: converter.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.region.name.cmp(&b.region.name));
        let json = serde_json::to_vec_pretty(&entries).map_err(|source| PersistError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
