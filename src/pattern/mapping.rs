//! Pattern-to-sheet mapping.
//!
//! One [`PatternMapping`] per sheet binds every region on that sheet to a
//! [`TiledPatternConverter`]. The mapping works both ways: given a location
//! on the sheet it finds the pattern coordinate, and given a pattern sample
//! it finds the region and the location inside it.
//!
//! Runtime lookups key on region identity. Persistence keys on
//! [`RegionKey`], so a mapping saved by one run can be loaded against freshly
//! constructed regions in the next.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, RwLock};

use super::{PatternStore, PatternTable, TileId, TiledPatternConverter};
use crate::errors::{MappingError, PersistError};
use crate::log::{debug, info, warn};
use crate::sheet::{Region, Sheet};
use crate::sync::{read, write};
use crate::types::Pt;

#[derive(Debug, Clone)]
struct Entry {
    region: Arc<Region>,
    converter: TiledPatternConverter,
}

/// A pattern sample resolved to a region.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub region: Arc<Region>,
    /// Location inside the region, in region-local coordinates
    pub local: Pt,
}

#[derive(Debug)]
pub struct PatternMapping {
    sheet: Arc<Sheet>,
    entries: RwLock<Vec<Entry>>,
}

impl PatternMapping {
    /// Create a mapping with an unset converter for every region currently
    /// on `sheet`. Nothing is loaded from disk.
    pub fn new(sheet: Arc<Sheet>) -> Self {
        let entries = sheet
            .regions()
            .into_iter()
            .map(|region| Entry {
                region,
                converter: TiledPatternConverter::new(),
            })
            .collect();
        Self {
            sheet,
            entries: RwLock::new(entries),
        }
    }

    /// Create a mapping, then merge every persisted mapping `store` finds
    /// under the sheet's configuration paths.
    ///
    /// Missing or unreadable files are logged and skipped: a region without
    /// a persisted mapping simply stays unset.
    pub fn with_store(sheet: Arc<Sheet>, store: &impl PatternStore) -> Self {
        let mapping = Self::new(sheet);
        for dir in mapping.sheet.configuration_paths() {
            let files = match store.discover(&dir) {
                Ok(files) => files,
                Err(_err) => {
                    warn!(dir = %dir.display(), error = %_err, "skipping configuration path");
                    continue;
                }
            };
            for file in files {
                if let Err(_err) = mapping.load(store, &file) {
                    warn!(file = %file.display(), error = %_err, "skipping pattern mapping");
                }
            }
        }
        mapping
    }

    pub fn sheet(&self) -> &Arc<Sheet> {
        &self.sheet
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }

    /// Regions with an entry, in entry order
    pub fn regions(&self) -> Vec<Arc<Region>> {
        read(&self.entries).iter().map(|e| Arc::clone(&e.region)).collect()
    }

    /// The converter bound to `region`: `None` if the region has no entry,
    /// otherwise a converter that may still be unset.
    pub fn converter(&self, region: &Region) -> Option<TiledPatternConverter> {
        read(&self.entries)
            .iter()
            .find(|e| e.region.id() == region.id())
            .map(|e| e.converter.clone())
    }

    /// Bind `converter` to `region`.
    ///
    /// Succeeds for regions that already have an entry and for regions added
    /// to the sheet after this mapping was created. Anything else is an
    /// unknown region and leaves the mapping untouched.
    pub fn set_converter(&self, region: &Arc<Region>, converter: TiledPatternConverter) -> Result<(), MappingError> {
        let mut entries = write(&self.entries);
        if let Some(entry) = entries.iter_mut().find(|e| e.region.id() == region.id()) {
            entry.converter = converter;
            return Ok(());
        }
        if self.sheet.contains_region(region) {
            entries.push(Entry {
                region: Arc::clone(region),
                converter,
            });
            return Ok(());
        }
        warn!(region = region.name(), "region unknown; add it to the sheet before updating this mapping");
        Err(MappingError::UnknownRegion {
            name: region.name().to_string(),
        })
    }

    /// Drop entries whose region has been removed from the sheet.
    /// Returns how many were pruned.
    pub fn prune_removed_regions(&self) -> usize {
        let mut entries = write(&self.entries);
        let before = entries.len();
        entries.retain(|e| self.sheet.contains_region(&e.region));
        before - entries.len()
    }

    /// Which region a pattern sample on `tile` falls in, and where.
    ///
    /// Regions are tried in entry order and the first hit wins. `None` means
    /// the sample is outside every region on this sheet.
    pub fn resolve(&self, tile: TileId, physical: Pt) -> Option<Resolved> {
        read(&self.entries).iter().find_map(|e| {
            let local = e.converter.map_physical_to_logical(tile, physical)?;
            e.region.contains_local(local).then(|| Resolved {
                region: Arc::clone(&e.region),
                local,
            })
        })
    }

    /// Where a region-local point of `region` was printed.
    pub fn locate(&self, region: &Region, local: Pt) -> Result<(TileId, Pt), MappingError> {
        let converter = self.converter(region).ok_or_else(|| MappingError::UnknownRegion {
            name: region.name().to_string(),
        })?;
        converter.map_logical_to_physical(local)
    }

    /// Converters of the active regions, keyed by value identity.
    /// Static regions have no pattern and are never persisted.
    pub fn active_table(&self) -> PatternTable {
        read(&self.entries)
            .iter()
            .filter(|e| e.region.is_active())
            .map(|e| (e.region.key(), e.converter.clone()))
            .collect()
    }

    /// Overwrite the converter of every region whose key appears in `table`.
    /// Regions without a hit keep what they had. Returns the number of hits.
    pub fn merge(&self, table: &PatternTable) -> usize {
        let mut entries = write(&self.entries);
        let mut hits = 0;
        for entry in entries.iter_mut() {
            if let Some(converter) = table.get(&entry.region.key()) {
                debug!(region = entry.region.name(), "loaded pattern mapping");
                entry.converter = converter.clone();
                hits += 1;
            }
        }
        hits
    }

    /// Persist the active regions' converters to `path`.
    pub fn save(&self, store: &impl PatternStore, path: &Path) -> Result<usize, PersistError> {
        let table = self.active_table();
        store.save(&table, path)?;
        info!(path = %path.display(), regions = table.len(), "saved pattern mapping");
        Ok(table.len())
    }

    /// Selectively merge the mapping stored at `path`. On failure the
    /// mapping is left exactly as it was.
    pub fn load(&self, store: &impl PatternStore, path: &Path) -> Result<usize, PersistError> {
        let table = store.load(path)?;
        let hits = self.merge(&table);
        info!(path = %path.display(), hits, "loaded pattern mapping");
        Ok(hits)
    }

    /// One `name --> converter` line per entry.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for e in read(&self.entries).iter() {
            let _ = writeln!(out, "{} --> {}", e.region.name(), e.converter);
        }
        out
    }

    /// Snapshot of every entry keyed by region name; later duplicates win.
    pub fn by_name(&self) -> HashMap<String, TiledPatternConverter> {
        read(&self.entries)
            .iter()
            .map(|e| (e.region.name().to_string(), e.converter.clone()))
            .collect()
    }
}
