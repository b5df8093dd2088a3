//! Pattern space: converters between region-local coordinates and printed
//! dot-pattern tiles, and the per-sheet mapping that owns them.

use std::fmt;

use serde::{Deserialize, Serialize};

mod converter;
mod layout;
mod mapping;
mod store;

pub use converter::{TileMapping, TiledPatternConverter};
pub use layout::TileLayout;
pub use mapping::{PatternMapping, Resolved};
pub use store::{JsonPatternStore, PATTERN_FILE_SUFFIX, PatternStore, PatternTable};

/// Address of one physically printed unit of pattern (e.g. one page).
///
/// Ordering matters: when a logical point sits on the seam between two
/// tiles, the lower id wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
