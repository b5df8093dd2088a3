//! Error types with diagnostic codes using miette
//!
//! Nothing here is fatal. Unknown regions and pens leave state untouched,
//! and persistence failures leave the in-memory mapping as it was.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::pen::PenId;
use crate::pattern::TileId;

// ============================================================================
// Mapping Errors
// ============================================================================

/// Errors from the pattern/sheet mapping and its converters
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("unknown region: {name}")]
    #[diagnostic(
        code(paperkit::mapping::unknown_region),
        help("add the region to the sheet before updating its mapping")
    )]
    UnknownRegion { name: String },

    #[error("logical point ({x}, {y}) lies outside the region")]
    #[diagnostic(code(paperkit::mapping::outside_region))]
    OutsideRegion { x: f64, y: f64 },

    #[error("no pattern tile covers logical point ({x}, {y})")]
    #[diagnostic(
        code(paperkit::mapping::no_tile),
        help("the region has no pattern bound to it yet; render it or load its mapping")
    )]
    NoTile { x: f64, y: f64 },

    #[error("tile {tile} has a degenerate pattern scale")]
    #[diagnostic(code(paperkit::mapping::degenerate_tile))]
    DegenerateTile { tile: TileId },

    #[error("tile id overflows at column {column}, row {row} when numbering from {first}")]
    #[diagnostic(
        code(paperkit::mapping::tile_overflow),
        help("start the layout's tile numbering lower")
    )]
    TileOverflow { first: TileId, column: u32, row: u32 },
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Errors from pen registration
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("pen {pen} is not registered")]
    #[diagnostic(code(paperkit::engine::unknown_pen))]
    UnknownPen { pen: PenId },
}

// ============================================================================
// Persistence Errors
// ============================================================================

/// Errors surfaced by a pattern store while loading or saving
#[derive(Error, Diagnostic, Debug)]
pub enum PersistError {
    #[error("failed to access {}", path.display())]
    #[diagnostic(code(paperkit::persist::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed pattern mapping in {}", path.display())]
    #[diagnostic(code(paperkit::persist::format))]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
