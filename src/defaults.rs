//! Default tunables (pattern distances are in raw pattern-space units)

use crate::types::Units;

/// Maximum drift from the pen-down point for a gesture to still be a click.
pub const CLICK_SLOP: f64 = 5.0;
/// Largest gap between consecutive samples before a stroke counts as sparse.
pub const SPARSE_SAMPLE_DISTANCE: f64 = 75.0;
/// Physical tile size used by the letter-page layout.
pub const LETTER_WIDTH: Units = Units::inches(8.5);
pub const LETTER_HEIGHT: Units = Units::inches(11.0);
/// Pattern-space units per inch of printed dot pattern.
pub const PATTERN_UNITS_PER_INCH: f64 = 80.0;
