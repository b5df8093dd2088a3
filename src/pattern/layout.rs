//! Grid layout of physical pattern tiles over a sheet.
//!
//! Sheets larger than one printed page are covered by a grid of tiles. Each
//! tile has its own pattern coordinate system starting at (0, 0) in its top
//! left corner. A region that crosses a grid line gets one [`TileMapping`]
//! per tile it touches.

use super::{PatternMapping, TileId, TileMapping, TiledPatternConverter};
use crate::defaults;
use crate::errors::MappingError;
use crate::log::debug;
use crate::sheet::Region;
use crate::types::{Pt, Rect, UnitKind, Units};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    tile_width: Units,
    tile_height: Units,
    columns: u32,
    first_tile: TileId,
    pattern_per_inch: f64,
}

impl TileLayout {
    pub fn new(tile_width: Units, tile_height: Units, columns: u32, pattern_per_inch: f64) -> Self {
        Self {
            tile_width,
            tile_height,
            columns: columns.max(1),
            first_tile: TileId(0),
            pattern_per_inch,
        }
    }

    /// Letter pages, `columns` across, at the default pattern density.
    pub fn letter(columns: u32) -> Self {
        Self::new(
            defaults::LETTER_WIDTH,
            defaults::LETTER_HEIGHT,
            columns,
            defaults::PATTERN_UNITS_PER_INCH,
        )
    }

    /// Number tiles starting from `first` instead of zero.
    pub fn with_first_tile(mut self, first: TileId) -> Self {
        self.first_tile = first;
        self
    }

    fn tile_id(&self, column: u32, row: u32) -> Result<TileId, MappingError> {
        row.checked_mul(self.columns)
            .and_then(|n| n.checked_add(column))
            .and_then(|n| n.checked_add(self.first_tile.0))
            .map(TileId)
            .ok_or(MappingError::TileOverflow {
                first: self.first_tile,
                column,
                row,
            })
    }

    /// Build the converter for `region` as it is currently placed and scaled.
    pub fn converter_for(&self, region: &Region) -> Result<TiledPatternConverter, MappingError> {
        let units = region.units();
        let tw = self.tile_width.value_in(units);
        let th = self.tile_height.value_in(units);
        let scale = self.pattern_per_inch * units.inches_per_unit();
        let placed = region.bounds();

        let mut converter = TiledPatternConverter::for_bounds(region.local_bounds());
        if tw <= 0.0 || th <= 0.0 || placed.is_empty() {
            return Ok(converter);
        }

        let first_col = (placed.min.x / tw).floor().max(0.0) as u32;
        let first_row = (placed.min.y / th).floor().max(0.0) as u32;
        let last_col = ((placed.max.x / tw).ceil().max(1.0) as u32 - 1).min(self.columns - 1);
        let last_row = (placed.max.y / th).ceil().max(1.0) as u32 - 1;

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let cell = Rect::from_origin_size(f64::from(col) * tw, f64::from(row) * th, tw, th);
                let Some(overlap) = placed.intersection(&cell) else {
                    continue;
                };
                // Shared edges alone carry no pattern.
                if overlap.width() <= 0.0 || overlap.height() <= 0.0 {
                    continue;
                }
                let origin = Pt::new(
                    (overlap.min.x - cell.min.x) * scale,
                    (overlap.min.y - cell.min.y) * scale,
                );
                let subrect = overlap.translate(-placed.min.x, -placed.min.y);
                converter.push(TileMapping::new(self.tile_id(col, row)?, origin, subrect, scale, scale)?)?;
            }
        }
        Ok(converter)
    }

    /// Bind a converter to every active region in `mapping`, as a pattern
    /// renderer would. Static regions are left untouched. Returns how many
    /// regions were bound.
    pub fn bind(&self, mapping: &PatternMapping) -> Result<usize, MappingError> {
        let mut bound = 0;
        for region in mapping.regions() {
            if !region.is_active() {
                continue;
            }
            let converter = self.converter_for(&region)?;
            debug!(region = region.name(), %converter, "bound pattern");
            mapping.set_converter(&region, converter)?;
            bound += 1;
        }
        Ok(bound)
    }

    pub fn tile_size(&self, units: UnitKind) -> (f64, f64) {
        (self.tile_width.value_in(units), self.tile_height.value_in(units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inch_grid() -> TileLayout {
        // 1 pattern unit per inch keeps the arithmetic readable.
        TileLayout::new(Units::inches(4.0), Units::inches(4.0), 2, 1.0).with_first_tile(TileId(10))
    }

    #[test]
    fn region_inside_one_tile_gets_one_mapping() {
        let region = Region::new("a", 1.0, 1.0, 2.0, 2.0);
        let conv = inch_grid().converter_for(&region).unwrap();
        assert_eq!(conv.tiles().len(), 1);
        assert_eq!(conv.tiles()[0].tile, TileId(10));
        assert_eq!(conv.tiles()[0].origin, Pt::new(1.0, 1.0));
    }

    #[test]
    fn region_straddling_seam_spans_two_tiles() {
        let region = Region::new("wide", 3.0, 1.0, 2.0, 1.0);
        let conv = inch_grid().converter_for(&region).unwrap();
        let tiles: Vec<_> = conv.tiles().iter().map(|m| m.tile).collect();
        assert_eq!(tiles, [TileId(10), TileId(11)]);

        // Local x = 1.5 is sheet x = 4.5: half an inch into the second tile.
        assert_eq!(
            conv.map_logical_to_physical(Pt::new(1.5, 0.5)).unwrap(),
            (TileId(11), Pt::new(0.5, 1.5))
        );
        assert_eq!(
            conv.map_physical_to_logical(TileId(10), Pt::new(3.5, 1.0)),
            Some(Pt::new(0.5, 0.0))
        );
    }

    #[test]
    fn rows_advance_tile_ids_by_column_count() {
        let region = Region::new("tall", 5.0, 3.0, 1.0, 2.0);
        let conv = inch_grid().converter_for(&region).unwrap();
        let tiles: Vec<_> = conv.tiles().iter().map(|m| m.tile).collect();
        assert_eq!(tiles, [TileId(11), TileId(13)]);
    }

    #[test]
    fn tile_ids_past_the_numbering_range_are_an_error() {
        let layout = inch_grid().with_first_tile(TileId(u32::MAX - 1));
        let top = Region::new("top", 1.0, 1.0, 1.0, 1.0);
        assert_eq!(layout.converter_for(&top).unwrap().tiles()[0].tile, TileId(u32::MAX - 1));

        let below = Region::new("below", 1.0, 5.0, 1.0, 1.0);
        assert_eq!(
            layout.converter_for(&below),
            Err(MappingError::TileOverflow {
                first: TileId(u32::MAX - 1),
                column: 0,
                row: 1,
            })
        );
    }

    #[test]
    fn region_on_grid_line_does_not_pick_up_empty_tiles() {
        let region = Region::new("edge", 4.0, 0.0, 2.0, 4.0);
        let conv = inch_grid().converter_for(&region).unwrap();
        let tiles: Vec<_> = conv.tiles().iter().map(|m| m.tile).collect();
        assert_eq!(tiles, [TileId(11)]);
    }

    #[test]
    fn scale_is_applied_before_layout() {
        let region = Region::new("grow", 3.0, 0.0, 0.5, 1.0);
        region.scale_by(4.0, 1.0);
        let conv = inch_grid().converter_for(&region).unwrap();
        assert_eq!(conv.tiles().len(), 2);
        assert_eq!(conv.bounds(), Some(Rect::from_origin_size(0.0, 0.0, 2.0, 1.0)));
    }

    #[test]
    fn letter_layout_uses_pattern_density() {
        let region = Region::new("cell", 0.0, 0.0, 1.0, 1.0);
        let conv = TileLayout::letter(1).converter_for(&region).unwrap();
        let (tile, p) = conv.map_logical_to_physical(Pt::new(1.0, 1.0)).unwrap();
        assert_eq!(tile, TileId(0));
        assert_eq!(p, Pt::new(defaults::PATTERN_UNITS_PER_INCH, defaults::PATTERN_UNITS_PER_INCH));
    }
}
