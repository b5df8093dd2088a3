//! Tiled pattern coordinate converter.
//!
//! A region's pattern may be printed across several physical tiles (a region
//! straddling two letter pages, for instance). The converter keeps an ordered
//! list of tile mappings, each an axis-aligned affine map between a sub-box of
//! the region-local coordinate space and a box in that tile's pattern space.

use std::fmt;

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

use super::TileId;
use crate::errors::MappingError;
use crate::types::{Pt, Rect};

/// One tile's share of a region: `subrect` (region-local) is printed on
/// `tile` with its top-left corner at pattern coordinate `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileMapping {
    pub tile: TileId,
    pub origin: Pt,
    pub subrect: Rect,
    /// Pattern units per logical unit, horizontally and vertically
    pub scale_x: f64,
    pub scale_y: f64,
}

impl TileMapping {
    pub fn new(tile: TileId, origin: Pt, subrect: Rect, scale_x: f64, scale_y: f64) -> Result<Self, MappingError> {
        let valid = |s: f64| s.is_finite() && s > 0.0;
        if !valid(scale_x) || !valid(scale_y) || subrect.is_empty() {
            return Err(MappingError::DegenerateTile { tile });
        }
        Ok(Self {
            tile,
            origin,
            subrect,
            scale_x,
            scale_y,
        })
    }

    fn scale(&self) -> DVec2 {
        dvec2(self.scale_x, self.scale_y)
    }

    /// The box this mapping occupies in the tile's pattern space.
    pub fn physical_bounds(&self) -> Rect {
        let size = DVec2::from(self.subrect.max) - DVec2::from(self.subrect.min);
        let extent = size * self.scale();
        Rect::from_origin_size(self.origin.x, self.origin.y, extent.x, extent.y)
    }

    pub fn to_physical(&self, logical: Pt) -> Pt {
        let offset = DVec2::from(logical) - DVec2::from(self.subrect.min);
        (DVec2::from(self.origin) + offset * self.scale()).into()
    }

    pub fn to_logical(&self, physical: Pt) -> Pt {
        let offset = DVec2::from(physical) - DVec2::from(self.origin);
        (DVec2::from(self.subrect.min) + offset / self.scale()).into()
    }
}

/// Bidirectional map between a region's local box and pattern tiles.
///
/// A default-constructed converter is *unset*: the region has no pattern
/// bound to it yet. Converters are plain values; two with equal bounds and
/// tile lists behave identically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TiledPatternConverter {
    bounds: Option<Rect>,
    tiles: Vec<TileMapping>,
}

impl TiledPatternConverter {
    /// An unset converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter for a region whose local box is `bounds`, with no tiles yet.
    pub fn for_bounds(bounds: Rect) -> Self {
        Self {
            bounds: Some(bounds),
            tiles: Vec::new(),
        }
    }

    /// A region printed whole on a single tile.
    pub fn single_tile(bounds: Rect, tile: TileId, origin: Pt, scale: f64) -> Result<Self, MappingError> {
        Self::for_bounds(bounds).with_tile(TileMapping::new(tile, origin, bounds, scale, scale)?)
    }

    /// Append a tile mapping. Its subrect must lie within the region bounds.
    pub fn with_tile(mut self, mapping: TileMapping) -> Result<Self, MappingError> {
        self.push(mapping)?;
        Ok(self)
    }

    pub fn push(&mut self, mapping: TileMapping) -> Result<(), MappingError> {
        let bounds = *self.bounds.get_or_insert(mapping.subrect);
        if !bounds.contains_bbox(&mapping.subrect) {
            return Err(MappingError::OutsideRegion {
                x: mapping.subrect.min.x,
                y: mapping.subrect.min.y,
            });
        }
        self.tiles.push(mapping);
        Ok(())
    }

    pub fn tiles(&self) -> &[TileMapping] {
        &self.tiles
    }

    /// Region-local box this converter was built for, if any.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn is_unset(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Where inside the region a pattern sample on `tile` falls, or `None`
    /// when it is outside every box this converter printed on that tile.
    pub fn map_physical_to_logical(&self, tile: TileId, physical: Pt) -> Option<Pt> {
        self.tiles
            .iter()
            .find(|m| m.tile == tile && m.physical_bounds().contains_point(physical))
            .map(|m| m.to_logical(physical))
    }

    /// The tile and pattern coordinate a region-local point was printed at.
    ///
    /// Points outside the region bounds are a caller error. Points on a seam
    /// shared by several tiles resolve to the lowest tile id.
    pub fn map_logical_to_physical(&self, logical: Pt) -> Result<(TileId, Pt), MappingError> {
        let Some(bounds) = self.bounds else {
            return Err(MappingError::NoTile {
                x: logical.x,
                y: logical.y,
            });
        };
        if !bounds.contains_point(logical) {
            return Err(MappingError::OutsideRegion {
                x: logical.x,
                y: logical.y,
            });
        }
        self.tiles
            .iter()
            .filter(|m| m.subrect.contains_point(logical))
            .min_by_key(|m| m.tile)
            .map(|m| (m.tile, m.to_physical(logical)))
            .ok_or(MappingError::NoTile {
                x: logical.x,
                y: logical.y,
            })
    }
}

impl fmt::Display for TiledPatternConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return write!(f, "unset");
        }
        for (i, m) in self.tiles.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let p = m.physical_bounds();
            write!(
                f,
                "{} [{}, {}]..[{}, {}]",
                m.tile, p.min.x, p.min.y, p.max.x, p.max.y
            )?;
        }
        Ok(())
    }
}
