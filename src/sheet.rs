//! Sheets and the regions authored on them.
//!
//! A [`Region`] is a closed outline interpreted in a reference unit. Scale
//! factors are stored next to the outline and only applied when bounds are
//! read, so repeated scaling never degrades the stored geometry.
//!
//! Regions are shared as `Arc<Region>`: the sheet owns them, the pattern
//! mapping and the event engine hold references. Runtime identity is the
//! [`RegionId`]; identity across save/load cycles is the value-typed
//! [`RegionKey`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::events::{ContentFilter, EventHandler};
use crate::sync::{lock, read, write};
use crate::types::{Pt, Rect, UnitKind, Units};

/// Process-unique identity of a live region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

impl RegionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        RegionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

// ============================================================================
// Outlines
// ============================================================================

/// Common behavior for region outlines, in the region's own (unscaled) units.
#[enum_dispatch]
pub trait Outline {
    /// Unscaled bounding box
    fn bounds(&self) -> Rect;

    /// Whether `p` lies inside the closed outline
    fn contains(&self, p: Pt) -> bool;

    /// Short name used by `Display`
    fn kind(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectOutline {
    rect: Rect,
}

impl RectOutline {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Outline for RectOutline {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn contains(&self, p: Pt) -> bool {
        self.rect.contains_point(p)
    }

    fn kind(&self) -> &'static str {
        "Rectangle"
    }
}

/// Polygon outline. Open vertex lists are treated as closed.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonOutline {
    vertices: Vec<Pt>,
    bounds: Rect,
}

impl PolygonOutline {
    pub fn new(vertices: Vec<Pt>) -> Self {
        let mut bounds = Rect::new();
        for v in &vertices {
            bounds.expand_point(*v);
        }
        Self { vertices, bounds }
    }

    pub fn vertices(&self) -> &[Pt] {
        &self.vertices
    }
}

impl Outline for PolygonOutline {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    // Even-odd ray cast; the bounding box check keeps far samples cheap.
    fn contains(&self, p: Pt) -> bool {
        if !self.bounds.contains_point(p) || self.vertices.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = self.vertices.len() - 1;
        for i in 0..self.vertices.len() {
            let (a, b) = (self.vertices[i], self.vertices[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn kind(&self) -> &'static str {
        "Polygon"
    }
}

#[enum_dispatch(Outline)]
#[derive(Debug, Clone, PartialEq)]
pub enum RegionShape {
    Rectangle(RectOutline),
    Polygon(PolygonOutline),
}

// ============================================================================
// Regions
// ============================================================================

struct RegionState {
    scale_x: f64,
    scale_y: f64,
    active: bool,
    visible: bool,
    handlers: Vec<Arc<dyn EventHandler>>,
    filters: Vec<Arc<dyn ContentFilter>>,
}

/// A named, closed area of a sheet.
///
/// Regions start STATIC. Attaching an event handler or a content filter makes
/// them ACTIVE, which means pattern gets rendered over them and their
/// pattern mapping gets persisted. Nothing ever clears the flag implicitly.
pub struct Region {
    id: RegionId,
    name: String,
    outline: RegionShape,
    units: UnitKind,
    state: Mutex<RegionState>,
}

impl Region {
    /// Rectangular region measured in inches.
    pub fn new(name: impl Into<String>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::from_outline(
            name,
            RectOutline::new(Rect::from_origin_size(x, y, w, h)),
            UnitKind::Inches,
        )
    }

    /// Rectangular region; everything is converted into `x`'s unit.
    pub fn with_units(name: impl Into<String>, x: Units, y: Units, w: Units, h: Units) -> Self {
        let kind = x.kind();
        let rect = Rect::from_origin_size(x.value(), y.value_in(kind), w.value_in(kind), h.value_in(kind));
        Self::from_outline(name, RectOutline::new(rect), kind)
    }

    pub fn from_outline(name: impl Into<String>, outline: impl Into<RegionShape>, units: UnitKind) -> Self {
        Self {
            id: RegionId::next(),
            name: name.into(),
            outline: outline.into(),
            units,
            state: Mutex::new(RegionState {
                scale_x: 1.0,
                scale_y: 1.0,
                active: false,
                visible: true,
                handlers: Vec::new(),
                filters: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit the outline's numbers are interpreted in
    pub fn units(&self) -> UnitKind {
        self.units
    }

    pub fn outline(&self) -> &RegionShape {
        &self.outline
    }

    /// Current (horizontal, vertical) scale factors
    pub fn scale(&self) -> (f64, f64) {
        let state = lock(&self.state);
        (state.scale_x, state.scale_y)
    }

    /// Multiply the current scale factors.
    pub fn scale_by(&self, sx: f64, sy: f64) {
        let mut state = lock(&self.state);
        state.scale_x *= sx;
        state.scale_y *= sy;
    }

    pub fn scale_uniformly(&self, s: f64) {
        self.scale_by(s, s);
    }

    /// Replace the scale factors.
    pub fn set_scale(&self, sx: f64, sy: f64) {
        let mut state = lock(&self.state);
        state.scale_x = sx;
        state.scale_y = sy;
    }

    pub fn reset_scale(&self) {
        self.set_scale(1.0, 1.0);
    }

    pub fn unscaled_bounds(&self) -> Rect {
        self.outline.bounds()
    }

    /// Bounds with the scale applied. The origin stays put; the size grows.
    pub fn bounds(&self) -> Rect {
        let b = self.outline.bounds();
        let (sx, sy) = self.scale();
        Rect::from_origin_size(b.min.x, b.min.y, b.width() * sx, b.height() * sy)
    }

    /// Region-local coordinate box: origin at (0, 0), scaled size.
    pub fn local_bounds(&self) -> Rect {
        let b = self.bounds();
        Rect::from_origin_size(0.0, 0.0, b.width(), b.height())
    }

    pub fn origin_x(&self) -> Units {
        Units::new(self.outline.bounds().min.x, self.units)
    }

    pub fn origin_y(&self) -> Units {
        Units::new(self.outline.bounds().min.y, self.units)
    }

    pub fn width(&self) -> Units {
        Units::new(self.bounds().width(), self.units)
    }

    pub fn height(&self) -> Units {
        Units::new(self.bounds().height(), self.units)
    }

    /// Whether a region-local point falls inside the scaled outline.
    pub fn contains_local(&self, p: Pt) -> bool {
        let (sx, sy) = self.scale();
        if sx == 0.0 || sy == 0.0 || !self.local_bounds().contains_point(p) {
            return false;
        }
        let origin = self.outline.bounds().min;
        self.outline.contains(Pt::new(origin.x + p.x / sx, origin.y + p.y / sy))
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    pub fn set_active(&self, active: bool) {
        lock(&self.state).active = active;
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    pub fn set_visible(&self, visible: bool) {
        lock(&self.state).visible = visible;
    }

    /// Attach a handler and mark the region active.
    pub fn add_event_handler(&self, handler: Arc<dyn EventHandler>) {
        let mut state = lock(&self.state);
        state.handlers.push(handler);
        state.active = true;
    }

    /// Attach a content filter and mark the region active.
    pub fn add_content_filter(&self, filter: Arc<dyn ContentFilter>) {
        let mut state = lock(&self.state);
        state.filters.push(filter);
        state.active = true;
    }

    pub fn event_handlers(&self) -> Vec<Arc<dyn EventHandler>> {
        lock(&self.state).handlers.clone()
    }

    pub fn content_filters(&self) -> Vec<Arc<dyn ContentFilter>> {
        lock(&self.state).filters.clone()
    }

    /// Identity that survives a save/load cycle.
    pub fn key(&self) -> RegionKey {
        RegionKey {
            name: self.name.clone(),
            origin_x: self.origin_x(),
            origin_y: self.origin_y(),
            width: self.width(),
            height: self.height(),
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Region")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("outline", &self.outline)
            .field("units", &self.units)
            .field("scale", &(state.scale_x, state.scale_y))
            .field("active", &state.active)
            .field("handlers", &state.handlers.len())
            .field("filters", &state.filters.len())
            .finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bounds();
        write!(
            f,
            "{} '{}': {{{} {} {} {}}} in {} [{}]",
            self.outline.kind(),
            self.name,
            b.min.x,
            b.min.y,
            b.width(),
            b.height(),
            self.units.abbreviation(),
            if self.is_active() { "ACTIVE" } else { "STATIC" }
        )
    }
}

/// Value identity of a region: name, origin, and scaled size.
///
/// Two regions with equal keys are the same region as far as persisted
/// pattern mappings are concerned. Hashing covers the name only, so keys
/// that compare equal within the unit tolerance always hash alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionKey {
    pub name: String,
    pub origin_x: Units,
    pub origin_y: Units,
    pub width: Units,
    pub height: Units,
}

impl PartialEq for RegionKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.origin_x == other.origin_x
            && self.origin_y == other.origin_y
            && self.width == other.width
            && self.height == other.height
    }
}

impl Eq for RegionKey {}

impl Hash for RegionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

// ============================================================================
// Sheets
// ============================================================================

/// An ordered collection of regions plus the directories searched for
/// persisted pattern mappings.
#[derive(Debug)]
pub struct Sheet {
    width: Units,
    height: Units,
    regions: RwLock<Vec<Arc<Region>>>,
    configuration_paths: RwLock<Vec<PathBuf>>,
}

impl Sheet {
    /// Sheet measured in inches.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_size(Units::inches(width), Units::inches(height))
    }

    pub fn with_size(width: Units, height: Units) -> Self {
        Self {
            width,
            height,
            regions: RwLock::new(Vec::new()),
            configuration_paths: RwLock::new(Vec::new()),
        }
    }

    pub fn letter() -> Self {
        Self::with_size(crate::defaults::LETTER_WIDTH, crate::defaults::LETTER_HEIGHT)
    }

    pub fn width(&self) -> Units {
        self.width
    }

    pub fn height(&self) -> Units {
        self.height
    }

    /// Take ownership of a region and append it.
    pub fn add_region(&self, region: Region) -> Arc<Region> {
        let region = Arc::new(region);
        write(&self.regions).push(Arc::clone(&region));
        region
    }

    /// Returns whether the region was on this sheet.
    pub fn remove_region(&self, region: &Region) -> bool {
        let mut regions = write(&self.regions);
        let before = regions.len();
        regions.retain(|r| r.id() != region.id());
        regions.len() != before
    }

    pub fn contains_region(&self, region: &Region) -> bool {
        read(&self.regions).iter().any(|r| r.id() == region.id())
    }

    /// Snapshot of the regions in authoring order
    pub fn regions(&self) -> Vec<Arc<Region>> {
        read(&self.regions).clone()
    }

    pub fn region_named(&self, name: &str) -> Option<Arc<Region>> {
        read(&self.regions).iter().find(|r| r.name() == name).cloned()
    }

    pub fn add_configuration_path(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut paths = write(&self.configuration_paths);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    pub fn configuration_paths(&self) -> Vec<PathBuf> {
        read(&self.configuration_paths).clone()
    }
}
