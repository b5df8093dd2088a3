//! Strongly-typed physical lengths and plain 2D geometry.
//!
//! Physical sizes travel as [`Units`]: a value tagged with its [`UnitKind`].
//! Conversions only go through the fixed factor table in [`UnitKind::inches_per_unit`].
//! Coordinates inside a space (pattern space, region-local space) are raw `f64`
//! wrapped in [`Point`] and [`BBox`].

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing two [`Units`], measured in inches.
pub const UNIT_EPSILON: f64 = 1e-9;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
pub(crate) fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Reject NaN, infinities, zero and negative values.
pub(crate) fn check_positive(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Physical unit a [`Units`] value is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Inches,
    Feet,
    Centimeters,
    Millimeters,
    Points,
    Picas,
}

impl UnitKind {
    /// How many inches one of this unit spans.
    pub const fn inches_per_unit(self) -> f64 {
        match self {
            UnitKind::Inches => 1.0,
            UnitKind::Feet => 12.0,
            UnitKind::Centimeters => 1.0 / 2.54,
            UnitKind::Millimeters => 1.0 / 25.4,
            UnitKind::Points => 1.0 / 72.0,
            UnitKind::Picas => 1.0 / 6.0,
        }
    }

    /// Short suffix used by `Display`.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            UnitKind::Inches => "in",
            UnitKind::Feet => "ft",
            UnitKind::Centimeters => "cm",
            UnitKind::Millimeters => "mm",
            UnitKind::Points => "pt",
            UnitKind::Picas => "pc",
        }
    }
}

/// An immutable physical length: a value plus the unit it is expressed in.
///
/// Equality requires the same [`UnitKind`] and values within [`UNIT_EPSILON`].
/// Use [`Units::approx_eq`] to compare lengths across kinds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Units {
    value: f64,
    kind: UnitKind,
}

impl Units {
    /// Create a length (const-friendly, unchecked).
    /// Use `try_new` for user-provided values.
    #[inline]
    pub const fn new(value: f64, kind: UnitKind) -> Self {
        Units { value, kind }
    }

    /// Create a length with validation (rejects NaN/infinite)
    pub fn try_new(value: f64, kind: UnitKind) -> Result<Self, NumericError> {
        Ok(Units::new(check_finite(value)?, kind))
    }

    #[inline]
    pub const fn inches(value: f64) -> Self {
        Units::new(value, UnitKind::Inches)
    }

    #[inline]
    pub const fn points(value: f64) -> Self {
        Units::new(value, UnitKind::Points)
    }

    #[inline]
    pub const fn centimeters(value: f64) -> Self {
        Units::new(value, UnitKind::Centimeters)
    }

    #[inline]
    pub const fn millimeters(value: f64) -> Self {
        Units::new(value, UnitKind::Millimeters)
    }

    /// Get the raw value in this length's own unit
    #[inline]
    pub fn value(self) -> f64 {
        self.value
    }

    #[inline]
    pub fn kind(self) -> UnitKind {
        self.kind
    }

    /// The numeric value this length has when expressed in `kind`.
    pub fn value_in(self, kind: UnitKind) -> f64 {
        if kind == self.kind {
            return self.value;
        }
        self.value * self.kind.inches_per_unit() / kind.inches_per_unit()
    }

    /// Convert to another unit kind.
    pub fn to(self, kind: UnitKind) -> Units {
        Units::new(self.value_in(kind), kind)
    }

    /// A length of the same kind carrying a different value.
    pub fn with_value(self, value: f64) -> Units {
        Units::new(value, self.kind)
    }

    /// Compare physical size regardless of unit kind.
    pub fn approx_eq(self, other: Units) -> bool {
        (self.value_in(UnitKind::Inches) - other.value_in(UnitKind::Inches)).abs() <= UNIT_EPSILON
    }
}

impl PartialEq for Units {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && (self.value - other.value).abs() * self.kind.inches_per_unit() <= UNIT_EPSILON
    }
}

/// The right-hand side is converted into the left-hand side's unit.
impl Add for Units {
    type Output = Units;
    fn add(self, rhs: Units) -> Units {
        self.with_value(self.value + rhs.value_in(self.kind))
    }
}

impl Sub for Units {
    type Output = Units;
    fn sub(self, rhs: Units) -> Units {
        self.with_value(self.value - rhs.value_in(self.kind))
    }
}

impl Mul<f64> for Units {
    type Output = Units;
    fn mul(self, rhs: f64) -> Units {
        self.with_value(self.value * rhs)
    }
}

impl Div<f64> for Units {
    type Output = Units;
    fn div(self, rhs: f64) -> Units {
        self.with_value(self.value / rhs)
    }
}

impl Neg for Units {
    type Output = Units;
    fn neg(self) -> Units {
        self.with_value(-self.value)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.kind.abbreviation())
    }
}

/// Generic 2D point
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub const fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

impl Point<f64> {
    /// Euclidean distance to another point
    pub fn distance(self, other: Self) -> f64 {
        DVec2::from(self).distance(other.into())
    }

    /// True when both coordinates are within `eps` of `other`'s.
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl From<Point<f64>> for DVec2 {
    fn from(p: Point<f64>) -> DVec2 {
        dvec2(p.x, p.y)
    }
}

impl From<DVec2> for Point<f64> {
    fn from(v: DVec2) -> Point<f64> {
        Point::new(v.x, v.y)
    }
}

impl fmt::Display for Point<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Size<T> {
    pub w: T,
    pub h: T,
}

impl<T> Size<T> {
    pub const fn new(w: T, h: T) -> Self {
        Size { w, h }
    }
}

/// Axis-aligned bounding box.
///
/// `contains_point`, `contains_bbox` and `intersects` treat the box as closed:
/// points on an edge are inside, and boxes that share an edge intersect.
/// `overlaps` and `encloses` are the open variants and ignore boxes without
/// area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox<T> {
    pub min: Point<T>,
    pub max: Point<T>,
}

impl Default for BBox<f64> {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox<f64> {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: Point::new(f64::MAX, f64::MAX),
            max: Point::new(f64::MIN, f64::MIN),
        }
    }

    /// Box from its top-left corner and size. Negative sizes are normalized.
    pub fn from_origin_size(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + w, y + h))
    }

    /// Box spanning two arbitrary corners.
    pub fn from_corners(a: Point<f64>, b: Point<f64>) -> Self {
        BBox {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Point<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest box containing both boxes. Empty boxes contribute nothing.
    pub fn union(&self, other: &BBox<f64>) -> BBox<f64> {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.expand_point(other.min);
        out.expand_point(other.max);
        out
    }

    /// Grow each side by `dx` horizontally and `dy` vertically.
    pub fn inflate(&self, dx: f64, dy: f64) -> BBox<f64> {
        BBox {
            min: Point::new(self.min.x - dx, self.min.y - dy),
            max: Point::new(self.max.x + dx, self.max.y + dy),
        }
    }

    /// Grow by a fraction of the box's own size, split evenly on both sides.
    /// A margin of 1.0 doubles width and height.
    pub fn expand_by_fraction(&self, margin: f64) -> BBox<f64> {
        self.inflate(self.width() * margin / 2.0, self.height() * margin / 2.0)
    }

    /// Square window of half-width `range` centered on `p`.
    pub fn around(p: Point<f64>, range: f64) -> BBox<f64> {
        Self::from_origin_size(p.x - range, p.y - range, range * 2.0, range * 2.0)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Size<f64> {
        Size::new(self.width(), self.height())
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// Get the center point
    pub fn center(&self) -> Point<f64> {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains_point(&self, p: Point<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when `other` lies entirely within this box.
    pub fn contains_bbox(&self, other: &BBox<f64>) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    pub fn intersects(&self, other: &BBox<f64>) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// True when the box has positive width and height.
    pub fn has_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Interior overlap: boxes that only share an edge do not overlap, and a
    /// box without area overlaps nothing.
    pub fn overlaps(&self, other: &BBox<f64>) -> bool {
        self.has_area()
            && other.has_area()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Like [`BBox::contains_bbox`], but a box without area is never enclosed
    /// and never encloses anything.
    pub fn encloses(&self, other: &BBox<f64>) -> bool {
        self.has_area() && other.has_area() && self.contains_bbox(other)
    }

    /// Overlap of two boxes, if they share any area or edge.
    pub fn intersection(&self, other: &BBox<f64>) -> Option<BBox<f64>> {
        if !self.intersects(other) {
            return None;
        }
        Some(BBox {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    pub fn translate(&self, dx: f64, dy: f64) -> BBox<f64> {
        BBox {
            min: Point::new(self.min.x + dx, self.min.y + dy),
            max: Point::new(self.max.x + dx, self.max.y + dy),
        }
    }
}

/// Convenient aliases
pub type Pt = Point<f64>;
pub type Rect = BBox<f64>;
