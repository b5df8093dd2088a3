//! Captured ink: strokes and named collections of them.
//!
//! Strokes are immutable once built. Their bounds are computed up front since
//! every geometry query in [`geometry`] starts from them.

pub mod geometry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::InkConfig;
use crate::types::{Pt, Rect};

pub use geometry::{
    cluster_strokes, find_all_strokes_contained_within, find_all_strokes_outside,
    find_all_strokes_partly_outside, find_ink_near_point, find_stroke_with_largest_area,
};

/// Identity of a stroke. Clones of a stroke share it; two strokes built from
/// the same samples do not. Ids are process-local and never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(u64);

impl StrokeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        StrokeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: u64,
}

impl InkSample {
    pub fn new(x: f64, y: f64, timestamp: u64) -> Self {
        Self { x, y, timestamp }
    }

    pub fn position(&self) -> Pt {
        Pt::new(self.x, self.y)
    }
}

/// How a stroke should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHint {
    /// Samples are dense enough to connect with straight segments
    Polyline,
    /// Samples are far apart; smooth them with a spline
    Spline,
}

/// One pen-down to pen-up run of samples, in timestamp order.
///
/// Only the samples are serialized. A deserialized stroke is a new stroke:
/// it gets a fresh id and its bounds are recomputed from the samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredStroke", into = "StoredStroke")]
pub struct InkStroke {
    id: StrokeId,
    samples: Vec<InkSample>,
    bounds: Rect,
}

impl InkStroke {
    pub fn new(samples: Vec<InkSample>) -> Self {
        let mut bounds = Rect::new();
        for s in &samples {
            bounds.expand_point(s.position());
        }
        Self {
            id: StrokeId::next(),
            samples,
            bounds,
        }
    }

    /// A stroke through `points`, one millisecond apart.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self::new(
            points
                .iter()
                .zip(0u64..)
                .map(|(&(x, y), t)| InkSample::new(x, y, t))
                .collect(),
        )
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn samples(&self) -> &[InkSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Bounding box of the samples; empty for a stroke without samples.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Area of the bounding box
    pub fn area(&self) -> f64 {
        self.bounds.area()
    }

    /// Milliseconds from first to last sample
    pub fn duration(&self) -> u64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp),
            _ => 0,
        }
    }

    /// Largest gap between consecutive samples.
    pub fn max_distance_between_samples(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| w[0].position().distance(w[1].position()))
            .fold(0.0, f64::max)
    }

    pub fn render_hint(&self, config: &InkConfig) -> RenderHint {
        if self.max_distance_between_samples() > config.sparse_sample_distance {
            RenderHint::Spline
        } else {
            RenderHint::Polyline
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredStroke {
    samples: Vec<InkSample>,
}

impl From<StoredStroke> for InkStroke {
    fn from(stored: StoredStroke) -> Self {
        InkStroke::new(stored.samples)
    }
}

impl From<InkStroke> for StoredStroke {
    fn from(stroke: InkStroke) -> Self {
        StoredStroke {
            samples: stroke.samples,
        }
    }
}

/// Strokes are equal when they are the same stroke, not when they look alike.
impl PartialEq for InkStroke {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InkStroke {}

/// A named, growable collection of strokes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ink {
    name: String,
    strokes: Vec<InkStroke>,
}

impl Ink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strokes: Vec::new(),
        }
    }

    pub fn with_strokes(name: impl Into<String>, strokes: Vec<InkStroke>) -> Self {
        Self {
            name: name.into(),
            strokes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn add_stroke(&mut self, stroke: InkStroke) {
        self.strokes.push(stroke);
    }

    pub fn strokes(&self) -> &[InkStroke] {
        &self.strokes
    }

    pub fn num_strokes(&self) -> usize {
        self.strokes.len()
    }

    /// Union of the strokes' bounds
    pub fn bounds(&self) -> Rect {
        self.strokes
            .iter()
            .fold(Rect::new(), |acc, s| acc.union(&s.bounds()))
    }

    pub fn contains_stroke(&self, stroke: &InkStroke) -> bool {
        self.strokes.iter().any(|s| s == stroke)
    }
}

impl fmt::Display for Ink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ink '{}' ({} strokes)", self.name, self.strokes.len())
    }
}
