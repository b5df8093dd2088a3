//! Pen sources and the samples they stream.
//!
//! A pen source delivers `pen_down`, `sample`, `pen_up` notifications in
//! timestamp order to whatever listeners are attached. [`Pen`] is an
//! in-process source: device drivers (or tests) push messages into it and
//! it fans them out.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::pattern::TileId;
use crate::sync::lock;
use crate::types::Pt;

/// Process-unique identity of a pen device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PenId(u64);

impl PenId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        PenId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pen{}", self.0)
    }
}

/// One position reading in pattern space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenSample {
    pub tile: TileId,
    pub x: f64,
    pub y: f64,
    /// Milliseconds, monotonically increasing per pen
    pub timestamp: u64,
}

impl PenSample {
    pub fn new(tile: TileId, x: f64, y: f64, timestamp: u64) -> Self {
        Self { tile, x, y, timestamp }
    }

    pub fn position(&self) -> Pt {
        Pt::new(self.x, self.y)
    }
}

/// A single notification from a pen stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenMessage {
    Down(PenSample),
    Sample(PenSample),
    Up(PenSample),
}

/// Receives a pen's notifications.
pub trait PenListener: Send + Sync {
    fn pen_down(&self, sample: PenSample);
    fn sample(&self, sample: PenSample);
    fn pen_up(&self, sample: PenSample);
}

/// Anything that streams pen samples to attached listeners.
pub trait PenSource: Send + Sync {
    fn id(&self) -> PenId;

    fn add_listener(&self, listener: Arc<dyn PenListener>);

    /// Detach a listener by identity. Unknown listeners are ignored.
    fn remove_listener(&self, listener: &Arc<dyn PenListener>);

    /// Push one message through to the current listeners.
    fn emit(&self, message: PenMessage);
}

/// In-process pen source.
pub struct Pen {
    id: PenId,
    name: String,
    listeners: Mutex<Vec<Arc<dyn PenListener>>>,
}

impl Pen {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PenId::next(),
            name: name.into(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Whether `listener` (by identity) is attached.
    pub fn has_listener(&self, listener: &Arc<dyn PenListener>) -> bool {
        lock(&self.listeners).iter().any(|l| Arc::ptr_eq(l, listener))
    }

    pub fn down(&self, sample: PenSample) {
        self.emit(PenMessage::Down(sample));
    }

    pub fn sample(&self, sample: PenSample) {
        self.emit(PenMessage::Sample(sample));
    }

    pub fn up(&self, sample: PenSample) {
        self.emit(PenMessage::Up(sample));
    }
}

impl PenSource for Pen {
    fn id(&self) -> PenId {
        self.id
    }

    fn add_listener(&self, listener: Arc<dyn PenListener>) {
        lock(&self.listeners).push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn PenListener>) {
        lock(&self.listeners).retain(|l| !Arc::ptr_eq(l, listener));
    }

    // Listeners run outside the lock so they may re-enter this pen.
    fn emit(&self, message: PenMessage) {
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            match message {
                PenMessage::Down(s) => listener.pen_down(s),
                PenMessage::Sample(s) => listener.sample(s),
                PenMessage::Up(s) => listener.pen_up(s),
            }
        }
    }
}

impl fmt::Debug for Pen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pen")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
