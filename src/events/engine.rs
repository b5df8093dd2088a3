//! Pen registration and event production.
//!
//! Every registered pen has exactly one engine listener attached and a
//! registration count. Registration transitions (detach the old listener,
//! attach a fresh one, update the count) run under one registry lock so they
//! appear atomic to concurrent callers. Sample processing never takes the
//! registry lock: each listener reduces its own pen's stream behind its own
//! tracker lock, so pens run independently.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use super::{GestureTracker, PenEvent, dispatch};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::log::{debug, warn};
use crate::pattern::{PatternMapping, Resolved, TileId};
use crate::pen::{PenId, PenListener, PenMessage, PenSample, PenSource};
use crate::sync::{lock, read, write};
use crate::types::Pt;

/// State shared by the engine and all of its listeners.
#[derive(Debug)]
struct Shared {
    config: EngineConfig,
    mappings: RwLock<Vec<Arc<PatternMapping>>>,
}

impl Shared {
    /// First mapping, in the order they were added, that places the sample
    /// in one of its regions.
    fn resolve(&self, tile: TileId, physical: Pt) -> Option<Resolved> {
        read(&self.mappings).iter().find_map(|m| m.resolve(tile, physical))
    }
}

struct EngineListener {
    shared: Arc<Shared>,
    tracker: Mutex<GestureTracker>,
}

impl EngineListener {
    fn new(pen: PenId, shared: Arc<Shared>) -> Self {
        let tracker = Mutex::new(GestureTracker::new(pen, shared.config));
        Self { shared, tracker }
    }

    // Events are dispatched after the tracker lock is released, so handlers
    // may feed the same pen again.
    fn deliver(&self, events: Vec<PenEvent>) {
        for event in &events {
            dispatch(event);
        }
    }
}

impl PenListener for EngineListener {
    fn pen_down(&self, sample: PenSample) {
        let events = lock(&self.tracker).pen_down(sample, |t, p| self.shared.resolve(t, p));
        self.deliver(events);
    }

    fn sample(&self, sample: PenSample) {
        let events = lock(&self.tracker).sample(sample, |t, p| self.shared.resolve(t, p));
        self.deliver(events);
    }

    fn pen_up(&self, sample: PenSample) {
        let events = lock(&self.tracker).pen_up(sample, |t, p| self.shared.resolve(t, p));
        self.deliver(events);
    }
}

struct Registration {
    pen: Arc<dyn PenSource>,
    listener: Arc<dyn PenListener>,
    count: usize,
}

/// Multiplexes any number of pens onto the regions of the added mappings.
pub struct EventEngine {
    shared: Arc<Shared>,
    registry: Mutex<HashMap<PenId, Registration>>,
}

impl Default for EventEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                mappings: RwLock::new(Vec::new()),
            }),
            registry: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.shared.config
    }

    /// Make the regions of `mapping` reachable by pen samples. Mappings added
    /// later are consulted after earlier ones. Already registered pens see
    /// the new mapping from their next sample on.
    pub fn add_mapping(&self, mapping: Arc<PatternMapping>) {
        write(&self.shared.mappings).push(mapping);
    }

    pub fn mappings(&self) -> Vec<Arc<PatternMapping>> {
        read(&self.shared.mappings).clone()
    }

    /// Register `pen`, returning its new registration count.
    ///
    /// A pen that is already registered gets its listener replaced: the old
    /// one is detached before the fresh one is attached, so exactly one engine
    /// listener is ever attached per pen. Any gesture in progress is dropped.
    pub fn register<P>(&self, pen: &Arc<P>) -> usize
    where
        P: PenSource + 'static,
    {
        let id = pen.id();
        let mut registry = lock(&self.registry);
        let previous = registry.remove(&id);
        if let Some(old) = &previous {
            old.pen.remove_listener(&old.listener);
        }

        let listener: Arc<dyn PenListener> = Arc::new(EngineListener::new(id, Arc::clone(&self.shared)));
        pen.add_listener(Arc::clone(&listener));
        let count = previous.map_or(0, |r| r.count) + 1;
        registry.insert(
            id,
            Registration {
                pen: Arc::clone(pen) as Arc<dyn PenSource>,
                listener,
                count,
            },
        );
        debug!(pen = %id, count, "registered pen");
        count
    }

    /// Drop one registration of `pen`, returning the remaining count. At zero
    /// the listener is detached and every record of the pen is removed.
    ///
    /// Unregistering a pen the engine does not know is reported and changes
    /// nothing.
    pub fn unregister<P>(&self, pen: &P) -> Result<usize, EngineError>
    where
        P: PenSource + ?Sized,
    {
        let id = pen.id();
        let mut registry = lock(&self.registry);
        let Some(registration) = registry.get_mut(&id) else {
            warn!(pen = %id, "unregister for a pen with no registration");
            return Err(EngineError::UnknownPen { pen: id });
        };
        registration.count -= 1;
        let count = registration.count;
        if count == 0 {
            if let Some(gone) = registry.remove(&id) {
                gone.pen.remove_listener(&gone.listener);
            }
            debug!(pen = %id, "pen unregistered; listener detached");
        } else {
            debug!(pen = %id, count, "unregistered pen");
        }
        Ok(count)
    }

    pub fn registration_count(&self, pen: PenId) -> usize {
        lock(&self.registry).get(&pen).map_or(0, |r| r.count)
    }

    pub fn is_registered(&self, pen: PenId) -> bool {
        lock(&self.registry).contains_key(&pen)
    }

    /// Registered pens, in no particular order.
    pub fn pens(&self) -> Vec<PenId> {
        lock(&self.registry).keys().copied().collect()
    }

    /// Pump a pen's message stream through the pen, then treat the end of the
    /// stream as a disconnect and unregister the pen once. Blocks until the
    /// iterator is exhausted.
    pub fn drive<P, I>(&self, pen: &Arc<P>, messages: I) -> Result<usize, EngineError>
    where
        P: PenSource + 'static,
        I: IntoIterator<Item = PenMessage>,
    {
        for message in messages {
            pen.emit(message);
        }
        debug!(pen = %pen.id(), "pen stream ended");
        self.unregister(pen.as_ref())
    }
}

impl fmt::Debug for EventEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        let mut counts: Vec<_> = registry.iter().map(|(id, r)| (*id, r.count)).collect();
        counts.sort();
        f.debug_struct("EventEngine")
            .field("config", &self.shared.config)
            .field("mappings", &read(&self.shared.mappings).len())
            .field("registrations", &counts)
            .finish()
    }
}
