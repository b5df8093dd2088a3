//! Region-scoped pen events.
//!
//! Raw pen notifications are reduced per pen by a [`GestureTracker`] into
//! [`PenEvent`]s, each addressed to the region the sample resolved to. The
//! [`EventEngine`] owns the per-pen listeners and their registration counts.

mod engine;
mod gesture;

use std::fmt;
use std::sync::Arc;

pub use engine::EventEngine;
pub use gesture::GestureTracker;

use crate::pen::{PenId, PenSample};
use crate::sheet::Region;
use crate::types::Pt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenEventKind {
    Down,
    Move,
    Up,
    /// The pen crossed into this region while down
    Enter,
    /// The pen left this region while down
    Exit,
    /// Down and up in the same region without moving further than the slop
    Click,
    /// A gesture that was not a click. Addressed to the region the gesture
    /// started in, or where it ended when it started outside every region.
    Drag { start: PenSample, end: PenSample },
}

impl PenEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            PenEventKind::Down => "down",
            PenEventKind::Move => "move",
            PenEventKind::Up => "up",
            PenEventKind::Enter => "enter",
            PenEventKind::Exit => "exit",
            PenEventKind::Click => "click",
            PenEventKind::Drag { .. } => "drag",
        }
    }
}

/// One event, addressed to one region.
#[derive(Debug, Clone)]
pub struct PenEvent {
    pub pen: PenId,
    pub kind: PenEventKind,
    pub region: Arc<Region>,
    /// Location of `sample` in region-local coordinates. For exits this is
    /// the last location seen inside the region.
    pub local: Pt,
    pub sample: PenSample,
}

impl fmt::Display for PenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on '{}' at {}",
            self.pen,
            self.kind.name(),
            self.region.name(),
            self.local
        )
    }
}

/// Reacts to events delivered to a region.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &PenEvent);
}

impl<F> EventHandler for F
where
    F: Fn(&PenEvent) + Send + Sync,
{
    fn handle(&self, event: &PenEvent) {
        self(event)
    }
}

/// Decides whether an event reaches a region's handlers at all.
pub trait ContentFilter: Send + Sync {
    fn filter(&self, event: &PenEvent) -> bool;
}

impl<F> ContentFilter for F
where
    F: Fn(&PenEvent) -> bool + Send + Sync,
{
    fn filter(&self, event: &PenEvent) -> bool {
        self(event)
    }
}

/// Deliver `event` to its region's handlers if every content filter lets
/// it through. Returns whether it was delivered.
pub fn dispatch(event: &PenEvent) -> bool {
    let filters = event.region.content_filters();
    if !filters.iter().all(|f| f.filter(event)) {
        return false;
    }
    for handler in event.region.event_handlers() {
        handler.handle(event);
    }
    true
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::pattern::TileId;

    fn event(region: Arc<Region>, kind: PenEventKind) -> PenEvent {
        PenEvent {
            pen: PenId::next(),
            kind,
            region,
            local: Pt::new(0.5, 0.5),
            sample: PenSample::new(TileId(0), 1.0, 1.0, 0),
        }
    }

    #[test]
    fn filters_gate_every_handler() {
        let region = Arc::new(Region::new("button", 0.0, 0.0, 1.0, 1.0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        region.add_event_handler(Arc::new(move |e: &PenEvent| {
            sink.lock().unwrap().push(e.kind.name());
        }));
        region.add_content_filter(Arc::new(|e: &PenEvent| e.kind != PenEventKind::Move));

        assert!(dispatch(&event(Arc::clone(&region), PenEventKind::Click)));
        assert!(!dispatch(&event(Arc::clone(&region), PenEventKind::Move)));
        assert_eq!(*seen.lock().unwrap(), ["click"]);
    }

    #[test]
    fn display_names_pen_kind_and_region() {
        let region = Arc::new(Region::new("title", 0.0, 0.0, 1.0, 1.0));
        let e = event(region, PenEventKind::Click);
        assert!(e.to_string().ends_with("click on 'title' at (0.5, 0.5)"));
    }
}
