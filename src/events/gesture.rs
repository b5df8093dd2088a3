//! Per-pen gesture reduction.
//!
//! Follows one pen from `pen_down` to `pen_up`, resolving every sample to a
//! region and turning the stream into region events. Whether a gesture was
//! a click is settled on `pen_up`: the pen must have stayed in the region it
//! went down in, on the same tile, and never strayed further than the
//! configured slop from the down point.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::log::{debug, trace};
use crate::pattern::{Resolved, TileId};
use crate::pen::{PenId, PenSample};
use crate::sheet::{Region, RegionId};
use crate::types::Pt;

use super::{PenEvent, PenEventKind};

#[derive(Debug, Clone)]
struct Gesture {
    down: PenSample,
    started_in: Option<Resolved>,
    current: Option<Resolved>,
    max_displacement: f64,
    /// Set once the pen has changed region or tile since going down
    wandered: bool,
}

/// Gesture state of a single pen.
#[derive(Debug)]
pub struct GestureTracker {
    pen: PenId,
    config: EngineConfig,
    gesture: Option<Gesture>,
}

fn same_region(a: Option<&Resolved>, b: Option<&Resolved>) -> bool {
    let id = |r: Option<&Resolved>| r.map(|r| r.region.id());
    id(a) == id(b)
}

impl GestureTracker {
    pub fn new(pen: PenId, config: EngineConfig) -> Self {
        Self {
            pen,
            config,
            gesture: None,
        }
    }

    pub fn is_down(&self) -> bool {
        self.gesture.is_some()
    }

    fn event(&self, kind: PenEventKind, region: &Arc<Region>, local: Pt, sample: PenSample) -> PenEvent {
        PenEvent {
            pen: self.pen,
            kind,
            region: Arc::clone(region),
            local,
            sample,
        }
    }

    /// Start a gesture. A down while already down restarts the gesture.
    pub fn pen_down<R>(&mut self, sample: PenSample, resolve: R) -> Vec<PenEvent>
    where
        R: Fn(TileId, Pt) -> Option<Resolved>,
    {
        if self.gesture.is_some() {
            debug!(pen = %self.pen, "pen down without pen up; restarting gesture");
        }
        let hit = resolve(sample.tile, sample.position());
        let mut events = Vec::new();
        if let Some(r) = &hit {
            events.push(self.event(PenEventKind::Down, &r.region, r.local, sample));
        } else {
            debug!(pen = %self.pen, tile = %sample.tile, "pen down outside every region");
        }
        self.gesture = Some(Gesture {
            down: sample,
            started_in: hit.clone(),
            current: hit,
            max_displacement: 0.0,
            wandered: false,
        });
        events
    }

    pub fn sample<R>(&mut self, sample: PenSample, resolve: R) -> Vec<PenEvent>
    where
        R: Fn(TileId, Pt) -> Option<Resolved>,
    {
        let mut events = Vec::new();
        if let Some(hit) = self.advance(sample, &resolve, &mut events) {
            events.push(self.event(PenEventKind::Move, &hit.region, hit.local, sample));
        }
        events
    }

    /// Finish the gesture, synthesizing the click or drag it amounted to.
    pub fn pen_up<R>(&mut self, sample: PenSample, resolve: R) -> Vec<PenEvent>
    where
        R: Fn(TileId, Pt) -> Option<Resolved>,
    {
        let mut events = Vec::new();
        let hit = self.advance(sample, &resolve, &mut events);
        let Some(gesture) = self.gesture.take() else {
            return events;
        };
        if let Some(r) = &hit {
            events.push(self.event(PenEventKind::Up, &r.region, r.local, sample));
        }

        let click = !gesture.wandered && gesture.max_displacement <= self.config.click_slop;
        match (&gesture.started_in, &hit) {
            (Some(start), _) if click => {
                debug!(pen = %self.pen, region = start.region.name(), "click");
                events.push(self.event(PenEventKind::Click, &start.region, start.local, gesture.down));
            }
            (Some(start), _) => {
                debug!(pen = %self.pen, region = start.region.name(), distance = gesture.max_displacement, "drag");
                let kind = PenEventKind::Drag {
                    start: gesture.down,
                    end: sample,
                };
                events.push(self.event(kind, &start.region, start.local, gesture.down));
            }
            (None, Some(end)) if !click => {
                debug!(pen = %self.pen, region = end.region.name(), "drag from outside");
                let kind = PenEventKind::Drag {
                    start: gesture.down,
                    end: sample,
                };
                events.push(self.event(kind, &end.region, end.local, sample));
            }
            _ => {}
        }
        events
    }

    /// Track a sample within the current gesture, pushing enter/exit events.
    /// Returns where the sample landed, or `None` outside every region or
    /// when the pen is not down.
    fn advance<R>(&mut self, sample: PenSample, resolve: &R, events: &mut Vec<PenEvent>) -> Option<Resolved>
    where
        R: Fn(TileId, Pt) -> Option<Resolved>,
    {
        let Some(gesture) = self.gesture.as_mut() else {
            debug!(pen = %self.pen, "sample without pen down; ignored");
            return None;
        };
        let hit = resolve(sample.tile, sample.position());
        if sample.tile == gesture.down.tile {
            let moved = sample.position().distance(gesture.down.position());
            gesture.max_displacement = gesture.max_displacement.max(moved);
        } else {
            gesture.wandered = true;
        }

        let mut crossing = Vec::new();
        if !same_region(gesture.current.as_ref(), hit.as_ref()) {
            gesture.wandered = true;
            if let Some(left) = &gesture.current {
                trace!(pen = %self.pen, region = left.region.name(), "exit");
                crossing.push((PenEventKind::Exit, Arc::clone(&left.region), left.local));
            }
            if let Some(entered) = &hit {
                trace!(pen = %self.pen, region = entered.region.name(), "enter");
                crossing.push((PenEventKind::Enter, Arc::clone(&entered.region), entered.local));
            }
        }
        gesture.current = hit.clone();
        for (kind, region, local) in crossing {
            events.push(self.event(kind, &region, local, sample));
        }
        hit
    }

    /// Region the pen is currently over, if it is down.
    pub fn current_region(&self) -> Option<RegionId> {
        self.gesture
            .as_ref()
            .and_then(|g| g.current.as_ref())
            .map(|r| r.region.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;

    /// Two side-by-side unit regions on tile 0, 100 pattern units each.
    struct Board {
        left: Arc<Region>,
        right: Arc<Region>,
    }

    impl Board {
        fn new() -> Self {
            Self {
                left: Arc::new(Region::new("left", 0.0, 0.0, 1.0, 1.0)),
                right: Arc::new(Region::new("right", 1.0, 0.0, 1.0, 1.0)),
            }
        }

        fn resolve(&self, tile: TileId, p: Pt) -> Option<Resolved> {
            if tile != TileId(0) {
                return None;
            }
            let left = Rect::from_origin_size(0.0, 0.0, 100.0, 100.0);
            let right = Rect::from_origin_size(100.0, 0.0, 100.0, 100.0);
            if left.contains_point(p) {
                Some(Resolved {
                    region: Arc::clone(&self.left),
                    local: Pt::new(p.x / 100.0, p.y / 100.0),
                })
            } else if right.contains_point(p) {
                Some(Resolved {
                    region: Arc::clone(&self.right),
                    local: Pt::new((p.x - 100.0) / 100.0, p.y / 100.0),
                })
            } else {
                None
            }
        }
    }

    fn at(x: f64, y: f64, t: u64) -> PenSample {
        PenSample::new(TileId(0), x, y, t)
    }

    fn kinds(events: &[PenEvent]) -> Vec<String> {
        events
            .iter()
            .map(|e| format!("{}:{}", e.kind.name(), e.region.name()))
            .collect()
    }

    fn run(board: &Board, samples: &[PenSample]) -> Vec<String> {
        let mut tracker = GestureTracker::new(PenId::next(), EngineConfig::default());
        let resolve = |t, p| board.resolve(t, p);
        let (first, rest) = samples.split_first().unwrap();
        let (last, middle) = rest.split_last().unwrap();
        let mut events = tracker.pen_down(*first, resolve);
        for s in middle {
            events.extend(tracker.sample(*s, resolve));
        }
        events.extend(tracker.pen_up(*last, resolve));
        assert!(!tracker.is_down());
        kinds(&events)
    }

    #[test]
    fn small_wiggle_is_a_click() {
        let board = Board::new();
        let events = run(&board, &[at(50.0, 50.0, 0), at(52.0, 51.0, 10), at(51.0, 50.0, 20)]);
        assert_eq!(events, ["down:left", "move:left", "up:left", "click:left"]);
    }

    #[test]
    fn slop_is_measured_from_the_down_point() {
        let board = Board::new();
        // Ends where it started, but went 20 units away in between.
        let events = run(&board, &[at(50.0, 50.0, 0), at(70.0, 50.0, 10), at(50.0, 50.0, 20)]);
        assert_eq!(events.last().unwrap(), "drag:left");
    }

    #[test]
    fn crossing_regions_is_a_drag_on_the_start_region() {
        let board = Board::new();
        let events = run(&board, &[at(95.0, 50.0, 0), at(99.0, 50.0, 10), at(101.0, 50.0, 20)]);
        assert_eq!(
            events,
            ["down:left", "move:left", "exit:left", "enter:right", "up:right", "drag:left"]
        );
    }

    #[test]
    fn drag_from_outside_lands_on_end_region() {
        let board = Board::new();
        let events = run(&board, &[at(50.0, 150.0, 0), at(50.0, 50.0, 10)]);
        assert_eq!(events, ["enter:left", "up:left", "drag:left"]);
    }

    #[test]
    fn tile_change_rules_out_a_click() {
        let board = Board::new();
        let mut tracker = GestureTracker::new(PenId::next(), EngineConfig::default());
        let resolve = |t, p| board.resolve(t, p);
        tracker.pen_down(at(50.0, 50.0, 0), resolve);
        tracker.sample(PenSample::new(TileId(1), 50.0, 50.0, 5), resolve);
        let events = tracker.pen_up(at(50.0, 50.0, 10), resolve);
        assert_eq!(kinds(&events), ["enter:left", "up:left", "drag:left"]);
    }

    #[test]
    fn samples_without_down_are_ignored() {
        let board = Board::new();
        let mut tracker = GestureTracker::new(PenId::next(), EngineConfig::default());
        let resolve = |t, p| board.resolve(t, p);
        assert!(tracker.sample(at(50.0, 50.0, 0), resolve).is_empty());
        assert!(tracker.pen_up(at(50.0, 50.0, 1), resolve).is_empty());
    }

    #[test]
    fn zero_slop_only_accepts_perfectly_still_pens() {
        let board = Board::new();
        let config = EngineConfig::default().with_click_slop(0.0).unwrap();
        let mut tracker = GestureTracker::new(PenId::next(), config);
        let resolve = |t, p| board.resolve(t, p);
        tracker.pen_down(at(50.0, 50.0, 0), resolve);
        let events = tracker.pen_up(at(50.5, 50.0, 1), resolve);
        assert_eq!(kinds(&events), ["up:left", "drag:left"]);
    }
}
