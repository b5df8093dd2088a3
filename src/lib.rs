//! Paper interfaces driven by digital pens.
//!
//! A sheet is authored as a set of named [`Region`]s. Each region is printed
//! with a dot pattern, possibly spread over several physical tiles; a
//! [`PatternMapping`] remembers where. Pens stream pattern-space samples into
//! an [`EventEngine`], which resolves them back to regions and synthesizes
//! down, move, up, enter, exit, click and drag events for the handlers
//! attached to those regions. Completed [`ink`] can be grouped and queried
//! offline.
//!
//! ```
//! use std::sync::Arc;
//! use paperkit::{EventEngine, Pen, PatternMapping, Region, Sheet, TileLayout};
//! use paperkit::events::{PenEvent, PenEventKind};
//! use paperkit::pen::{PenMessage, PenSample};
//! use paperkit::pattern::TileId;
//!
//! let sheet = Arc::new(Sheet::letter());
//! let button = sheet.add_region(Region::new("button", 1.0, 1.0, 2.0, 1.0));
//! button.add_event_handler(Arc::new(|e: &PenEvent| {
//!     if e.kind == PenEventKind::Click {
//!         println!("clicked at {}", e.local);
//!     }
//! }));
//!
//! let mapping = Arc::new(PatternMapping::new(Arc::clone(&sheet)));
//! TileLayout::letter(1).bind(&mapping)?;
//!
//! let engine = EventEngine::new();
//! engine.add_mapping(mapping);
//! let pen = Arc::new(Pen::new("pen"));
//! engine.register(&pen);
//!
//! let tap = PenSample::new(TileId(0), 120.0, 100.0, 0);
//! engine.drive(&pen, [PenMessage::Down(tap), PenMessage::Up(tap)])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod defaults;
pub mod errors;
pub mod events;
pub mod ink;
pub mod log;
pub mod pattern;
pub mod pen;
pub mod sheet;
mod sync;
pub mod types;

pub use config::{EngineConfig, InkConfig};
pub use errors::{EngineError, MappingError, PersistError};
pub use events::{EventEngine, PenEvent, PenEventKind};
pub use ink::{Ink, InkSample, InkStroke};
pub use pattern::{JsonPatternStore, PatternMapping, TileId, TileLayout, TiledPatternConverter};
pub use pen::{Pen, PenId, PenSample, PenSource};
pub use sheet::{Region, RegionKey, Sheet};
pub use types::{Pt, Rect, UnitKind, Units};
