//! A letter-sized sheet with a 5x6 grid of one-inch boxes, tapped by two
//! simulated pens at once.
//!
//! Run with: cargo run --example letter_grid --features tracing
//!
//! The pattern mapping is saved next to the system temp dir so a second run
//! picks it up through the sheet's configuration path instead of binding the
//! layout again.

use std::sync::Arc;
use std::thread;

use miette::IntoDiagnostic;
use paperkit::events::{PenEvent, PenEventKind};
use paperkit::pattern::{JsonPatternStore, PATTERN_FILE_SUFFIX};
use paperkit::pen::PenMessage;
use paperkit::{EventEngine, Pen, PatternMapping, PenSample, Region, Sheet, TileId, TileLayout, Units};

const COLUMNS: u32 = 5;
const ROWS: u32 = 6;

fn grid_sheet() -> Arc<Sheet> {
    let sheet = Arc::new(Sheet::letter());
    let (left, top) = (0.5, 0.5);
    let (h_gap, v_gap) = (0.5, 0.8);
    for row in 0..ROWS {
        for col in 0..COLUMNS {
            let x = left + f64::from(col) * (1.0 + h_gap);
            let y = top + f64::from(row) * (1.0 + v_gap);
            let region = sheet.add_region(Region::with_units(
                format!("Box_{col}_{row}"),
                Units::inches(x),
                Units::inches(y),
                Units::inches(1.0),
                Units::inches(1.0),
            ));
            region.add_event_handler(Arc::new(|e: &PenEvent| {
                if e.kind == PenEventKind::Click {
                    println!("{} clicked {} at {}", e.pen, e.region.name(), e.local);
                }
            }));
        }
    }
    sheet
}

/// Taps in the middle of every box along one row, in pattern coordinates.
fn taps_along_row(row: u32) -> Vec<PenMessage> {
    let per_inch = paperkit::defaults::PATTERN_UNITS_PER_INCH;
    let y = (0.5 + f64::from(row) * 1.8 + 0.5) * per_inch;
    let mut messages = Vec::new();
    for col in 0..COLUMNS {
        let x = (0.5 + f64::from(col) * 1.5 + 0.5) * per_inch;
        let t = u64::from(col) * 200;
        messages.push(PenMessage::Down(PenSample::new(TileId(0), x, y, t)));
        messages.push(PenMessage::Sample(PenSample::new(TileId(0), x + 1.0, y, t + 20)));
        messages.push(PenMessage::Up(PenSample::new(TileId(0), x + 1.0, y + 1.0, t + 40)));
    }
    messages
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let data = std::env::temp_dir().join("paperkit-letter-grid");
    std::fs::create_dir_all(&data).into_diagnostic()?;

    let sheet = grid_sheet();
    sheet.add_configuration_path(&data);
    let mapping = PatternMapping::with_store(Arc::clone(&sheet), &JsonPatternStore);
    if mapping.regions().iter().any(|r| mapping.converter(r).is_some_and(|c| c.is_unset())) {
        let bound = TileLayout::letter(1).bind(&mapping)?;
        println!("bound {bound} regions to the first letter page");
        mapping.save(&JsonPatternStore, &data.join(format!("grid{PATTERN_FILE_SUFFIX}")))?;
    }
    print!("{}", mapping.describe());

    let engine = Arc::new(EventEngine::new());
    engine.add_mapping(Arc::new(mapping));

    let pens = [("Brown Pen", 0), ("Green Pen", 3)];
    let workers: Vec<_> = pens
        .into_iter()
        .map(|(name, row)| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let pen = Arc::new(Pen::new(name));
                engine.register(&pen);
                engine.drive(&pen, taps_along_row(row))
            })
        })
        .collect();

    for worker in workers {
        match worker.join() {
            Ok(result) => {
                result?;
            }
            Err(_) => return Err(miette::miette!("pen thread panicked")),
        }
    }
    Ok(())
}
