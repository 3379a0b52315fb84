//! The functional core: grid placement, exit resolution and row packing.
pub mod exits;
pub mod grid;
pub mod row_codec;
pub mod tile_flags;

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{ProcessedScreen, ProcessedWorld, ScreenRecord};
use grid::WorldGrid;
use tile_flags::TileFlagTable;

/// How screen rows are encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions<'a> {
    /// Pack rows with the row codec instead of writing 8 raw bytes.
    pub packed: bool,
    /// Flag table applied to packed tiles; `None` writes tile values as-is.
    pub flags: Option<&'a TileFlagTable>,
}

/// Runs every processing pass over a built grid and returns a read-only
/// structure for writers. Screens come out in discovery order, after the
/// title slot.
pub fn run(grid: &WorldGrid, opts: &EncodeOptions<'_>) -> Result<ProcessedWorld> {
    let mut records = Vec::with_capacity(grid.len() + 1);
    records.push(ScreenRecord::TITLE);
    let mut screens = Vec::with_capacity(grid.len());

    for screen in grid.screens() {
        let record = exits::resolve_exits(grid, screen.coord)?;

        let rows = screen
            .rows
            .iter()
            .map(|row| {
                if opts.packed {
                    row_codec::pack_row(row, opts.flags)
                } else {
                    Ok(row.to_vec())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            screen = %screen.name,
            number = record.number,
            bytes = rows.iter().map(Vec::len).sum::<usize>(),
            "encoded screen"
        );

        screens.push(ProcessedScreen {
            number: record.number,
            name: screen.name.clone(),
            rows,
        });
        records.push(record);
    }

    info!(screens = screens.len(), packed = opts.packed, "world processed");

    Ok(ProcessedWorld {
        records,
        screens,
        packed: opts.packed,
    })
}
