pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::cli::Cli;
use crate::processor::tile_flags::TileFlagTable;

pub fn run(args: &Cli) -> anyhow::Result<()> {
    // 1. ── Parse ──────────────────────────────────────────────────────
    let world = parser::read_world(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let flags = if args.packed { flag_table(args)? } else { None };

    // 2. ── Process ────────────────────────────────────────────────────
    let source = parser::TiledScreenSource::for_world(&args.input);
    let grid = processor::grid::build_world(&world.maps, &source)
        .with_context(|| "Placing screens on the world grid")?;
    info!(screens = grid.len(), "world grid built");

    let opts = processor::EncodeOptions {
        packed: args.packed,
        flags: flags.as_ref(),
    };
    let processed = processor::run(&grid, &opts).with_context(|| "Encoding screens")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    // Render everything first so a failure leaves no partial output.
    let asm = writer::asm::render(&processed).with_context(|| "Rendering assembler source")?;
    let blob = args.binary.as_ref().map(|_| writer::bin::to_bytes(&processed));

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Creating {}", dir.display()))?;
    }

    let mut outputs: Vec<(&Path, &[u8])> = vec![(args.output.as_path(), asm.as_slice())];
    if let (Some(path), Some(blob)) = (&args.binary, &blob) {
        outputs.push((path.as_path(), blob.as_slice()));
    }
    writer::write_all(&outputs).with_context(|| "Writing outputs")?;

    Ok(())
}

/// Pick the flag table for packed tiles (unpacked output never uses one):
/// none with `--raw-tiles`, else an explicit table file, else a tileset,
/// else the built-in table.
fn flag_table(args: &Cli) -> anyhow::Result<Option<TileFlagTable>> {
    if args.raw_tiles {
        return Ok(None);
    }
    let table = if let Some(path) = &args.tile_flags {
        parser::read_tile_flags(path)
            .with_context(|| format!("Loading tile flags from {}", path.display()))?
    } else if let Some(path) = &args.tileset {
        parser::read_tileset(path)
            .with_context(|| format!("Loading tileset {}", path.display()))?
    } else {
        TileFlagTable::default()
    };
    Ok(Some(table))
}
