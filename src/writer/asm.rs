//! Emit BeebAsm source for the level data.

use crate::model::ProcessedWorld;
use std::io::{self, Write};

/// Render the whole source in memory.
pub fn render(world: &ProcessedWorld) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_asm(world, &mut out)?;
    Ok(out)
}

pub fn write_asm<W: Write>(world: &ProcessedWorld, w: &mut W) -> io::Result<()> {
    writeln!(w, "\\ Auto-generated by map2bbc - DO NOT EDIT")?;
    writeln!(w)?;

    // ---------------------------------------------------------------
    // 1. Constants – screen count includes the title page in slot 0
    // ---------------------------------------------------------------
    writeln!(w, "NUM_SCREENS = {}", world.num_screens())?;
    writeln!(w, "SCREEN_RECORD_SIZE = {}", crate::model::ScreenRecord::SIZE)?;
    writeln!(w, "PACKED_SCREENS = {}", u8::from(world.packed))?;
    writeln!(w)?;

    // ---------------------------------------------------------------
    // 2. Screen table: own number, then up / down / left / right
    // ---------------------------------------------------------------
    writeln!(w, ".screen_table")?;
    let names = std::iter::once("title").chain(world.screens.iter().map(|s| s.name.as_str()));
    for (record, name) in world.records.iter().zip(names) {
        writeln!(w, "{} \\ {}", equb(&record.to_bytes()), name)?;
    }
    writeln!(w)?;

    // ---------------------------------------------------------------
    // 3. Screen data, one EQUB line per row
    // ---------------------------------------------------------------
    for screen in &world.screens {
        writeln!(w, ".screen_{} \\ {}", screen.number, screen.name)?;
        for row in &screen.rows {
            writeln!(w, "{}", equb(row))?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// `EQUB &07, &F3, &01`
fn equb(bytes: &[u8]) -> String {
    let body = bytes
        .iter()
        .map(|b| format!("&{b:02X}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("EQUB {body}")
}
