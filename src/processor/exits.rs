//! Exit links between neighbouring screens.
//!
//! Exits are written as screen numbers: 0 means "no exit" (slot 0 is the
//! title page), any other value is the target's discovery index + 1.

use crate::error::{ExportError, Result};
use crate::model::{Direction, GridCoord, ScreenRecord};
use crate::processor::grid::WorldGrid;

/// Byte value for the screen with discovery index `index`.
pub fn screen_number(index: usize) -> Result<u8> {
    u8::try_from(index + 1).map_err(|_| ExportError::TooManyScreens(index))
}

/// Discovery index of the screen one step from `coord` in `dir`.
pub fn neighbour_index(grid: &WorldGrid, coord: GridCoord, dir: Direction) -> Result<usize> {
    let screen = grid.get(coord).ok_or(ExportError::NotFound(coord))?;
    let dangling = || ExportError::DanglingExit {
        screen: screen.name.clone(),
        direction: dir,
    };

    let target = coord.step(dir).ok_or_else(dangling)?;
    grid.index_of(target).map_err(|e| match e {
        ExportError::NotFound(_) => dangling(),
        other => other,
    })
}

/// Build the record for the screen at `coord`: its own number and one byte
/// per direction, 0 where the exit flag is unset.
pub fn resolve_exits(grid: &WorldGrid, coord: GridCoord) -> Result<ScreenRecord> {
    let screen = grid.get(coord).ok_or(ExportError::NotFound(coord))?;

    let mut record = ScreenRecord {
        number: screen_number(grid.index_of(coord)?)?,
        ..Default::default()
    };

    for dir in Direction::ALL {
        if !screen.exits.is_set(dir) {
            continue;
        }
        let target = screen_number(neighbour_index(grid, coord, dir)?)?;
        match dir {
            Direction::Up => record.up = target,
            Direction::Down => record.down = target,
            Direction::Left => record.left = target,
            Direction::Right => record.right = target,
        }
    }

    Ok(record)
}
