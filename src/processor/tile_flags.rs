//! Tile behaviour flags.
//!
//! The engine stores a tile as one byte: the low 5 bits are the 0-based tile
//! index, the high 3 bits say how the player interacts with it. Which tiles
//! get which flags is content, so it lives in a table that can be swapped
//! out from the command line or built from a Tiled tileset.

use serde::Deserialize;

use crate::error::{ExportError, Result};
use crate::model::TiledTileset;
use crate::processor::row_codec::RLE_MARKER;

/// Number of distinct tile types a 5-bit index can address.
pub const TILE_TYPES: usize = 32;
/// Highest 1-based tile value accepted in a row.
pub const MAX_TILE: u8 = 31;

const INDEX_MASK: u8 = 0x1f;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileFlags {
    pub climbable: bool,
    pub collidable: bool,
    pub hookable: bool,
}

impl TileFlags {
    pub const CLIMBABLE: u8 = 0x80;
    pub const COLLIDABLE: u8 = 0x40;
    pub const HOOKABLE: u8 = 0x20;

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.climbable {
            bits |= Self::CLIMBABLE;
        }
        if self.collidable {
            bits |= Self::COLLIDABLE;
        }
        if self.hookable {
            bits |= Self::HOOKABLE;
        }
        bits
    }
}

/// Flags per tile type, keyed by the 0-based (rebased) tile index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFlagTable {
    entries: [TileFlags; TILE_TYPES],
}

/// On-disk form of a flag table: for each flag, the rebased tile indices
/// that carry it.
///
/// ```json
/// { "climbable": [0, 19], "collidable": [2, 8, 17], "hookable": [] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileFlagConfig {
    #[serde(default)]
    pub climbable: Vec<usize>,
    #[serde(default)]
    pub collidable: Vec<usize>,
    #[serde(default)]
    pub hookable: Vec<usize>,
}

impl Default for TileFlagTable {
    /// Built-in classification for the current tile sheet. Incomplete; pass
    /// `--tile-flags` or `--tileset` once more tiles need behaviour.
    fn default() -> Self {
        let mut table = Self::empty();
        table.entries[0].climbable = true;
        table.entries[19].climbable = true;
        table.entries[2].collidable = true;
        table.entries[8].collidable = true;
        table.entries[17].collidable = true;
        table
    }
}

impl TileFlagTable {
    /// A table where no tile has any flag.
    pub fn empty() -> Self {
        TileFlagTable {
            entries: [TileFlags::default(); TILE_TYPES],
        }
    }

    pub fn from_config(config: &TileFlagConfig) -> Result<Self> {
        let mut table = Self::empty();
        for &idx in &config.climbable {
            table.entry_mut(idx)?.climbable = true;
        }
        for &idx in &config.collidable {
            table.entry_mut(idx)?.collidable = true;
        }
        for &idx in &config.hookable {
            table.entry_mut(idx)?.hookable = true;
        }
        table.check()?;
        Ok(table)
    }

    /// Build the table from boolean `climbable` / `collidable` / `hookable`
    /// properties on the tileset's tiles. Tile ids in a tileset are already
    /// 0-based.
    pub fn from_tileset(tileset: &TiledTileset) -> Result<Self> {
        let mut table = Self::empty();
        for tile in &tileset.tiles {
            for prop in &tile.properties {
                if prop.value.as_bool() != Some(true) {
                    continue;
                }
                match prop.name.as_str() {
                    "climbable" => table.entry_mut(tile.id)?.climbable = true,
                    "collidable" => table.entry_mut(tile.id)?.collidable = true,
                    "hookable" => table.entry_mut(tile.id)?.hookable = true,
                    _ => {}
                }
            }
        }
        table.check()?;
        Ok(table)
    }

    pub fn get(&self, rebased: usize) -> Option<TileFlags> {
        self.entries.get(rebased).copied()
    }

    /// Combine a 1-based tile value with its flags.
    pub fn resolve(&self, tile: u8) -> Result<u8> {
        if tile == 0 || tile > MAX_TILE {
            return Err(ExportError::MalformedRow(format!(
                "tile {tile} has no flag entry"
            )));
        }
        let rebased = tile - 1;
        let flags = self.entries[rebased as usize];
        let byte = flags.bits() | (rebased & INDEX_MASK);
        if byte >= RLE_MARKER {
            return Err(ExportError::FlagTable(format!(
                "tile {tile} resolves to {byte:#04x}, which reads as a run-length byte"
            )));
        }
        Ok(byte)
    }

    /// A flagged tile must never collide with a run-length control byte.
    fn check(&self) -> Result<()> {
        for (rebased, flags) in self.entries.iter().enumerate() {
            if flags.bits() | rebased as u8 >= RLE_MARKER {
                return Err(ExportError::FlagTable(format!(
                    "tile index {rebased} with all three flags collides with run-length bytes"
                )));
            }
        }
        Ok(())
    }

    fn entry_mut(&mut self, rebased: usize) -> Result<&mut TileFlags> {
        self.entries.get_mut(rebased).ok_or_else(|| {
            ExportError::FlagTable(format!(
                "tile index {rebased} out of range (0..{TILE_TYPES})"
            ))
        })
    }
}
