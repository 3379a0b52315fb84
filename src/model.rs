// numeric constants that describe a screen and the world grid
pub const SCREEN_W: i32 = 128;
pub const SCREEN_H: i32 = 192;

pub const ROW_WIDTH: usize = 8; // tiles per row
pub const SCREEN_ROWS: usize = 12; // rows per screen

pub const WORLD_MAX_SIZE: usize = 256;
pub const GRID_ORIGIN: i64 = (WORLD_MAX_SIZE / 2) as i64; // 128

pub type TileRow = [u8; ROW_WIDTH];
pub type TileRows = [TileRow; SCREEN_ROWS];

use serde::Deserialize;
use std::fmt;

/// ─────────────────────────────────────────────────────
/// World file (Tiled `.world`)
/// ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Deserialize)]
pub struct World {
    #[serde(alias = "Maps")]
    pub maps: Vec<ScreenDescriptor>,
}

/// One entry of the world file's map list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreenDescriptor {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(alias = "Width")]
    pub width: i32,
    #[serde(alias = "Height")]
    pub height: i32,
    pub x: i32,
    pub y: i32,
}

/// ─────────────────────────────────────────────────────
/// Per-screen map file (Tiled JSON map)
/// ─────────────────────────────────────────────────────
#[derive(Debug, Deserialize)]
pub struct TiledMap {
    #[serde(default)]
    pub properties: Vec<TiledProperty>,
    #[serde(default)]
    pub layers: Vec<TiledLayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TiledProperty {
    pub name: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct TiledLayer {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub width: usize,
    pub data: Option<LayerData>,
}

/// Tiled writes tile data either as a plain array or, for CSV-encoded
/// layers, as one string with a line per row.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LayerData {
    Csv(String),
    Tiles(Vec<serde_json::Value>),
}

/// Tiled tileset (`.tsj`); only per-tile properties are kept.
#[derive(Debug, Deserialize)]
pub struct TiledTileset {
    #[serde(default)]
    pub tiles: Vec<TiledTile>,
}

#[derive(Debug, Deserialize)]
pub struct TiledTile {
    pub id: usize,
    #[serde(default)]
    pub properties: Vec<TiledProperty>,
}

/// ─────────────────────────────────────────────────────
/// Grid types
/// ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub fn new(x: usize, y: usize) -> Self {
        GridCoord { x, y }
    }

    /// Neighbouring cell one step in `dir`, or `None` past the grid edge.
    pub fn step(self, dir: Direction) -> Option<GridCoord> {
        let (x, y) = match dir {
            Direction::Up => (Some(self.x), self.y.checked_sub(1)),
            Direction::Down => (Some(self.x), self.y.checked_add(1)),
            Direction::Left => (self.x.checked_sub(1), Some(self.y)),
            Direction::Right => (self.x.checked_add(1), Some(self.y)),
        };
        match (x, y) {
            (Some(x), Some(y)) if x < WORLD_MAX_SIZE && y < WORLD_MAX_SIZE => {
                Some(GridCoord { x, y })
            }
            _ => None,
        }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order used for exit bytes in the screen record.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exits {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Exits {
    pub fn is_set(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// What a screen source hands back for one map file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenData {
    pub name: String,
    pub exits: Exits,
    pub rows: TileRows,
}

/// A screen placed on the grid. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub coord: GridCoord,
    pub file: String,
    pub name: String,
    pub exits: Exits,
    pub rows: TileRows,
}

/// Fixed-size per-screen record: own number followed by the four exit
/// bytes (0 = no exit, otherwise target index + 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenRecord {
    pub number: u8,
    pub up: u8,
    pub down: u8,
    pub left: u8,
    pub right: u8,
}

impl ScreenRecord {
    pub const SIZE: usize = 5;

    /// Slot 0 is reserved for the title page.
    pub const TITLE: ScreenRecord = ScreenRecord {
        number: 0,
        up: 0,
        down: 0,
        left: 0,
        right: 0,
    };

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [self.number, self.up, self.down, self.left, self.right]
    }
}

/// One screen ready for the writers: encoded rows in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedScreen {
    pub number: u8,
    pub name: String,
    pub rows: Vec<Vec<u8>>,
}

/// Fully processed output handed to `writer`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedWorld {
    /// Title record first, then one record per screen in discovery order.
    pub records: Vec<ScreenRecord>,
    pub screens: Vec<ProcessedScreen>,
    pub packed: bool,
}

impl ProcessedWorld {
    /// Screen count as the engine sees it, title page included.
    pub fn num_screens(&self) -> usize {
        self.records.len()
    }
}
