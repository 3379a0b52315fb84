//! Error types for the world exporter.
//!
//! Every variant is fatal: the pipeline stops at the first one and no output
//! file is written.

use std::path::PathBuf;

use crate::model::{Direction, GridCoord};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A screen's declared size is not the fixed screen size.
    #[error("{file}: screen is {width}x{height}, expected {expected_w}x{expected_h}")]
    Dimension {
        file: String,
        width: i32,
        height: i32,
        expected_w: i32,
        expected_h: i32,
    },

    #[error("{file}: world position ({x}, {y}) is not a multiple of the screen size")]
    MisalignedScreen { file: String, x: i32, y: i32 },

    #[error("{file}: grid coordinate ({grid_x}, {grid_y}) is outside the world")]
    OutOfBounds {
        file: String,
        grid_x: i64,
        grid_y: i64,
    },

    /// Two descriptors resolved to the same grid cell.
    #[error("screen used more than once: {file} overlaps {existing} at {at}")]
    DuplicatePlacement {
        file: String,
        existing: String,
        at: GridCoord,
    },

    #[error("screen `{screen}` has an exit {direction} but no screen is placed there")]
    DanglingExit { screen: String, direction: Direction },

    #[error("no screen at {0}")]
    NotFound(GridCoord),

    #[error("screen index {0} does not fit in a byte")]
    TooManyScreens(usize),

    #[error("malformed row: {0}")]
    MalformedRow(String),

    #[error("{file}: expected {expected} tile rows, got {found}")]
    RowCount {
        file: String,
        expected: usize,
        found: usize,
    },

    #[error("tile flag table: {0}")]
    FlagTable(String),

    #[error("{0}: no `Tile Layer` found")]
    MissingBaseLayer(String),

    #[error("world has no screens")]
    NoScreens,

    /// Consistency check inside the row codec; never caused by input data.
    #[error("unexpected byte {byte:#04x} at column {column}")]
    UnexpectedByte { byte: u8, column: usize },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
