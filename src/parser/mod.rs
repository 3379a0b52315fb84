use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ExportError, Result};
use crate::model::{
    Exits, LayerData, ROW_WIDTH, SCREEN_ROWS, ScreenData, ScreenDescriptor, TileRow, TileRows,
    TiledLayer, TiledMap, TiledProperty, TiledTileset, World,
};
use crate::processor::grid::ScreenSource;
use crate::processor::tile_flags::{TileFlagConfig, TileFlagTable};

/// Prefix of the layer that holds the screen's tiles.
pub const BASE_LAYER_PREFIX: &str = "Tile Layer";

/// Read and deserialize one JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "file loaded");
    serde_json::from_str(&text).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the world file. The map list keeps the file's order; placement on
/// the grid decides the final numbering.
pub fn read_world(path: &Path) -> Result<World> {
    let world: World = read_json(path)?;
    if world.maps.is_empty() {
        return Err(ExportError::NoScreens);
    }
    info!(path = %path.display(), maps = world.maps.len(), "world loaded");
    Ok(world)
}

/// Flag table from a JSON table file (see [`TileFlagConfig`]).
pub fn read_tile_flags(path: &Path) -> Result<TileFlagTable> {
    let config: TileFlagConfig = read_json(path)?;
    TileFlagTable::from_config(&config)
}

/// Flag table from a Tiled tileset's tile properties.
pub fn read_tileset(path: &Path) -> Result<TileFlagTable> {
    let tileset: TiledTileset = read_json(path)?;
    debug!(tiles = tileset.tiles.len(), "tileset parsed");
    TileFlagTable::from_tileset(&tileset)
}

/// Loads screens from Tiled JSON maps that live next to the world file.
#[derive(Debug, Clone)]
pub struct TiledScreenSource {
    base_dir: PathBuf,
}

impl TiledScreenSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        TiledScreenSource {
            base_dir: base_dir.into(),
        }
    }

    /// Source rooted at the directory holding `world_path`.
    pub fn for_world(world_path: &Path) -> Self {
        Self::new(world_path.parent().unwrap_or_else(|| Path::new(".")))
    }
}

impl ScreenSource for TiledScreenSource {
    fn load(&self, descriptor: &ScreenDescriptor) -> Result<ScreenData> {
        let path = self.base_dir.join(&descriptor.file_name);
        let map: TiledMap = read_json(&path)?;
        parse_screen(&map, &descriptor.file_name)
    }
}

/// Pull the name, exit flags and 12×8 tile rows out of a parsed map.
///
/// Map properties used:
///   • `name`  – string, defaults to the file stem
///   • `exitUp`, `exitDown`, `exitLeft`, `exitRight` – bool, default false
pub fn parse_screen(map: &TiledMap, file: &str) -> Result<ScreenData> {
    let props = &map.properties;

    let name = find_property(props, "name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            Path::new(file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.to_string())
        });

    let exits = Exits {
        up: bool_property(props, "exitUp"),
        down: bool_property(props, "exitDown"),
        left: bool_property(props, "exitLeft"),
        right: bool_property(props, "exitRight"),
    };

    let layer = base_layer(map).ok_or_else(|| ExportError::MissingBaseLayer(file.to_string()))?;
    let rows = layer_rows(layer, file)?;

    Ok(ScreenData { name, exits, rows })
}

fn find_property<'a>(props: &'a [TiledProperty], name: &str) -> Option<&'a Value> {
    props.iter().find(|p| p.name == name).map(|p| &p.value)
}

/// Tiled writes bools as JSON bools; older files carry the string form.
fn bool_property(props: &[TiledProperty], name: &str) -> bool {
    match find_property(props, name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(other) => {
            warn!(property = name, value = %other, "ignoring non-boolean exit property");
            false
        }
        None => false,
    }
}

fn base_layer(map: &TiledMap) -> Option<&TiledLayer> {
    let layer = map
        .layers
        .iter()
        .find(|l| l.name.starts_with(BASE_LAYER_PREFIX) && l.data.is_some())?;
    debug!(layer = %layer.name, kind = %layer.kind, "using base layer");
    Some(layer)
}

fn layer_rows(layer: &TiledLayer, file: &str) -> Result<TileRows> {
    let rows: Vec<TileRow> = match &layer.data {
        Some(LayerData::Csv(text)) => csv_rows(text)?,
        Some(LayerData::Tiles(values)) => {
            let width = if layer.width == 0 {
                ROW_WIDTH
            } else {
                layer.width
            };
            values
                .chunks(width)
                .map(|chunk| {
                    let tiles = chunk.iter().map(tile_value).collect::<Result<Vec<u8>>>()?;
                    to_row(&tiles)
                })
                .collect::<Result<_>>()?
        }
        None => Vec::new(),
    };

    let found = rows.len();
    rows.try_into().map_err(|_| ExportError::RowCount {
        file: file.to_string(),
        expected: SCREEN_ROWS,
        found,
    })
}

/// CSV layer data: one row per line, Tiled leaves a trailing comma on every
/// line but the last.
fn csv_rows(text: &str) -> Result<Vec<TileRow>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let tiles = line
                .strip_suffix(',')
                .unwrap_or(line)
                .split(',')
                .map(|field| {
                    let field = field.trim();
                    field.parse::<u8>().map_err(|_| {
                        ExportError::MalformedRow(format!("`{field}` is not a tile value"))
                    })
                })
                .collect::<Result<Vec<u8>>>()?;
            to_row(&tiles)
        })
        .collect()
}

fn tile_value(value: &Value) -> Result<u8> {
    value
        .as_u64()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| ExportError::MalformedRow(format!("`{value}` is not a tile value")))
}

fn to_row(tiles: &[u8]) -> Result<TileRow> {
    tiles.try_into().map_err(|_| {
        ExportError::MalformedRow(format!(
            "expected {ROW_WIDTH} tiles, got {}",
            tiles.len()
        ))
    })
}
