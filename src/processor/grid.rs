//! World grid: places every screen of the world file on a fixed 256×256
//! grid and numbers them in discovery order.

use tracing::debug;

use crate::error::{ExportError, Result};
use crate::model::{
    GRID_ORIGIN, GridCoord, SCREEN_H, SCREEN_W, Screen, ScreenData, ScreenDescriptor,
    WORLD_MAX_SIZE,
};

/// Where the builder gets a screen's name, exits and tiles from.
pub trait ScreenSource {
    fn load(&self, descriptor: &ScreenDescriptor) -> Result<ScreenData>;
}

impl<F> ScreenSource for F
where
    F: Fn(&ScreenDescriptor) -> Result<ScreenData>,
{
    fn load(&self, descriptor: &ScreenDescriptor) -> Result<ScreenData> {
        self(descriptor)
    }
}

/// Fixed-size grid of screens. A cell is occupied when it holds a screen.
///
/// Cells are stored row-major (`y * WORLD_MAX_SIZE + x`), so walking the
/// vector front to back is the discovery order: outer loop over `y`,
/// inner loop over `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldGrid {
    cells: Vec<Option<Box<Screen>>>,
    occupied: usize,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldGrid {
    pub fn new() -> Self {
        WorldGrid {
            cells: vec![None; WORLD_MAX_SIZE * WORLD_MAX_SIZE],
            occupied: 0,
        }
    }

    fn slot(coord: GridCoord) -> usize {
        coord.y * WORLD_MAX_SIZE + coord.x
    }

    pub fn get(&self, coord: GridCoord) -> Option<&Screen> {
        if coord.x >= WORLD_MAX_SIZE || coord.y >= WORLD_MAX_SIZE {
            return None;
        }
        self.cells[Self::slot(coord)].as_deref()
    }

    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Place `screen` at its own coordinate. A cell takes one screen only.
    pub fn insert(&mut self, screen: Screen) -> Result<()> {
        let coord = screen.coord;
        if coord.x >= WORLD_MAX_SIZE || coord.y >= WORLD_MAX_SIZE {
            return Err(ExportError::OutOfBounds {
                file: screen.file,
                grid_x: coord.x as i64,
                grid_y: coord.y as i64,
            });
        }

        let cell = &mut self.cells[Self::slot(coord)];
        if let Some(existing) = cell {
            return Err(ExportError::DuplicatePlacement {
                file: screen.file,
                existing: existing.file.clone(),
                at: coord,
            });
        }
        *cell = Some(Box::new(screen));
        self.occupied += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Occupied screens in discovery order.
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.cells.iter().filter_map(|c| c.as_deref())
    }

    /// Discovery index of the screen at `coord`: the number of occupied
    /// cells that come before it in scan order.
    pub fn index_of(&self, coord: GridCoord) -> Result<usize> {
        self.screens()
            .position(|s| s.coord == coord)
            .ok_or(ExportError::NotFound(coord))
    }
}

/// Grid cell for a world position. Positions must sit on screen boundaries.
pub fn grid_coord(descriptor: &ScreenDescriptor) -> Result<GridCoord> {
    let (x, y) = (descriptor.x, descriptor.y);
    if x % SCREEN_W != 0 || y % SCREEN_H != 0 {
        return Err(ExportError::MisalignedScreen {
            file: descriptor.file_name.clone(),
            x,
            y,
        });
    }

    let grid_x = (x / SCREEN_W) as i64 + GRID_ORIGIN;
    let grid_y = (y / SCREEN_H) as i64 + GRID_ORIGIN;
    let range = 0..WORLD_MAX_SIZE as i64;
    if !range.contains(&grid_x) || !range.contains(&grid_y) {
        return Err(ExportError::OutOfBounds {
            file: descriptor.file_name.clone(),
            grid_x,
            grid_y,
        });
    }

    Ok(GridCoord::new(grid_x as usize, grid_y as usize))
}

/// Build the grid from the world file's map list. Any bad entry aborts the
/// whole build.
pub fn build_world<S>(descriptors: &[ScreenDescriptor], source: &S) -> Result<WorldGrid>
where
    S: ScreenSource + ?Sized,
{
    if descriptors.is_empty() {
        return Err(ExportError::NoScreens);
    }

    let mut grid = WorldGrid::new();

    for desc in descriptors {
        if desc.width != SCREEN_W || desc.height != SCREEN_H {
            return Err(ExportError::Dimension {
                file: desc.file_name.clone(),
                width: desc.width,
                height: desc.height,
                expected_w: SCREEN_W,
                expected_h: SCREEN_H,
            });
        }

        let coord = grid_coord(desc)?;
        if let Some(existing) = grid.get(coord) {
            return Err(ExportError::DuplicatePlacement {
                file: desc.file_name.clone(),
                existing: existing.file.clone(),
                at: coord,
            });
        }

        let data = source.load(desc)?;
        debug!(file = %desc.file_name, name = %data.name, %coord, "placing screen");

        grid.insert(Screen {
            coord,
            file: desc.file_name.clone(),
            name: data.name,
            exits: data.exits,
            rows: data.rows,
        })?;
    }

    Ok(grid)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Exits, ROW_WIDTH, SCREEN_ROWS};

    pub(crate) fn desc(file: &str, x: i32, y: i32) -> ScreenDescriptor {
        ScreenDescriptor {
            file_name: file.into(),
            width: SCREEN_W,
            height: SCREEN_H,
            x,
            y,
        }
    }

    /// Source that names each screen after its file and has no exits.
    pub(crate) fn blank_source(d: &ScreenDescriptor) -> Result<ScreenData> {
        Ok(ScreenData {
            name: d.file_name.trim_end_matches(".json").to_string(),
            exits: Exits::default(),
            rows: [[0; ROW_WIDTH]; SCREEN_ROWS],
        })
    }

    fn names(grid: &WorldGrid) -> Vec<String> {
        grid.screens().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_grid_coord_origin() {
        assert_eq!(grid_coord(&desc("a", 0, 0)).unwrap(), GridCoord::new(128, 128));
        assert_eq!(
            grid_coord(&desc("a", -128, 384)).unwrap(),
            GridCoord::new(127, 130)
        );
        assert_eq!(
            grid_coord(&desc("a", -128 * 128, -192 * 128)).unwrap(),
            GridCoord::new(0, 0)
        );
    }

    #[test]
    fn test_grid_coord_misaligned() {
        let err = grid_coord(&desc("a.json", 64, 0)).unwrap_err();
        assert!(matches!(err, ExportError::MisalignedScreen { .. }), "got {err}");

        let err = grid_coord(&desc("a.json", 0, 100)).unwrap_err();
        assert!(matches!(err, ExportError::MisalignedScreen { .. }), "got {err}");
    }

    #[test]
    fn test_grid_coord_out_of_bounds() {
        let err = grid_coord(&desc("a.json", 128 * 128, 0)).unwrap_err();
        assert!(matches!(err, ExportError::OutOfBounds { .. }), "got {err}");

        let err = grid_coord(&desc("a.json", 0, -192 * 129)).unwrap_err();
        assert!(matches!(err, ExportError::OutOfBounds { .. }), "got {err}");
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut bad = desc("wide.json", 0, 0);
        bad.width = 256;
        let err = build_world(&[desc("ok.json", 128, 0), bad], &blank_source).unwrap_err();
        assert!(
            err.to_string().starts_with("wide.json: screen is 256x192"),
            "got error message: {err}"
        );
    }

    #[test]
    fn test_duplicate_placement() {
        let err = build_world(
            &[desc("first.json", 0, 0), desc("second.json", 0, 0)],
            &blank_source,
        )
        .unwrap_err();

        match err {
            ExportError::DuplicatePlacement { file, existing, at } => {
                assert_eq!(file, "second.json");
                assert_eq!(existing, "first.json");
                assert_eq!(at, GridCoord::new(128, 128));
            }
            other => panic!("expected DuplicatePlacement, got {other}"),
        }
    }

    #[test]
    fn test_insert_rejects_occupied_cell() {
        let mut grid = WorldGrid::new();
        let screen = Screen {
            coord: GridCoord::new(3, 4),
            file: "a.json".into(),
            name: "a".into(),
            exits: Exits::default(),
            rows: [[0; ROW_WIDTH]; SCREEN_ROWS],
        };
        grid.insert(screen.clone()).unwrap();
        assert!(matches!(
            grid.insert(screen),
            Err(ExportError::DuplicatePlacement { .. })
        ));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_empty_world() {
        assert!(matches!(
            build_world(&[], &blank_source),
            Err(ExportError::NoScreens)
        ));
    }

    #[test]
    fn test_discovery_order_is_row_major() {
        // layout (x right, y down):
        //   c . d
        //   a b .
        let grid = build_world(
            &[
                desc("a.json", 0, 192),
                desc("d.json", 256, 0),
                desc("b.json", 128, 192),
                desc("c.json", 0, 0),
            ],
            &blank_source,
        )
        .unwrap();

        assert_eq!(names(&grid), vec!["c", "d", "a", "b"]);
        assert_eq!(grid.index_of(GridCoord::new(128, 128)).unwrap(), 0);
        assert_eq!(grid.index_of(GridCoord::new(129, 129)).unwrap(), 3);
    }

    #[test]
    fn test_discovery_order_ignores_input_order() {
        let mut descriptors = vec![
            desc("a.json", -128, 0),
            desc("b.json", 0, 0),
            desc("c.json", 0, -192),
            desc("d.json", 128, 192),
        ];
        let forward = build_world(&descriptors, &blank_source).unwrap();
        descriptors.reverse();
        let backward = build_world(&descriptors, &blank_source).unwrap();

        assert_eq!(names(&forward), names(&backward));
        assert_eq!(names(&forward), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_index_of_unoccupied() {
        let grid = build_world(&[desc("a.json", 0, 0)], &blank_source).unwrap();
        assert!(matches!(
            grid.index_of(GridCoord::new(0, 0)),
            Err(ExportError::NotFound(_))
        ));
    }

    #[test]
    fn test_source_error_aborts() {
        let failing = |d: &ScreenDescriptor| -> Result<ScreenData> {
            Err(ExportError::MissingBaseLayer(d.file_name.clone()))
        };
        assert!(matches!(
            build_world(&[desc("a.json", 0, 0)], &failing),
            Err(ExportError::MissingBaseLayer(_))
        ));
    }
}
