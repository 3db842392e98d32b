//! Запись готовой карты в сетку местности.
//!
//! Внешняя сетка служит только приёмником ([`TerrainSink`]). Внутри попытки карта
//! собирается в [`CellGrid`], по которому идёт проверка связности; во внешний
//! приёмник пишется только итоговая карта.

use crate::rng::MapRng;
use crate::surface::{SurfaceMap, TerrainCategory};
use crate::types::{ResourceField, ResourceKind, TerrainFeature, distance};
use serde::{Deserialize, Serialize};

/// Состояние одной клетки сетки местности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub blocked: bool,
    pub buildable: bool,
    pub terrain: TerrainCategory,
    pub has_resource: bool,
    pub resource_amount: u32,
    pub resource_kind: Option<ResourceKind>,
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            blocked: false,
            buildable: true,
            terrain: TerrainCategory::Sand,
            has_resource: false,
            resource_amount: 0,
            resource_kind: None,
        }
    }
}

/// Приёмник готовой карты; генератор из него не читает
pub trait TerrainSink {
    fn set_surface_map(&mut self, surface: &SurfaceMap);
    fn set_cell(&mut self, row: usize, col: usize, cell: GridCell);
}

/// Сетка в памяти: черновик попытки и простая реализация приёмника
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: u32,
    pub cells: Vec<GridCell>,
    #[serde(skip)]
    pub surface: Option<SurfaceMap>,
}

impl CellGrid {
    #[must_use]
    pub fn new(rows: usize, cols: usize, cell_size: u32) -> Self {
        Self {
            rows,
            cols,
            cell_size,
            cells: vec![GridCell::default(); rows * cols],
            surface: None,
        }
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> &GridCell {
        &self.cells[row * self.cols + col]
    }

    #[must_use]
    pub fn is_walkable(&self, row: usize, col: usize) -> bool {
        !self.get(row, col).blocked
    }

    /// Клетка (row, col) под мировой точкой, если она внутри сетки
    #[must_use]
    pub fn world_to_cell(&self, world: (f32, f32)) -> Option<(usize, usize)> {
        let size = self.cell_size as f32;
        let (col, row) = ((world.0 / size).floor(), (world.1 / size).floor());
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Переписывает всё содержимое во внешний приёмник
    pub fn write_into<S: TerrainSink + ?Sized>(&self, sink: &mut S) {
        if let Some(surface) = &self.surface {
            sink.set_surface_map(surface);
        }
        for row in 0..self.rows {
            for col in 0..self.cols {
                sink.set_cell(row, col, *self.get(row, col));
            }
        }
    }
}

impl TerrainSink for CellGrid {
    fn set_surface_map(&mut self, surface: &SurfaceMap) {
        self.surface = Some(surface.clone());
    }

    fn set_cell(&mut self, row: usize, col: usize, cell: GridCell) {
        self.cells[row * self.cols + col] = cell;
    }
}

/// Записывает поверхность, препятствия и ресурсы в приёмник.
///
/// Клетки ресурсных полей заполняются случайно с вероятностью плотности поля;
/// на воде и под препятствиями ресурсов не бывает.
pub fn apply_to_grid<S: TerrainSink + ?Sized>(
    sink: &mut S,
    surface: &SurfaceMap,
    features: &[TerrainFeature],
    fields: &[ResourceField],
    rng: &mut MapRng,
) {
    let mut cells: Vec<GridCell> = surface
        .cells
        .iter()
        .map(|c| GridCell {
            blocked: c.blocked,
            buildable: c.buildable,
            terrain: c.category,
            ..GridCell::default()
        })
        .collect();
    let cols = surface.cols;

    for feature in features {
        for (x, y) in feature.cells() {
            let cell = &mut cells[y * cols + x];
            cell.blocked = true;
            cell.buildable = false;
        }
    }

    let mut stamped = 0usize;
    for field in fields {
        let r = field.radius;
        let (cx, cy) = (field.grid_x, field.grid_y);
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                if distance((x as f32, y as f32), field.center()) > r as f32 {
                    continue;
                }
                // Бросок делается для каждой клетки круга, чтобы поток не зависел от местности
                let filled = rng.chance(field.density);
                let cell = &mut cells[y * cols + x];
                if filled && !cell.blocked {
                    cell.has_resource = true;
                    cell.resource_amount = field.resource.cell_amount();
                    cell.resource_kind = Some(field.resource);
                    stamped += 1;
                }
            }
        }
    }

    sink.set_surface_map(surface);
    for (i, cell) in cells.into_iter().enumerate() {
        sink.set_cell(i / cols, i % cols, cell);
    }

    tracing::debug!(
        target: "skirmish_mapgen::grid",
        features = features.len(),
        fields = fields.len(),
        stamped,
        "mapgen.grid.applied"
    );
}
