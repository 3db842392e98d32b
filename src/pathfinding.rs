//! Поиск пути по сетке местности для проверки связности баз.

use crate::grid::CellGrid;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Параметры поиска пути
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOptions {
    /// Разрешить диагональные шаги (без срезания углов)
    pub diagonal: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self { diagonal: true }
    }
}

/// Поиск пути по сетке. Пустой результат означает «недостижимо».
pub trait Pathfinder {
    fn find_path(
        &self,
        grid: &CellGrid,
        start: (f32, f32),
        end: (f32, f32),
        options: &PathOptions,
    ) -> Vec<(usize, usize)>;
}

/// A* по графу проходимых клеток
#[derive(Debug, Clone, Copy, Default)]
pub struct GridPathfinder;

/// Граф клеток: узел `row * cols + col`, рёбра только между проходимыми соседями
pub fn build_walk_graph(grid: &CellGrid, diagonal: bool) -> UnGraph<(usize, usize), f32> {
    let (rows, cols) = (grid.rows, grid.cols);
    let mut graph = UnGraph::with_capacity(rows * cols, rows * cols * 4);
    for row in 0..rows {
        for col in 0..cols {
            graph.add_node((row, col));
        }
    }
    let node = |row: usize, col: usize| NodeIndex::new(row * cols + col);

    for row in 0..rows {
        for col in 0..cols {
            if !grid.is_walkable(row, col) {
                continue;
            }
            if col + 1 < cols && grid.is_walkable(row, col + 1) {
                graph.add_edge(node(row, col), node(row, col + 1), 1.0);
            }
            if row + 1 < rows && grid.is_walkable(row + 1, col) {
                graph.add_edge(node(row, col), node(row + 1, col), 1.0);
            }
            if !diagonal || row + 1 >= rows {
                continue;
            }
            // Диагональ только если обе соседние ортогональные клетки свободны
            if col + 1 < cols
                && grid.is_walkable(row + 1, col + 1)
                && grid.is_walkable(row, col + 1)
                && grid.is_walkable(row + 1, col)
            {
                graph.add_edge(node(row, col), node(row + 1, col + 1), std::f32::consts::SQRT_2);
            }
            if col > 0
                && grid.is_walkable(row + 1, col - 1)
                && grid.is_walkable(row, col - 1)
                && grid.is_walkable(row + 1, col)
            {
                graph.add_edge(node(row, col), node(row + 1, col - 1), std::f32::consts::SQRT_2);
            }
        }
    }
    graph
}

impl Pathfinder for GridPathfinder {
    fn find_path(
        &self,
        grid: &CellGrid,
        start: (f32, f32),
        end: (f32, f32),
        options: &PathOptions,
    ) -> Vec<(usize, usize)> {
        let (Some(from), Some(to)) = (grid.world_to_cell(start), grid.world_to_cell(end)) else {
            return Vec::new();
        };
        if !grid.is_walkable(from.0, from.1) || !grid.is_walkable(to.0, to.1) {
            return Vec::new();
        }

        let graph = build_walk_graph(grid, options.diagonal);
        let start_node = NodeIndex::new(from.0 * grid.cols + from.1);
        let goal = NodeIndex::new(to.0 * grid.cols + to.1);
        let estimate = |n: NodeIndex| {
            let (row, col) = graph[n];
            (row as f32 - to.0 as f32).hypot(col as f32 - to.1 as f32)
        };

        astar(&graph, start_node, |n| n == goal, |e| *e.weight(), estimate)
            .map(|(_, nodes)| nodes.into_iter().map(|n| graph[n]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridCell, TerrainSink};

    fn wall_grid(gap: Option<usize>) -> CellGrid {
        let mut grid = CellGrid::new(10, 10, 10);
        for row in 0..10 {
            if Some(row) != gap {
                grid.set_cell(
                    row,
                    5,
                    GridCell {
                        blocked: true,
                        buildable: false,
                        ..GridCell::default()
                    },
                );
            }
        }
        grid
    }

    #[test]
    fn open_grid_has_path() {
        let grid = CellGrid::new(10, 10, 10);
        let path = GridPathfinder.find_path(&grid, (5.0, 5.0), (95.0, 95.0), &PathOptions::default());
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(9, 9)));
        // 10 клеток по диагонали
        assert_eq!(path.len(), 10);
    }

    #[test]
    fn wall_blocks_and_gap_opens() {
        let closed = wall_grid(None);
        let options = PathOptions { diagonal: false };
        assert!(GridPathfinder
            .find_path(&closed, (5.0, 5.0), (95.0, 5.0), &options)
            .is_empty());

        let open = wall_grid(Some(7));
        let path = GridPathfinder.find_path(&open, (5.0, 5.0), (95.0, 5.0), &options);
        assert!(path.contains(&(7, 5)));
    }

    #[test]
    fn blocked_endpoints_and_outside_points_are_unreachable() {
        let grid = wall_grid(None);
        let options = PathOptions::default();
        assert!(GridPathfinder
            .find_path(&grid, (55.0, 5.0), (5.0, 5.0), &options)
            .is_empty());
        assert!(GridPathfinder
            .find_path(&grid, (-5.0, 5.0), (5.0, 5.0), &options)
            .is_empty());
    }
}
