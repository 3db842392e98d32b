//! Прямые коридоры между базами, в которых нельзя ставить препятствия.

use crate::config::{BASE_FOOTPRINT, MapConfig};
use crate::types::{StartPosition, distance};
use serde::{Deserialize, Serialize};

/// Ширина коридора в клетках
pub const PATH_WIDTH: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearPath {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub width: f32,
}

impl ClearPath {
    /// Точка ближе `width` к отрезку считается лежащей на пути
    #[must_use]
    pub fn contains(&self, point: (f32, f32)) -> bool {
        point_segment_distance(point, self.from, self.to) < self.width
    }
}

/// Расстояние от точки до отрезка через проекцию, зажатую в [0, 1]
#[must_use]
pub fn point_segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return distance(p, a);
    }
    let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0);
    distance(p, (a.0 + abx * t, a.1 + aby * t))
}

/// Угол основания, ближайший к центру карты
fn interior_corner(config: &MapConfig, start: &StartPosition) -> (f32, f32) {
    let center = (config.cols as f32 / 2.0, config.rows as f32 / 2.0);
    let (x0, y0) = (start.grid_x as f32, start.grid_y as f32);
    let side = BASE_FOOTPRINT as f32;
    [(x0, y0), (x0 + side, y0), (x0, y0 + side), (x0 + side, y0 + side)]
        .into_iter()
        .min_by(|a, b| distance(*a, center).total_cmp(&distance(*b, center)))
        .unwrap_or((x0, y0))
}

/// Коридоры для каждой пары баз
#[must_use]
pub fn compute_clear_paths(config: &MapConfig, starts: &[StartPosition]) -> Vec<ClearPath> {
    let mut paths = Vec::new();
    for (i, a) in starts.iter().enumerate() {
        for b in &starts[i + 1..] {
            paths.push(ClearPath {
                from: interior_corner(config, a),
                to: interior_corner(config, b),
                width: PATH_WIDTH,
            });
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_clamps_to_segment_ends() {
        let (a, b) = ((0.0, 0.0), (10.0, 0.0));
        assert!((point_segment_distance((5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        assert!((point_segment_distance((-3.0, 4.0), a, b) - 5.0).abs() < 1e-5);
        assert!((point_segment_distance((13.0, 4.0), a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn one_path_per_base_pair() {
        let config = MapConfig::default();
        let starts: Vec<_> = [(3, 24), (34, 3), (3, 3), (34, 24)]
            .into_iter()
            .enumerate()
            .map(|(id, (x, y))| StartPosition::new(id, x, y, 32))
            .collect();
        assert_eq!(compute_clear_paths(&config, &starts).len(), 6);
    }

    #[test]
    fn corridor_runs_between_inner_corners() {
        let config = MapConfig::default();
        let starts = vec![
            StartPosition::new(0, 3, 24, 32),
            StartPosition::new(1, 34, 3, 32),
        ];
        let paths = compute_clear_paths(&config, &starts);
        assert_eq!(paths[0].from, (6.0, 24.0));
        assert_eq!(paths[0].to, (34.0, 6.0));
        assert!(paths[0].contains((20.0, 15.0)));
        assert!(!paths[0].contains((5.0, 5.0)));
    }
}
