// src/chokepoints.rs
//! Узкие проходы между базами.

use crate::config::MapConfig;
use crate::rng::MapRng;
use crate::surface::{SurfaceMap, TerrainCategory};
use crate::types::{ChokePoint, StartPosition};

/// Отступ центра прохода от краёв карты
const EDGE_MARGIN: f32 = 2.0;
/// Максимальный сдвиг поперёк оси база–база
const MAX_LATERAL: f32 = 4.0;

/// Вырезает 2–4 узких гарантированно проходимых коридора между первыми двумя базами.
///
/// Каждая клетка коридора безусловно становится песком и помечается `choke`.
pub fn inject_choke_points(
    config: &MapConfig,
    starts: &[StartPosition],
    surface: &mut SurfaceMap,
    rng: &mut MapRng,
) -> Vec<ChokePoint> {
    let [a, b, ..] = starts else {
        return Vec::new();
    };
    let (from, to) = (a.center(), b.center());
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let angle = dy.atan2(dx);
    let length = dx.hypot(dy).max(f32::EPSILON);
    // Единичная нормаль к оси
    let normal = (-dy / length, dx / length);

    let count = rng.range_inclusive(2, 4);
    let mut chokes = Vec::with_capacity(count);
    for i in 0..count {
        let t = (i + 1) as f32 / (count + 1) as f32 + rng.range_f32(-0.1, 0.1);
        let lateral = rng.range_f32(-MAX_LATERAL, MAX_LATERAL);
        let x = (from.0 + dx * t + normal.0 * lateral)
            .clamp(EDGE_MARGIN, config.cols as f32 - 1.0 - EDGE_MARGIN);
        let y = (from.1 + dy * t + normal.1 * lateral)
            .clamp(EDGE_MARGIN, config.rows as f32 - 1.0 - EDGE_MARGIN);

        let mut choke = ChokePoint {
            grid_x: x.round() as usize,
            grid_y: y.round() as usize,
            width: rng.range_inclusive(3, 4),
            length: rng.range_inclusive(4, 6),
            angle,
            cleared: false,
        };
        let carved = carve_corridor(surface, &choke);
        choke.cleared = true;
        tracing::debug!(
            target: "skirmish_mapgen::chokepoints",
            x = choke.grid_x,
            y = choke.grid_y,
            width = choke.width,
            length = choke.length,
            carved,
            "mapgen.chokepoints.carved"
        );
        chokes.push(choke);
    }
    chokes
}

/// Повёрнутый прямоугольник `length × width` вдоль оси прохода
fn carve_corridor(surface: &mut SurfaceMap, choke: &ChokePoint) -> usize {
    let (cos, sin) = (choke.angle.cos(), choke.angle.sin());
    let half_len = choke.length as f32 / 2.0;
    let half_width = choke.width as f32 / 2.0;
    let reach = half_len.max(half_width).ceil() as i64 + 1;
    let (cx, cy) = (choke.grid_x as i64, choke.grid_y as i64);

    let mut carved = 0;
    for y in cy - reach..=cy + reach {
        for x in cx - reach..=cx + reach {
            if !surface.contains(x, y) {
                continue;
            }
            let (ox, oy) = ((x - cx) as f32, (y - cy) as f32);
            // Переход в систему координат прохода
            let along = ox * cos + oy * sin;
            let across = -ox * sin + oy * cos;
            if along.abs() <= half_len && across.abs() <= half_width {
                let cell = surface.get_mut(x as usize, y as usize);
                cell.set_category(TerrainCategory::Sand);
                cell.choke = true;
                carved += 1;
            }
        }
    }
    carved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceCell;

    fn water_world(config: &MapConfig) -> SurfaceMap {
        SurfaceMap {
            rows: config.rows,
            cols: config.cols,
            cells: vec![SurfaceCell::new(TerrainCategory::DeepWater, 0.99); config.rows * config.cols],
        }
    }

    fn two_bases() -> Vec<StartPosition> {
        vec![
            StartPosition::new(0, 3, 24, 32),
            StartPosition::new(1, 34, 3, 32),
        ]
    }

    #[test]
    fn chokes_are_carved_walkable_inside_margin() {
        let config = MapConfig::default();
        for seed in 0..20 {
            let mut surface = water_world(&config);
            let chokes =
                inject_choke_points(&config, &two_bases(), &mut surface, &mut MapRng::new(seed));
            assert!((2..=4).contains(&chokes.len()));
            for choke in &chokes {
                assert!(choke.cleared);
                assert!((3..=4).contains(&choke.width));
                assert!((4..=6).contains(&choke.length));
                assert!(choke.grid_x >= 2 && choke.grid_x <= config.cols - 3);
                assert!(choke.grid_y >= 2 && choke.grid_y <= config.rows - 3);
                let center = surface.get(choke.grid_x, choke.grid_y);
                assert!(center.choke && center.walkable && center.buildable);
                assert_eq!(center.category, TerrainCategory::Sand);
            }
            // Всё, что помечено как проход, проходимо
            assert!(surface
                .cells
                .iter()
                .filter(|c| c.choke)
                .all(|c| c.walkable && !c.blocked));
        }
    }

    #[test]
    fn corridor_area_matches_rectangle() {
        let config = MapConfig::default();
        let mut surface = water_world(&config);
        let choke = ChokePoint {
            grid_x: 20,
            grid_y: 15,
            width: 3,
            length: 5,
            angle: 0.0,
            cleared: false,
        };
        // Без поворота: |dx| ≤ 2.5, |dy| ≤ 1.5 → 5 × 3 клеток
        assert_eq!(carve_corridor(&mut surface, &choke), 15);
    }

    #[test]
    fn single_base_gets_no_chokes() {
        let config = MapConfig::default();
        let mut surface = water_world(&config);
        let starts = vec![StartPosition::new(0, 3, 24, 32)];
        assert!(inject_choke_points(&config, &starts, &mut surface, &mut MapRng::new(1)).is_empty());
    }
}
