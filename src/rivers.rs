//! Реки: русла от краёв карты, изогнутые шумом.

use crate::config::MapConfig;
use crate::noise::NoiseProvider;
use crate::rng::MapRng;
use crate::surface::{SurfaceMap, TerrainCategory};
use crate::types::{RiverPath, StartPosition, distance};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Шаг течения в клетках
const STEP: f32 = 1.2;
/// Вес шумового изгиба относительно ±45°
const BEND_WEIGHT: f32 = 0.3;
const MIN_RIVER_CELLS: usize = 10;

/// Прокладывает реки от краёв карты и вырезает их в поверхности.
///
/// Река останавливается на выходе за границы или у радиуса безопасности базы.
/// Вырезанные клетки безусловно становятся водой, какой бы ни была категория раньше.
pub fn carve_rivers<N: NoiseProvider + ?Sized>(
    config: &MapConfig,
    noise: &N,
    starts: &[StartPosition],
    surface: &mut SurfaceMap,
    rng: &mut MapRng,
) -> Vec<RiverPath> {
    let count = config.rows.min(config.cols) / 15;
    let mut rivers = Vec::with_capacity(count);

    for index in 0..count {
        let along = rng.range_f32(0.2, 0.8);
        let cells = trace_river(config, noise, starts, index, along);
        if cells.len() < MIN_RIVER_CELLS {
            tracing::debug!(
                target: "skirmish_mapgen::rivers",
                index,
                length = cells.len(),
                "mapgen.rivers.too_short"
            );
            continue;
        }

        let width = rng.range_inclusive(1, 2);
        carve(surface, &cells, width);
        rivers.push(RiverPath { cells, width });
    }

    tracing::debug!(
        target: "skirmish_mapgen::rivers",
        requested = count,
        carved = rivers.len(),
        "mapgen.rivers.carved"
    );
    rivers
}

/// Путь реки номер `index`; край выбирается по номеру: верх, право, низ, лево
fn trace_river<N: NoiseProvider + ?Sized>(
    config: &MapConfig,
    noise: &N,
    starts: &[StartPosition],
    index: usize,
    along: f32,
) -> Vec<(usize, usize)> {
    let (w, h) = (config.cols as f32, config.rows as f32);
    let (mut x, mut y, mut heading) = match index % 4 {
        0 => (along * w, 0.0, FRAC_PI_2),
        1 => (w - 1.0, along * h, PI),
        2 => (along * w, h - 1.0, -FRAC_PI_2),
        _ => (0.0, along * h, 0.0),
    };
    // Смещение выборки, чтобы реки не повторяли друг друга
    let lane = index as f32 * 173.0;

    let max_steps = 2 * (config.rows + config.cols);
    let mut cells: Vec<(usize, usize)> = Vec::new();
    for _ in 0..max_steps {
        if x < 0.0 || y < 0.0 || x >= w || y >= h {
            break;
        }
        let cell = (x.floor() as usize, y.floor() as usize);
        let here = (cell.0 as f32, cell.1 as f32);
        if starts
            .iter()
            .any(|s| distance(here, s.center()) < config.min_base_clearance)
        {
            break;
        }
        if cells.last() != Some(&cell) {
            cells.push(cell);
        }

        let bend = noise.sample(x + lane, y, config.river_noise_scale) * FRAC_PI_4 * BEND_WEIGHT;
        heading += bend;
        x += heading.cos() * STEP;
        y += heading.sin() * STEP;
    }
    cells
}

/// Центральная полоса шириной в половину — глубокая вода, остальное — мелководье
fn carve(surface: &mut SurfaceMap, cells: &[(usize, usize)], width: usize) {
    let w = width as i64;
    let half = width as f32 / 2.0;
    for &(cx, cy) in cells {
        for dy in -w..=w {
            for dx in -w..=w {
                let (x, y) = (cx as i64 + dx, cy as i64 + dy);
                if !surface.contains(x, y) {
                    continue;
                }
                let d = (dx as f32).hypot(dy as f32);
                if d > width as f32 {
                    continue;
                }
                let cell = surface.get_mut(x as usize, y as usize);
                // Глубокая вода не мелеет от соседнего участка того же русла
                if d <= half {
                    cell.set_category(TerrainCategory::DeepWater);
                } else if cell.category != TerrainCategory::DeepWater || !cell.river {
                    cell.set_category(TerrainCategory::Water);
                }
                cell.river = true;
            }
        }
    }
}
