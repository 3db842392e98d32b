//! Плавный переход местности к застраиваемому ядру вокруг баз.

use crate::config::MapConfig;
use crate::surface::{SurfaceCell, SurfaceMap, TerrainCategory};
use crate::types::{StartPosition, distance};

/// Ядро базы — всегда песок, помечается `cleared_for_base`.
/// Кольцо до `min_base_clearance + 6` смешивается к песку по мере приближения к центру.
pub fn smooth_base_transitions(
    config: &MapConfig,
    starts: &[StartPosition],
    surface: &mut SurfaceMap,
) {
    let core = (config.min_base_clearance - 2.0).max(1.0);
    let outer = config.min_base_clearance + 6.0;
    let reach = outer.ceil() as i64;

    let mut cleared = 0usize;
    for start in starts {
        for_each_within(surface, start.center(), reach, |cell, d| {
            if d <= core && !cell.cleared_for_base {
                cell.set_category(TerrainCategory::Sand);
                cell.cleared_for_base = true;
                cleared += 1;
            }
        });
    }

    let mut blended = 0usize;
    for start in starts {
        for_each_within(surface, start.center(), reach, |cell, d| {
            if cell.cleared_for_base || d <= core || d > outer {
                return;
            }
            let blend = (d - core) / (outer - core);
            let target = if cell.category.is_water() || blend < 0.25 {
                TerrainCategory::Sand
            } else if blend < 0.5 {
                TerrainCategory::DarkSand
            } else {
                return;
            };
            cell.set_category(target);
            blended += 1;
        });
    }

    tracing::debug!(
        target: "skirmish_mapgen::transition",
        cleared,
        blended,
        "mapgen.transition.smoothed"
    );
}

fn for_each_within(
    surface: &mut SurfaceMap,
    center: (f32, f32),
    reach: i64,
    mut visit: impl FnMut(&mut SurfaceCell, f32),
) {
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    for y in cy - reach..=cy + reach {
        for x in cx - reach..=cx + reach {
            if !surface.contains(x, y) {
                continue;
            }
            let d = distance((x as f32, y as f32), center);
            visit(surface.get_mut(x as usize, y as usize), d);
        }
    }
}
