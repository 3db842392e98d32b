//! Зоны экспансии: вторичные площадки для застройки на средней дистанции от баз.

use crate::config::MapConfig;
use crate::resources::{FIELD_GAP, field_fits, in_bounds};
use crate::rng::MapRng;
use crate::types::{
    ExpansionZone, FieldKind, GenerationWarning, ResourceField, StartPosition, distance,
};

/// Сторона квадратной площадки экспансии
pub const EXPANSION_SIZE: usize = 8;
const EXPANSION_FIELD_RADIUS: usize = 3;
const EXPANSION_FIELD_DENSITY: f32 = 0.75;
const ZONE_ATTEMPTS: usize = 20;
/// Минимальный путь от чужой базы до экспансии
const MIN_ENEMY_DISTANCE: f32 = 12.0;

/// Размещает 2–3 зоны на игрока.
///
/// Поле каждой зоны сразу попадает в общий список `fields`, чтобы следующие
/// зоны и этапы видели его как занятую точку интереса.
pub fn plan_expansions(
    config: &MapConfig,
    starts: &[StartPosition],
    fields: &mut Vec<ResourceField>,
    rng: &mut MapRng,
) -> (Vec<ExpansionZone>, Vec<GenerationWarning>) {
    let mut zones: Vec<ExpansionZone> = Vec::new();
    let mut warnings = Vec::new();

    for start in starts {
        let count = rng.range_inclusive(2, 3);
        for zone in 0..count {
            let placed = (0..ZONE_ATTEMPTS).find_map(|_| {
                let angle = rng.angle();
                let dist = rng.range_f32(15.0, 25.0);
                let base = start.center();
                let x = (base.0 + angle.cos() * dist).round() as i64;
                let y = (base.1 + angle.sin() * dist).round() as i64;
                if !zone_fits(config, starts, fields.as_slice(), &zones, start.player_id, x, y) {
                    return None;
                }

                // Поле чуть смещено от центра площадки
                let fx = x + rng.range_inclusive(0, 2) as i64 - 1;
                let fy = y + rng.range_inclusive(0, 2) as i64 - 1;
                field_fits(config, starts, fields.as_slice(), fx, fy, EXPANSION_FIELD_RADIUS)
                    .then_some((x as usize, y as usize, fx as usize, fy as usize))
            });

            let Some((x, y, fx, fy)) = placed else {
                warnings.push(GenerationWarning::ExpansionSkipped {
                    player_id: start.player_id,
                    zone,
                });
                tracing::warn!(
                    target: "skirmish_mapgen::expansion",
                    player_id = start.player_id,
                    zone,
                    attempts = ZONE_ATTEMPTS,
                    "mapgen.expansion.skipped"
                );
                continue;
            };

            let zone_id = zones.len();
            let field_id = fields.len();
            fields.push(ResourceField {
                id: field_id,
                grid_x: fx,
                grid_y: fy,
                radius: EXPANSION_FIELD_RADIUS,
                density: EXPANSION_FIELD_DENSITY,
                kind: FieldKind::Expansion,
                resource: FieldKind::Expansion.resource_kind(),
                link: Some(zone_id),
            });
            zones.push(ExpansionZone {
                id: zone_id,
                player_id: start.player_id,
                grid_x: x,
                grid_y: y,
                size: EXPANSION_SIZE,
                field_id,
            });
        }
    }

    tracing::debug!(
        target: "skirmish_mapgen::expansion",
        zones = zones.len(),
        skipped = warnings.len(),
        "mapgen.expansion.placed"
    );
    (zones, warnings)
}

fn zone_fits(
    config: &MapConfig,
    starts: &[StartPosition],
    fields: &[ResourceField],
    zones: &[ExpansionZone],
    owner: usize,
    x: i64,
    y: i64,
) -> bool {
    let half = EXPANSION_SIZE / 2;
    if !in_bounds(config, x, y, half + EXPANSION_FIELD_RADIUS) {
        return false;
    }
    let pos = (x as f32, y as f32);
    let clear_of_fields = fields
        .iter()
        .all(|f| distance(pos, f.center()) >= (f.radius + half) as f32 + FIELD_GAP);
    let clear_of_zones = zones
        .iter()
        .all(|z| distance(pos, z.center()) >= EXPANSION_SIZE as f32 + FIELD_GAP);
    let clear_of_bases = starts.iter().all(|s| {
        let d = distance(pos, s.center());
        if s.player_id == owner {
            d >= (half + 2) as f32
        } else {
            d >= MIN_ENEMY_DISTANCE
        }
    });
    clear_of_fields && clear_of_zones && clear_of_bases
}
