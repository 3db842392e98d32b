//! Размещение ресурсных полей: спорный центр, поля у баз и зеркальные пары.

use crate::config::MapConfig;
use crate::rng::MapRng;
use crate::types::{FieldKind, GenerationWarning, ResourceField, StartPosition, distance};

/// Радиус спорного центрального поля
pub const CONTESTED_RADIUS: usize = 3;
const NEAR_RADIUS: usize = 3;
const SECONDARY_RADIUS: usize = 2;
const MIRROR_RADIUS: usize = 2;
/// Зазор между краями полей
pub const FIELD_GAP: f32 = 2.0;

const BASE_FIELD_ATTEMPTS: usize = 10;
const MIRROR_PAIRS: usize = 3;
const MIRROR_ATTEMPTS: usize = 20;

/// Поле радиуса `radius` с центром в (x, y) целиком внутри карты
#[must_use]
pub fn in_bounds(config: &MapConfig, x: i64, y: i64, radius: usize) -> bool {
    let r = radius as i64;
    x - r >= 0 && x + r < config.cols as i64 && y - r >= 0 && y + r < config.rows as i64
}

/// Проверка всех инвариантов поля перед добавлением:
/// границы, зазор до остальных полей и дистанция до баз.
#[must_use]
pub fn field_fits(
    config: &MapConfig,
    starts: &[StartPosition],
    fields: &[ResourceField],
    x: i64,
    y: i64,
    radius: usize,
) -> bool {
    if !in_bounds(config, x, y, radius) {
        return false;
    }
    let pos = (x as f32, y as f32);
    let clear_of_fields = fields
        .iter()
        .all(|f| distance(pos, f.center()) >= (f.radius + radius) as f32 + FIELD_GAP);
    let clear_of_bases = starts
        .iter()
        .all(|s| distance(pos, s.center()) >= config.min_base_clearance);
    clear_of_fields && clear_of_bases
}

/// Полярное смещение от точки с округлением к ближайшей клетке
fn offset(from: (f32, f32), angle: f32, dist: f32) -> (i64, i64) {
    (
        (from.0 + angle.cos() * dist).round() as i64,
        (from.1 + angle.sin() * dist).round() as i64,
    )
}

/// Результат планирования полей
#[derive(Debug, Default)]
pub struct FieldPlan {
    pub fields: Vec<ResourceField>,
    pub warnings: Vec<GenerationWarning>,
}

impl FieldPlan {
    fn push(&mut self, x: i64, y: i64, radius: usize, density: f32, kind: FieldKind) -> usize {
        let id = self.fields.len();
        self.fields.push(ResourceField {
            id,
            grid_x: x as usize,
            grid_y: y as usize,
            radius,
            density,
            kind,
            resource: kind.resource_kind(),
            link: None,
        });
        id
    }
}

/// Размещает все ресурсные поля, кроме полей экспансий.
pub fn plan_resource_fields(
    config: &MapConfig,
    starts: &[StartPosition],
    rng: &mut MapRng,
) -> FieldPlan {
    let mut plan = FieldPlan::default();
    let density = config.resource_density;

    // Спорное поле всегда ровно в центре
    let (cx, cy) = config.contested_center();
    let (cx, cy) = (cx as i64, cy as i64);
    plan.push(
        cx,
        cy,
        CONTESTED_RADIUS,
        (density + 0.2).min(1.0),
        FieldKind::Contested,
    );

    for start in starts {
        for (radius, min_d, max_d, field_density) in [
            (NEAR_RADIUS, 6.0, 10.0, density),
            (SECONDARY_RADIUS, 10.0, 15.0, density * 0.85),
        ] {
            place_base_field(
                config,
                starts,
                rng,
                &mut plan,
                start,
                radius,
                (min_d, max_d),
                field_density,
            );
        }
    }

    for pair in 0..MIRROR_PAIRS {
        place_mirror_pair(config, starts, rng, &mut plan, pair, density * 0.9);
    }

    tracing::debug!(
        target: "skirmish_mapgen::resources",
        fields = plan.fields.len(),
        warnings = plan.warnings.len(),
        "mapgen.resources.placed"
    );
    plan
}

#[allow(clippy::too_many_arguments)]
fn place_base_field(
    config: &MapConfig,
    starts: &[StartPosition],
    rng: &mut MapRng,
    plan: &mut FieldPlan,
    start: &StartPosition,
    radius: usize,
    (min_d, max_d): (f32, f32),
    field_density: f32,
) {
    let base = start.center();
    for _ in 0..BASE_FIELD_ATTEMPTS {
        let angle = rng.angle();
        let dist = rng.range_f32(min_d, max_d);
        let (x, y) = offset(base, angle, dist);
        if field_fits(config, starts, &plan.fields, x, y, radius) {
            plan.push(x, y, radius, field_density, FieldKind::NearBase);
            return;
        }
    }

    // Запасная позиция: к центру карты на середину диапазона, прижатая к границам
    let center = (config.cols as f32 / 2.0, config.rows as f32 / 2.0);
    let toward = (center.1 - base.1).atan2(center.0 - base.0);
    let (x, y) = offset(base, toward, (min_d + max_d) / 2.0);
    let r = radius as i64;
    let x = x.clamp(r, config.cols as i64 - 1 - r);
    let y = y.clamp(r, config.rows as i64 - 1 - r);

    let player_id = start.player_id;
    if field_fits(config, starts, &plan.fields, x, y, radius) {
        plan.push(x, y, radius, field_density, FieldKind::NearBase);
        plan.warnings.push(GenerationWarning::FieldFallback {
            player_id,
            kind: FieldKind::NearBase,
        });
        tracing::debug!(
            target: "skirmish_mapgen::resources",
            player_id,
            x,
            y,
            "mapgen.resources.fallback"
        );
    } else {
        plan.warnings.push(GenerationWarning::FieldOmitted {
            player_id,
            kind: FieldKind::NearBase,
        });
        tracing::warn!(
            target: "skirmish_mapgen::resources",
            player_id,
            radius,
            "mapgen.resources.omitted"
        );
    }
}

/// Пара полей, отражённых через центр карты; ставится целиком или не ставится вовсе
fn place_mirror_pair(
    config: &MapConfig,
    starts: &[StartPosition],
    rng: &mut MapRng,
    plan: &mut FieldPlan,
    pair: usize,
    field_density: f32,
) {
    let (cx, cy) = config.contested_center();
    let (cx, cy) = (cx as i64, cy as i64);
    let max_d = (config.rows.min(config.cols) as f32 / 3.0).max(7.0);
    let min_gap = (2 * MIRROR_RADIUS) as f32 + FIELD_GAP;

    for _ in 0..MIRROR_ATTEMPTS {
        let angle = rng.angle();
        let dist = rng.range_f32(6.0, max_d);
        let (x, y) = offset((cx as f32, cy as f32), angle, dist);
        let (mx, my) = (2 * cx - x, 2 * cy - y);

        let apart = distance((x as f32, y as f32), (mx as f32, my as f32)) >= min_gap;
        if apart
            && field_fits(config, starts, &plan.fields, x, y, MIRROR_RADIUS)
            && field_fits(config, starts, &plan.fields, mx, my, MIRROR_RADIUS)
        {
            let a = plan.push(x, y, MIRROR_RADIUS, field_density, FieldKind::Mirrored);
            let b = plan.push(mx, my, MIRROR_RADIUS, field_density, FieldKind::Mirrored);
            plan.fields[a].link = Some(b);
            plan.fields[b].link = Some(a);
            return;
        }
    }

    plan.warnings.push(GenerationWarning::MirrorPairDropped { pair });
    tracing::warn!(
        target: "skirmish_mapgen::resources",
        pair,
        attempts = MIRROR_ATTEMPTS,
        "mapgen.resources.mirror_dropped"
    );
}
