//! Расстановка стартовых позиций игроков.

use crate::config::{BASE_FOOTPRINT, LayoutStrategy, MapConfig};
use crate::rng::MapRng;
use crate::types::{StartPosition, distance};

/// Выбирает стартовые позиции по стратегии из конфигурации.
///
/// Конфигурация уже проверена (`MapConfig::validate`), поэтому число игроков
/// гарантированно помещается в выбранную стратегию.
pub fn plan_start_positions(config: &MapConfig, rng: &mut MapRng) -> Vec<StartPosition> {
    let anchors = match config.layout {
        LayoutStrategy::AsymmetricBalanced => balanced_anchors(config, rng),
        _ => config.fixed_anchors(),
    };

    let starts: Vec<StartPosition> = anchors
        .into_iter()
        .enumerate()
        .map(|(player_id, (x, y))| StartPosition::new(player_id, x, y, config.cell_size))
        .collect();

    tracing::debug!(
        target: "skirmish_mapgen::start",
        layout = ?config.layout,
        players = starts.len(),
        "mapgen.start.placed"
    );
    starts
}

/// Грубая сетка кандидатов, перемешанная и отсортированная от дальних к центру
fn balanced_anchors(config: &MapConfig, rng: &mut MapRng) -> Vec<(usize, usize)> {
    let mut candidates = config.balanced_candidates();
    rng.shuffle(&mut candidates);

    let center = (config.cols as f32 / 2.0, config.rows as f32 / 2.0);
    let mid = (BASE_FOOTPRINT / 2) as f32;
    let far = |&(x, y): &(usize, usize)| distance((x as f32 + mid, y as f32 + mid), center);
    // Стабильная сортировка: равные расстояния сохраняют порядок перемешивания
    candidates.sort_by(|a, b| far(b).total_cmp(&far(a)));
    candidates.truncate(config.player_count);
    candidates
}
