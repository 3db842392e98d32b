// src/generator.rs
//! Генерация карты с проверкой связности
//!
//! Один вызов прогоняет весь конвейер попытки и проверяет, что между каждой
//! парой баз есть путь. При неудаче попытка целиком выбрасывается и
//! повторяется с новым сидом, не более `max_attempts` раз.
//!
//! ## Порядок этапов попытки
//!
//! 1. Стартовые позиции
//! 2. Ресурсные поля (центр, у баз, зеркальные пары)
//! 3. Зоны экспансии со своими полями
//! 4. Поверхность по шуму и точкам интереса
//! 5. Реки
//! 6. Переход к застраиваемому ядру баз
//! 7. Узкие проходы
//! 8. Коридоры между базами (маска для препятствий)
//! 9. Препятствия
//! 10. Сборка сетки местности
//!
//! Все этапы читают один случайный поток в этом порядке.
//!
//! ## Состояния
//!
//! `Idle → Generating(n) → Validating(n) → Finalized | Generating(n + 1)`
//!
//! Если все попытки провалились, возвращается последняя карта с
//! предупреждением `AttemptsExhausted`.

use crate::chokepoints::inject_choke_points;
use crate::clearance::{ClearPath, compute_clear_paths};
use crate::config::{ConfigError, MapConfig, ReplayState};
use crate::expansion::plan_expansions;
use crate::features::{FeatureContext, scatter_features};
use crate::grid::{CellGrid, TerrainSink, apply_to_grid};
use crate::noise::NoiseProvider;
use crate::pathfinding::{PathOptions, Pathfinder};
use crate::resources::{FieldPlan, plan_resource_fields};
use crate::rivers::carve_rivers;
use crate::rng::{MapRng, fresh_seed};
use crate::start::plan_start_positions;
use crate::surface::{SurfaceMap, synthesize_surface};
use crate::transition::smooth_base_transitions;
use crate::types::{
    ChokePoint, ExpansionZone, GenerationWarning, ResourceField, RiverPath, StartPosition,
    TerrainFeature,
};
use serde::{Deserialize, Serialize};

/// Всё, что производит одна попытка генерации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// Сид, по которому построена карта
    pub seed: u64,
    pub start_positions: Vec<StartPosition>,
    pub resource_fields: Vec<ResourceField>,
    pub expansion_zones: Vec<ExpansionZone>,
    pub surface: SurfaceMap,
    pub river_paths: Vec<RiverPath>,
    pub choke_points: Vec<ChokePoint>,
    pub clear_paths: Vec<ClearPath>,
    pub terrain_features: Vec<TerrainFeature>,
    /// Собранная сетка местности, по которой шла проверка связности
    pub grid: CellGrid,
}

/// Итог генерации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub map: GeneratedMap,
    /// Число сделанных попыток, от 1 до `max_attempts`
    pub attempts: u32,
    /// Все пары баз связаны
    pub validated: bool,
    pub warnings: Vec<GenerationWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating { attempt: u32 },
    Validating { attempt: u32 },
    Finalized { attempts: u32, validated: bool },
}

/// Генератор карт; шум и поиск пути передаются явно
pub struct MapGenerator<N: NoiseProvider, P: Pathfinder> {
    config: MapConfig,
    noise: N,
    pathfinder: P,
    path_options: PathOptions,
    state: GenerationState,
}

impl<N: NoiseProvider, P: Pathfinder> MapGenerator<N, P> {
    /// Проверяет конфигурацию и создаёт генератор.
    ///
    /// Других ошибок генерация не возвращает.
    pub fn new(config: MapConfig, noise: N, pathfinder: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            noise,
            pathfinder,
            path_options: PathOptions::default(),
            state: GenerationState::Idle,
        })
    }

    #[must_use]
    pub fn with_path_options(mut self, options: PathOptions) -> Self {
        self.path_options = options;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Одна попытка без проверки: чистая функция от сида
    pub fn build_attempt(&mut self, seed: u64) -> (GeneratedMap, Vec<GenerationWarning>) {
        let config = &self.config;
        let mut rng = MapRng::new(seed);
        self.noise.reseed(seed);

        let start_positions = plan_start_positions(config, &mut rng);
        let FieldPlan {
            fields: mut resource_fields,
            mut warnings,
        } = plan_resource_fields(config, &start_positions, &mut rng);
        let (expansion_zones, skipped) =
            plan_expansions(config, &start_positions, &mut resource_fields, &mut rng);
        warnings.extend(skipped);

        let mut surface = synthesize_surface(config, &self.noise, &start_positions, &resource_fields);
        let river_paths = carve_rivers(config, &self.noise, &start_positions, &mut surface, &mut rng);
        smooth_base_transitions(config, &start_positions, &mut surface);
        let choke_points = inject_choke_points(config, &start_positions, &mut surface, &mut rng);
        let clear_paths = compute_clear_paths(config, &start_positions);

        let (terrain_features, omitted) = scatter_features(
            &FeatureContext {
                config,
                starts: &start_positions,
                fields: &resource_fields,
                paths: &clear_paths,
                surface: &surface,
            },
            &mut rng,
        );
        warnings.extend(omitted);

        let mut grid = CellGrid::new(config.rows, config.cols, config.cell_size);
        apply_to_grid(
            &mut grid,
            &surface,
            &terrain_features,
            &resource_fields,
            &mut rng,
        );

        let map = GeneratedMap {
            seed,
            start_positions,
            resource_fields,
            expansion_zones,
            surface,
            river_paths,
            choke_points,
            clear_paths,
            terrain_features,
            grid,
        };
        (map, warnings)
    }

    /// Пары баз `(i, j)`, между которыми поиск пути ничего не нашёл
    #[must_use]
    pub fn unreachable_pairs(&self, map: &GeneratedMap) -> Vec<(usize, usize)> {
        let starts = &map.start_positions;
        let mut failed = Vec::new();
        for (i, a) in starts.iter().enumerate() {
            for b in &starts[i + 1..] {
                let path = self.pathfinder.find_path(
                    &map.grid,
                    a.world_pos(),
                    b.world_pos(),
                    &self.path_options,
                );
                if path.is_empty() {
                    failed.push((a.player_id, b.player_id));
                }
            }
        }
        failed
    }

    /// Генерация с сидом из конфигурации или из энтропии
    pub fn generate(&mut self) -> GenerationOutcome {
        let seed = self.config.seed.unwrap_or_else(fresh_seed);
        self.generate_with_seed(seed)
    }

    /// Генерация, первая попытка которой идёт по заданному сиду
    pub fn generate_with_seed(&mut self, seed: u64) -> GenerationOutcome {
        let max_attempts = self.config.max_attempts;
        let mut seed = seed;
        let mut failures = Vec::new();
        let mut attempt = 1;

        loop {
            self.state = GenerationState::Generating { attempt };
            let (map, mut warnings) = self.build_attempt(seed);

            self.state = GenerationState::Validating { attempt };
            let unreachable = self.unreachable_pairs(&map);
            if unreachable.is_empty() {
                tracing::info!(
                    target: "skirmish_mapgen::generator",
                    attempt,
                    seed,
                    "mapgen.attempt.validated"
                );
                failures.append(&mut warnings);
                return self.finalize(map, attempt, true, failures);
            }

            tracing::info!(
                target: "skirmish_mapgen::generator",
                attempt,
                seed,
                unreachable = unreachable.len(),
                "mapgen.attempt.failed"
            );
            failures.extend(
                unreachable
                    .into_iter()
                    .map(|(from, to)| GenerationWarning::Unreachable { attempt, from, to }),
            );

            if attempt >= max_attempts {
                tracing::warn!(
                    target: "skirmish_mapgen::generator",
                    attempts = attempt,
                    seed,
                    "mapgen.attempts.exhausted"
                );
                failures.append(&mut warnings);
                failures.push(GenerationWarning::AttemptsExhausted { attempts: attempt });
                return self.finalize(map, attempt, false, failures);
            }

            attempt += 1;
            seed = fresh_seed();
        }
    }

    /// Генерирует карту и записывает итог во внешнюю сетку
    pub fn generate_into<S: TerrainSink + ?Sized>(&mut self, sink: &mut S) -> GenerationOutcome {
        let outcome = self.generate();
        outcome.map.grid.write_into(sink);
        outcome
    }

    /// Минимальное состояние, по которому [`Self::replay`] повторит карту
    #[must_use]
    pub fn replay_state(&self, outcome: &GenerationOutcome) -> ReplayState {
        ReplayState {
            config: self.config.clone(),
            seed: outcome.map.seed,
        }
    }

    /// Повторяет сохранённую карту: одна попытка по сиду из состояния, без повторов.
    ///
    /// Проверка связности выполняется, но неудача только отражается в
    /// `validated` и предупреждениях.
    pub fn replay(&mut self, replay: &ReplayState) -> Result<GenerationOutcome, ConfigError> {
        replay.config.validate()?;
        self.config = replay.config.clone();

        let attempt = 1;
        self.state = GenerationState::Generating { attempt };
        let (map, mut warnings) = self.build_attempt(replay.seed);

        self.state = GenerationState::Validating { attempt };
        let unreachable = self.unreachable_pairs(&map);
        let validated = unreachable.is_empty();
        warnings.extend(
            unreachable
                .into_iter()
                .map(|(from, to)| GenerationWarning::Unreachable { attempt, from, to }),
        );

        tracing::info!(
            target: "skirmish_mapgen::generator",
            seed = replay.seed,
            validated,
            "mapgen.replay.finished"
        );
        Ok(self.finalize(map, attempt, validated, warnings))
    }

    fn finalize(
        &mut self,
        map: GeneratedMap,
        attempts: u32,
        validated: bool,
        warnings: Vec<GenerationWarning>,
    ) -> GenerationOutcome {
        self.state = GenerationState::Finalized {
            attempts,
            validated,
        };
        GenerationOutcome {
            map,
            attempts,
            validated,
            warnings,
        }
    }
}
