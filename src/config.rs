// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией поля боя:
//! - Стратегии расстановки стартовых баз
//! - Плотность ресурсов и препятствий
//! - Масштабы шума и пороги классификации поверхности
//! - Лимит попыток генерации
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.
//! Конфигурация проверяется один раз при создании генератора (`MapConfig::validate`),
//! после чего ни один этап не читает непроверенные значения.

use crate::types::distance;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Размер стороны квадратного основания базы в клетках
pub const BASE_FOOTPRINT: usize = 3;

/// Минимальный размер стороны карты в клетках
pub const MIN_MAP_SIDE: usize = 16;

/// Шаг сетки кандидатов для стратегии `AsymmetricBalanced`
pub const CANDIDATE_STEP: usize = 5;

/// Стратегия расстановки стартовых позиций
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutStrategy {
    /// Два игрока в противоположных углах (левый нижний / правый верхний)
    #[default]
    Symmetric2p,
    /// До четырёх игроков по углам карты
    Symmetric4p,
    /// Два игрока на вертикальной оси карты у противоположных краёв
    Lanes,
    /// Случайный выбор из грубой сетки кандидатов, дальних от центра
    AsymmetricBalanced,
}

impl LayoutStrategy {
    /// Допустимый диапазон числа игроков для стратегии.
    ///
    /// Для `AsymmetricBalanced` верхняя граница зависит от размера карты,
    /// см. [`MapConfig::candidate_count`].
    #[must_use]
    pub fn player_range(self) -> (usize, usize) {
        match self {
            LayoutStrategy::Symmetric2p | LayoutStrategy::Lanes => (2, 2),
            LayoutStrategy::Symmetric4p => (2, 4),
            LayoutStrategy::AsymmetricBalanced => (2, usize::MAX),
        }
    }
}

/// Пороги классификации поверхности (шум нормализован в [0, 1])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceThresholds {
    /// Выше этого порога — вода, выше `water + 0.1` — глубокая вода
    #[serde(default = "default_water_threshold")]
    pub water: f32,

    /// Выше — низкая трава, выше `grass + 0.15` — высокая трава
    #[serde(default = "default_grass_threshold")]
    pub grass: f32,

    /// Ниже — грязь, ниже `mud + 0.1` — тёмный песок
    #[serde(default = "default_mud_threshold")]
    pub mud: f32,
}

fn default_water_threshold() -> f32 {
    0.72
}
fn default_grass_threshold() -> f32 {
    0.5
}
fn default_mud_threshold() -> f32 {
    0.28
}

impl Default for SurfaceThresholds {
    fn default() -> Self {
        Self {
            water: 0.72,
            grass: 0.5,
            mud: 0.28,
        }
    }
}

/// Ошибки загрузки и проверки конфигурации.
///
/// Это единственный класс ошибок, прерывающий генерацию: он возникает до начала работы.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read map config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse map config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("map {rows}x{cols} is smaller than the {min}x{min} minimum")]
    MapTooSmall { rows: usize, cols: usize, min: usize },
    #[error("cell size must be positive")]
    ZeroCellSize,
    #[error("{name} must be within [0, 1], got {value}")]
    DensityOutOfRange { name: &'static str, value: f32 },
    #[error("{name} must be positive, got {value}")]
    NonPositiveScale { name: &'static str, value: f32 },
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("base margin {margin} leaves no room for bases on a {rows}x{cols} map")]
    MarginTooLarge {
        margin: usize,
        rows: usize,
        cols: usize,
    },
    #[error(
        "base {player_id} is {distance:.1} cells from the contested center, clearance is {clearance}"
    )]
    ContestedTooClose {
        player_id: usize,
        distance: f32,
        clearance: f32,
    },
    #[error("layout {layout:?} supports {min}..={max} players, got {requested}")]
    UnsupportedPlayerCount {
        layout: LayoutStrategy,
        requested: usize,
        min: usize,
        max: usize,
    },
}

/// Параметры генерации одной карты
///
/// Полная конфигурация для генерации поля боя. Поддерживает загрузку из TOML-файлов.
/// Неизменяема после создания генератора.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Число строк сетки
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Число столбцов сетки
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Размер клетки в мировых единицах (пикселях)
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,

    /// Стратегия расстановки баз (по умолчанию `Symmetric2p`)
    #[serde(default)]
    pub layout: LayoutStrategy,

    /// Количество игроков
    #[serde(default = "default_player_count")]
    pub player_count: usize,

    /// Плотность заполнения ресурсных полей (0.0 – 1.0)
    #[serde(default = "default_resource_density")]
    pub resource_density: f32,

    /// Плотность препятствий (0.0 = нет препятствий)
    #[serde(default = "default_terrain_density")]
    pub terrain_density: f32,

    /// Минимальное расстояние от баз до любых сгенерированных объектов, в клетках
    #[serde(default = "default_min_base_clearance")]
    pub min_base_clearance: f32,

    /// Отступ баз от краёв карты, в клетках
    #[serde(default = "default_base_margin")]
    pub base_margin: usize,

    /// Масштаб основного шума поверхности
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,

    /// Масштаб шума, управляющего изгибами рек
    #[serde(default = "default_river_noise_scale")]
    pub river_noise_scale: f32,

    /// Сид генерации; `None` — взять из энтропии системы
    #[serde(default)]
    pub seed: Option<u64>,

    /// Максимальное число попыток генерации до принятия последней карты
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Пороги классификации поверхности
    #[serde(default)]
    pub thresholds: SurfaceThresholds,
}

fn default_rows() -> usize {
    30
}
fn default_cols() -> usize {
    40
}
fn default_cell_size() -> u32 {
    32
}
fn default_player_count() -> usize {
    2
}
fn default_resource_density() -> f32 {
    0.7
}
fn default_terrain_density() -> f32 {
    0.15
}
fn default_min_base_clearance() -> f32 {
    6.0
}
fn default_base_margin() -> usize {
    3
}
fn default_noise_scale() -> f32 {
    0.08
}
fn default_river_noise_scale() -> f32 {
    0.15
}
fn default_max_attempts() -> u32 {
    10
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            rows: 30,
            cols: 40,
            cell_size: 32,
            layout: LayoutStrategy::Symmetric2p,
            player_count: 2,
            resource_density: 0.7,
            terrain_density: 0.15,
            min_base_clearance: 6.0,
            base_margin: 3,
            noise_scale: 0.08,
            river_noise_scale: 0.15,
            seed: None,
            max_attempts: 10,
            thresholds: SurfaceThresholds::default(),
        }
    }
}

impl MapConfig {
    /// Загружает параметры из TOML-файла и проверяет их
    ///
    /// # Пример
    /// ```toml
    /// # map.toml
    /// rows = 48
    /// cols = 64
    /// layout = "Symmetric4p"
    /// player_count = 4
    /// seed = 12345
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutStrategy, player_count: usize) -> Self {
        self.layout = layout;
        self.player_count = player_count;
        self
    }

    /// Клетка центра карты, где стоит спорное поле
    #[must_use]
    pub fn contested_center(&self) -> (usize, usize) {
        (self.cols / 2, self.rows / 2)
    }

    /// Якоря баз для фиксированных стратегий; для `AsymmetricBalanced` пусто.
    ///
    /// Для `Symmetric4p` первые двое совпадают с `Symmetric2p`.
    #[must_use]
    pub fn fixed_anchors(&self) -> Vec<(usize, usize)> {
        let m = self.base_margin;
        let far_x = self.cols - m - BASE_FOOTPRINT;
        let far_y = self.rows - m - BASE_FOOTPRINT;
        match self.layout {
            LayoutStrategy::Symmetric2p => vec![(m, far_y), (far_x, m)],
            LayoutStrategy::Symmetric4p => vec![(m, far_y), (far_x, m), (m, m), (far_x, far_y)]
                .into_iter()
                .take(self.player_count)
                .collect(),
            LayoutStrategy::Lanes => {
                let x = self.cols / 2 - BASE_FOOTPRINT / 2;
                vec![(x, far_y), (x, m)]
            }
            LayoutStrategy::AsymmetricBalanced => Vec::new(),
        }
    }

    /// Грубая сетка кандидатов `AsymmetricBalanced` без узлов у спорного центра.
    ///
    /// Не зависит от сида, поэтому проверяется до генерации.
    #[must_use]
    pub fn balanced_candidates(&self) -> Vec<(usize, usize)> {
        let m = self.base_margin;
        let last_x = self.cols.saturating_sub(m + BASE_FOOTPRINT);
        let last_y = self.rows.saturating_sub(m + BASE_FOOTPRINT);
        let mut candidates = Vec::new();
        for y in (m..=last_y).step_by(CANDIDATE_STEP) {
            for x in (m..=last_x).step_by(CANDIDATE_STEP) {
                if self.clear_of_contested((x, y)) {
                    candidates.push((x, y));
                }
            }
        }
        candidates
    }

    /// Число кандидатов в сетке стратегии `AsymmetricBalanced` для текущего размера карты
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.balanced_candidates().len()
    }

    fn base_to_contested(&self, anchor: (usize, usize)) -> f32 {
        let mid = (BASE_FOOTPRINT / 2) as f32;
        let (cx, cy) = self.contested_center();
        distance(
            (anchor.0 as f32 + mid, anchor.1 as f32 + mid),
            (cx as f32, cy as f32),
        )
    }

    fn clear_of_contested(&self, anchor: (usize, usize)) -> bool {
        self.base_to_contested(anchor) >= self.min_base_clearance
    }

    /// Проверяет конфигурацию целиком.
    ///
    /// Вызывается один раз в `MapGenerator::new`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_MAP_SIDE || self.cols < MIN_MAP_SIDE {
            return Err(ConfigError::MapTooSmall {
                rows: self.rows,
                cols: self.cols,
                min: MIN_MAP_SIDE,
            });
        }
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        for (name, value) in [
            ("resource_density", self.resource_density),
            ("terrain_density", self.terrain_density),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::DensityOutOfRange { name, value });
            }
        }
        for (name, value) in [
            ("noise_scale", self.noise_scale),
            ("river_noise_scale", self.river_noise_scale),
            ("min_base_clearance", self.min_base_clearance),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositiveScale { name, value });
            }
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        // Две базы по краям плюс хотя бы одна клетка между ними
        let needed = 2 * (self.base_margin + BASE_FOOTPRINT) + 1;
        if self.rows < needed || self.cols < needed {
            return Err(ConfigError::MarginTooLarge {
                margin: self.base_margin,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let (min, mut max) = self.layout.player_range();
        if self.layout == LayoutStrategy::AsymmetricBalanced {
            max = self.candidate_count();
        }
        if self.player_count < min || self.player_count > max {
            return Err(ConfigError::UnsupportedPlayerCount {
                layout: self.layout,
                requested: self.player_count,
                min,
                max,
            });
        }

        // Спорное поле всегда стоит в центре
        for (player_id, anchor) in self.fixed_anchors().into_iter().enumerate() {
            if !self.clear_of_contested(anchor) {
                return Err(ConfigError::ContestedTooClose {
                    player_id,
                    distance: self.base_to_contested(anchor),
                    clearance: self.min_base_clearance,
                });
            }
        }
        Ok(())
    }
}

/// Минимальное сохраняемое состояние для воспроизведения карты
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayState {
    pub config: MapConfig,
    pub seed: u64,
}
