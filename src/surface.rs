// src/surface.rs
//! Классификация поверхности
//!
//! Каждая клетка получает категорию местности по двум октавам шума
//! и по расстоянию до ближайшей точки интереса (база или ресурсное поле):
//! - рядом с точками интереса вода запрещена и заменяется тёмным песком
//! - дальше вода разрешается линейно на протяжении 4 клеток
//!
//! ## Правило флагов
//!
//! `walkable`, `buildable` и `blocked` всегда выводятся из категории в
//! [`SurfaceCell::set_category`]. Ни один проход не пишет флаги напрямую.
//! Маркеры (`river`, `choke`, `cleared_for_base`) выставляются отдельно и не сбрасываются.

use crate::config::{MapConfig, SurfaceThresholds};
use crate::noise::NoiseProvider;
use crate::types::{ResourceField, StartPosition, distance};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainCategory {
    #[default]
    Sand,
    DarkSand,
    Mud,
    LowGrass,
    HighGrass,
    Water,
    DeepWater,
}

impl TerrainCategory {
    #[must_use]
    pub fn is_water(self) -> bool {
        matches!(self, TerrainCategory::Water | TerrainCategory::DeepWater)
    }

    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            TerrainCategory::Sand => [214, 190, 140],
            TerrainCategory::DarkSand => [176, 150, 104],
            TerrainCategory::Mud => [110, 90, 62],
            TerrainCategory::LowGrass => [120, 160, 80],
            TerrainCategory::HighGrass => [76, 124, 56],
            TerrainCategory::Water => [64, 128, 190],
            TerrainCategory::DeepWater => [24, 72, 140],
        }
    }
}

/// Одна клетка карты поверхности
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCell {
    pub category: TerrainCategory,
    pub walkable: bool,
    pub buildable: bool,
    pub blocked: bool,
    /// Нормализованное значение шума, из которого получена категория
    pub noise: f32,
    pub river: bool,
    pub choke: bool,
    pub cleared_for_base: bool,
}

impl SurfaceCell {
    #[must_use]
    pub fn new(category: TerrainCategory, noise: f32) -> Self {
        let mut cell = Self {
            category,
            walkable: true,
            buildable: true,
            blocked: false,
            noise,
            river: false,
            choke: false,
            cleared_for_base: false,
        };
        cell.set_category(category);
        cell
    }

    /// Меняет категорию и пересчитывает флаги проходимости
    pub fn set_category(&mut self, category: TerrainCategory) {
        let water = category.is_water();
        self.category = category;
        self.walkable = !water;
        self.buildable = !water;
        self.blocked = water;
    }
}

/// Авторитетный снимок поверхности: `rows × cols` клеток, индекс `y * cols + x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMap {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<SurfaceCell>,
}

impl SurfaceMap {
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> &SurfaceCell {
        &self.cells[y * self.cols + x]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut SurfaceCell {
        &mut self.cells[y * self.cols + x]
    }

    /// Проверка для знаковых координат
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[SurfaceCell] {
        &self.cells[y * self.cols..(y + 1) * self.cols]
    }
}

/// Точка интереса: центр и радиус, который вычитается из расстояния
#[derive(Debug, Clone, Copy)]
struct Poi {
    center: (f32, f32),
    radius: f32,
}

/// Доля разрешённой воды: 0 ближе `threshold`, линейно до 1 на следующих 4 клетках
#[must_use]
pub fn water_falloff(poi_distance: f32, threshold: f32) -> f32 {
    ((poi_distance - threshold) / 4.0).clamp(0.0, 1.0)
}

/// Категория по нормализованному шуму и доле разрешённой воды
#[must_use]
pub fn classify(noise: f32, falloff: f32, t: &SurfaceThresholds) -> TerrainCategory {
    let suppressed = noise * falloff;
    if suppressed > t.water + 0.1 {
        TerrainCategory::DeepWater
    } else if suppressed > t.water {
        TerrainCategory::Water
    } else if noise > t.water {
        // Здесь была бы вода, но рядом точка интереса
        TerrainCategory::DarkSand
    } else if noise > t.grass + 0.15 {
        TerrainCategory::HighGrass
    } else if noise > t.grass {
        TerrainCategory::LowGrass
    } else if noise < t.mud {
        TerrainCategory::Mud
    } else if noise < t.mud + 0.1 {
        TerrainCategory::DarkSand
    } else {
        TerrainCategory::Sand
    }
}

/// Строит карту поверхности.
///
/// Не тратит случайный поток, поэтому клетки можно считать параллельно
/// без потери воспроизводимости.
pub fn synthesize_surface<N: NoiseProvider + ?Sized>(
    config: &MapConfig,
    noise: &N,
    starts: &[StartPosition],
    fields: &[ResourceField],
) -> SurfaceMap {
    let (rows, cols) = (config.rows, config.cols);
    let pois: Vec<Poi> = starts
        .iter()
        .map(|s| Poi {
            center: s.center(),
            radius: 0.0,
        })
        .chain(fields.iter().map(|f| Poi {
            center: f.center(),
            radius: f.radius as f32,
        }))
        .collect();
    let threshold = config.min_base_clearance + 4.0;

    let cell_at = |i: usize| {
        let (x, y) = ((i % cols) as f32, (i / cols) as f32);
        let raw = noise.layered(x, y, config.noise_scale);
        let value = ((raw / 1.3 + 1.0) * 0.5).clamp(0.0, 1.0);

        let nearest = pois
            .iter()
            .map(|p| (distance((x, y), p.center) - p.radius).max(0.0))
            .fold(f32::INFINITY, f32::min);
        let falloff = water_falloff(nearest, threshold);
        SurfaceCell::new(classify(value, falloff, &config.thresholds), value)
    };

    #[cfg(feature = "parallel")]
    let cells: Vec<SurfaceCell> = (0..rows * cols).into_par_iter().map(cell_at).collect();
    #[cfg(not(feature = "parallel"))]
    let cells: Vec<SurfaceCell> = (0..rows * cols).map(cell_at).collect();

    let water = cells.iter().filter(|c| c.category.is_water()).count();
    tracing::debug!(
        target: "skirmish_mapgen::surface",
        rows,
        cols,
        water_ratio = water as f32 / (rows * cols) as f32,
        "mapgen.surface.synthesized"
    );

    SurfaceMap { rows, cols, cells }
}
