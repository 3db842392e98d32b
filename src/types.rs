//! Общие типы конвейера: базы, ресурсные поля, экспансии, проходы, реки, препятствия.
//!
//! Координаты сетки — `(x, y)` = `(столбец, строка)`, начало в левом верхнем углу.

use crate::config::BASE_FOOTPRINT;
use serde::{Deserialize, Serialize};

/// Евклидово расстояние между точками сетки
#[must_use]
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Стартовая позиция игрока.
///
/// `grid_x`/`grid_y` — левый верхний угол основания 3×3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartPosition {
    pub player_id: usize,
    pub grid_x: usize,
    pub grid_y: usize,
    /// Центр основания в мировых единицах
    pub pixel_x: f32,
    pub pixel_y: f32,
}

impl StartPosition {
    #[must_use]
    pub fn new(player_id: usize, grid_x: usize, grid_y: usize, cell_size: u32) -> Self {
        let half = BASE_FOOTPRINT as f32 / 2.0;
        Self {
            player_id,
            grid_x,
            grid_y,
            pixel_x: (grid_x as f32 + half) * cell_size as f32,
            pixel_y: (grid_y as f32 + half) * cell_size as f32,
        }
    }

    /// Центральная клетка основания
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        let mid = (BASE_FOOTPRINT / 2) as f32;
        (self.grid_x as f32 + mid, self.grid_y as f32 + mid)
    }

    #[must_use]
    pub fn world_pos(&self) -> (f32, f32) {
        (self.pixel_x, self.pixel_y)
    }

    /// Лежит ли клетка внутри основания
    #[must_use]
    pub fn covers(&self, x: usize, y: usize) -> bool {
        (self.grid_x..self.grid_x + BASE_FOOTPRINT).contains(&x)
            && (self.grid_y..self.grid_y + BASE_FOOTPRINT).contains(&y)
    }
}

/// Назначение ресурсного поля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Богатое поле в центре карты
    Contested,
    NearBase,
    /// Одна из двух половин пары, отражённой через центр
    Mirrored,
    Expansion,
}

/// Сорт ресурса, записываемый в клетки сетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Green,
    /// Редкий и дорогой сорт, только в спорном центре
    Blue,
}

impl ResourceKind {
    /// Запас ресурса в одной заполненной клетке
    #[must_use]
    pub fn cell_amount(self) -> u32 {
        match self {
            ResourceKind::Green => 500,
            ResourceKind::Blue => 1000,
        }
    }
}

impl FieldKind {
    #[must_use]
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            FieldKind::Contested => ResourceKind::Blue,
            _ => ResourceKind::Green,
        }
    }
}

/// Круглое ресурсное поле.
///
/// Инварианты (проверяются до добавления): поле целиком в границах карты,
/// отстоит от любого другого поля на `r1 + r2 + 2` и от любой базы на `min_base_clearance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceField {
    pub id: usize,
    pub grid_x: usize,
    pub grid_y: usize,
    pub radius: usize,
    /// Вероятность заполнения клетки внутри радиуса
    pub density: f32,
    pub kind: FieldKind,
    pub resource: ResourceKind,
    /// Парное зеркальное поле или зона экспансии, к которой привязано поле
    pub link: Option<usize>,
}

impl ResourceField {
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.grid_x as f32, self.grid_y as f32)
    }
}

/// Вторичная площадка для застройки со своим ресурсным полем
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionZone {
    pub id: usize,
    pub player_id: usize,
    pub grid_x: usize,
    pub grid_y: usize,
    /// Сторона квадратной площадки в клетках
    pub size: usize,
    pub field_id: usize,
}

impl ExpansionZone {
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.grid_x as f32, self.grid_y as f32)
    }
}

/// Узкий гарантированно проходимый коридор между базами
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChokePoint {
    pub grid_x: usize,
    pub grid_y: usize,
    pub width: usize,
    pub length: usize,
    /// Угол оси база–база в радианах
    pub angle: f32,
    pub cleared: bool,
}

/// Путь реки от края карты внутрь; хранится для отладки и превью
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiverPath {
    pub cells: Vec<(usize, usize)>,
    pub width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Rock,
    Cliff,
    Crater,
}

/// Блокирующее препятствие
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    pub kind: FeatureKind,
    pub grid_x: usize,
    pub grid_y: usize,
    /// Сторона квадратного основания в клетках
    pub size: usize,
    /// Поворот в градусах, только для отрисовки
    pub rotation: f32,
}

impl TerrainFeature {
    /// Клетки основания препятствия
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size)
            .flat_map(move |dy| (0..self.size).map(move |dx| (self.grid_x + dx, self.grid_y + dy)))
    }
}

/// Нефатальные события генерации, которые раньше уходили только в лог
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationWarning {
    /// Случайный поиск не удался, поле поставлено в запасную позицию
    FieldFallback { player_id: usize, kind: FieldKind },
    /// Даже запасная позиция нарушает инварианты, поле пропущено
    FieldOmitted { player_id: usize, kind: FieldKind },
    /// Зеркальная пара не прошла проверки, отброшены обе половины
    MirrorPairDropped { pair: usize },
    ExpansionSkipped { player_id: usize, zone: usize },
    /// Поставлено меньше препятствий, чем запрошено
    FeatureOmitted { requested: usize, placed: usize },
    /// Между базами нет пути
    Unreachable { attempt: u32, from: usize, to: usize },
    /// Все попытки исчерпаны, возвращена последняя карта
    AttemptsExhausted { attempts: u32 },
}
