// src/preview.rs
//! Визуализация сгенерированной карты в изображение
//!
//! Этот модуль превращает результат генерации в картинку для отладки:
//! - Категории поверхности — базовые цвета (`TerrainCategory::to_rgb`)
//! - Клетки с ресурсом — зелёный или синий в зависимости от сорта
//! - Препятствия — тёмно-серые квадраты
//! - Основания баз — красные рамки, проходы — светлые точки в центре
//!
//! ## Пример использования
//! ```rust,ignore
//! let outcome = generator.generate();
//! save_preview(&outcome.map, 8, "output/surface.png")?;
//! ```

use crate::config::BASE_FOOTPRINT;
use crate::generator::GeneratedMap;
use crate::types::ResourceKind;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("preview scale must be positive")]
    ZeroScale,
    #[error("failed to write preview image: {0}")]
    Image(#[from] image::ImageError),
}

const FEATURE_COLOR: Rgba<u8> = Rgba([70, 66, 62, 255]);
const BASE_COLOR: Rgba<u8> = Rgba([210, 40, 40, 255]);
const CHOKE_COLOR: Rgba<u8> = Rgba([250, 240, 200, 255]);
const FIELD_OUTLINE: Rgba<u8> = Rgba([250, 250, 250, 255]);

fn resource_color(kind: ResourceKind) -> Rgba<u8> {
    match kind {
        ResourceKind::Green => Rgba([60, 220, 60, 255]),
        ResourceKind::Blue => Rgba([60, 160, 250, 255]),
    }
}

/// Рисует карту, по `scale × scale` пикселей на клетку
///
/// # Параметры
/// * `map` — результат генерации (используется собранная сетка, а не внешний приёмник)
/// * `scale` — размер клетки в пикселях
///
/// # Возвращает
/// RGBA-изображение размером `cols × scale` на `rows × scale`
#[must_use]
pub fn render_preview(map: &GeneratedMap, scale: u32) -> RgbaImage {
    let scale = scale.max(1);
    let grid = &map.grid;
    let (w, h) = (grid.cols as u32 * scale, grid.rows as u32 * scale);
    let mut img: RgbaImage = ImageBuffer::new(w, h);

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let cell = grid.get(row, col);
            let color = match (cell.resource_kind, cell.blocked) {
                (Some(kind), _) => resource_color(kind),
                (None, true) if !cell.terrain.is_water() => FEATURE_COLOR,
                _ => {
                    let [r, g, b] = cell.terrain.to_rgb();
                    Rgba([r, g, b, 255])
                }
            };
            let rect = Rect::at(col as i32 * scale as i32, row as i32 * scale as i32)
                .of_size(scale, scale);
            draw_filled_rect_mut(&mut img, rect, color);
        }
    }

    let s = scale as i32;
    for field in &map.resource_fields {
        let center = (
            field.grid_x as i32 * s + s / 2,
            field.grid_y as i32 * s + s / 2,
        );
        draw_hollow_circle_mut(&mut img, center, field.radius as i32 * s + s / 2, FIELD_OUTLINE);
    }
    for choke in &map.choke_points {
        let rect = Rect::at(choke.grid_x as i32 * s, choke.grid_y as i32 * s).of_size(scale, scale);
        draw_filled_rect_mut(&mut img, rect, CHOKE_COLOR);
    }
    let side = BASE_FOOTPRINT as u32 * scale;
    for start in &map.start_positions {
        let rect = Rect::at(start.grid_x as i32 * s, start.grid_y as i32 * s).of_size(side, side);
        draw_hollow_rect_mut(&mut img, rect, BASE_COLOR);
    }
    img
}

/// Сохраняет превью в PNG-файл
///
/// # Ошибки
/// Возвращает ошибку при нулевом масштабе или если файл нельзя записать.
pub fn save_preview(
    map: &GeneratedMap,
    scale: u32,
    path: impl AsRef<Path>,
) -> Result<(), PreviewError> {
    if scale == 0 {
        return Err(PreviewError::ZeroScale);
    }
    render_preview(map, scale).save(path)?;
    Ok(())
}
