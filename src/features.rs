//! Разбрасывание блокирующих препятствий с соблюдением всех зазоров.

use crate::clearance::ClearPath;
use crate::config::MapConfig;
use crate::resources::FIELD_GAP;
use crate::rng::MapRng;
use crate::surface::SurfaceMap;
use crate::types::{
    FeatureKind, GenerationWarning, ResourceField, StartPosition, TerrainFeature, distance,
};

const FEATURE_ATTEMPTS: usize = 30;

/// Всё, от чего препятствия должны держаться подальше
pub struct FeatureContext<'a> {
    pub config: &'a MapConfig,
    pub starts: &'a [StartPosition],
    pub fields: &'a [ResourceField],
    pub paths: &'a [ClearPath],
    pub surface: &'a SurfaceMap,
}

impl FeatureContext<'_> {
    fn accepts(&self, x: usize, y: usize, size: usize) -> bool {
        if x + size > self.config.cols || y + size > self.config.rows {
            return false;
        }
        let pos = (x as f32, y as f32);
        let clear_of_bases = self
            .starts
            .iter()
            .all(|s| distance(pos, s.center()) >= self.config.min_base_clearance);
        let off_paths = !self.paths.iter().any(|p| p.contains(pos));
        let clear_of_fields = self
            .fields
            .iter()
            .all(|f| distance(pos, f.center()) >= f.radius as f32 + FIELD_GAP);
        // Проходы, вырезанные раньше, не перекрываем
        let keeps_chokes = (0..size)
            .flat_map(|dy| (0..size).map(move |dx| (x + dx, y + dy)))
            .all(|(cx, cy)| !self.surface.get(cx, cy).choke);
        clear_of_bases && off_paths && clear_of_fields && keeps_chokes
    }
}

/// Количество препятствий: `rows × cols × terrain_density / 10`
#[must_use]
pub fn requested_feature_count(config: &MapConfig) -> usize {
    ((config.rows * config.cols) as f32 * config.terrain_density / 10.0).floor() as usize
}

/// Размещает препятствия; те, что не нашли места за 30 попыток, просто пропускаются.
pub fn scatter_features(
    ctx: &FeatureContext<'_>,
    rng: &mut MapRng,
) -> (Vec<TerrainFeature>, Option<GenerationWarning>) {
    let requested = requested_feature_count(ctx.config);
    let mut features = Vec::with_capacity(requested);

    for _ in 0..requested {
        for _ in 0..FEATURE_ATTEMPTS {
            let x = rng.range_inclusive(0, ctx.config.cols - 1);
            let y = rng.range_inclusive(0, ctx.config.rows - 1);
            // Камни вдвое вероятнее обрывов и кратеров
            let kind = match rng.range_inclusive(0, 3) {
                0 | 1 => FeatureKind::Rock,
                2 => FeatureKind::Cliff,
                _ => FeatureKind::Crater,
            };
            let size = rng.range_inclusive(1, 2);
            let rotation = rng.range_f32(0.0, 360.0);

            if ctx.accepts(x, y, size) {
                features.push(TerrainFeature {
                    kind,
                    grid_x: x,
                    grid_y: y,
                    size,
                    rotation,
                });
                break;
            }
        }
    }

    let warning = (features.len() < requested).then(|| {
        tracing::warn!(
            target: "skirmish_mapgen::features",
            requested,
            placed = features.len(),
            "mapgen.features.omitted"
        );
        GenerationWarning::FeatureOmitted {
            requested,
            placed: features.len(),
        }
    });
    tracing::debug!(
        target: "skirmish_mapgen::features",
        placed = features.len(),
        "mapgen.features.scattered"
    );
    (features, warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clearance::compute_clear_paths;
    use crate::surface::{SurfaceCell, TerrainCategory};

    fn flat(config: &MapConfig) -> SurfaceMap {
        SurfaceMap {
            rows: config.rows,
            cols: config.cols,
            cells: vec![SurfaceCell::new(TerrainCategory::Sand, 0.5); config.rows * config.cols],
        }
    }

    fn bases() -> Vec<StartPosition> {
        vec![
            StartPosition::new(0, 3, 24, 32),
            StartPosition::new(1, 34, 3, 32),
        ]
    }

    #[test]
    fn zero_density_places_nothing() {
        let config = MapConfig {
            terrain_density: 0.0,
            ..MapConfig::default()
        };
        let surface = flat(&config);
        let starts = bases();
        let ctx = FeatureContext {
            config: &config,
            starts: &starts,
            fields: &[],
            paths: &[],
            surface: &surface,
        };
        let (features, warning) = scatter_features(&ctx, &mut MapRng::new(1));
        assert!(features.is_empty());
        assert!(warning.is_none());
    }

    #[test]
    fn features_respect_every_clearance() {
        let config = MapConfig {
            terrain_density: 0.3,
            ..MapConfig::default()
        };
        let mut surface = flat(&config);
        for x in 10..14 {
            surface.get_mut(x, 8).choke = true;
        }
        let starts = bases();
        let fields = vec![ResourceField {
            id: 0,
            grid_x: 20,
            grid_y: 15,
            radius: 3,
            density: 0.9,
            kind: crate::types::FieldKind::Contested,
            resource: crate::types::ResourceKind::Blue,
            link: None,
        }];
        let paths = compute_clear_paths(&config, &starts);
        let ctx = FeatureContext {
            config: &config,
            starts: &starts,
            fields: &fields,
            paths: &paths,
            surface: &surface,
        };

        for seed in 0..10 {
            let (features, _) = scatter_features(&ctx, &mut MapRng::new(seed));
            assert!(features.len() <= requested_feature_count(&config));
            for f in &features {
                let pos = (f.grid_x as f32, f.grid_y as f32);
                assert!((1..=2).contains(&f.size));
                for s in &starts {
                    assert!(distance(pos, s.center()) >= config.min_base_clearance);
                }
                assert!(paths.iter().all(|p| !p.contains(pos)));
                assert!(distance(pos, fields[0].center()) >= 5.0);
                assert!(f.cells().all(|(x, y)| !surface.get(x, y).choke));
            }
        }
    }

    #[test]
    fn feature_count_scales_with_area() {
        let config = MapConfig {
            terrain_density: 0.1,
            ..MapConfig::default()
        };
        assert_eq!(requested_feature_count(&config), 12);
    }
}
