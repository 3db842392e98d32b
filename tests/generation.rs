use skirmish_mapgen::config::BASE_FOOTPRINT;
use skirmish_mapgen::types::distance;
use skirmish_mapgen::{
    CellGrid, CoherentNoise, ConfigError, FieldKind, GenerationWarning, GridCell, GridPathfinder,
    HashNoise, LayoutStrategy, MapConfig, MapGenerator, NoiseProvider, PathOptions, Pathfinder,
    ResourceKind, SurfaceMap, TerrainSink,
};

fn generator(config: MapConfig) -> MapGenerator<HashNoise, GridPathfinder> {
    MapGenerator::new(config, HashNoise::default(), GridPathfinder).unwrap()
}

fn layouts() -> Vec<MapConfig> {
    [
        (LayoutStrategy::Symmetric2p, 2),
        (LayoutStrategy::Symmetric4p, 4),
        (LayoutStrategy::Lanes, 2),
        (LayoutStrategy::AsymmetricBalanced, 3),
    ]
    .into_iter()
    .map(|(layout, players)| MapConfig::default().with_layout(layout, players))
    .collect()
}

fn assert_same_seed_same_map<N: NoiseProvider + Default>() {
    for config in layouts() {
        for seed in [0, 7, 12345] {
            let mut first = MapGenerator::new(config.clone(), N::default(), GridPathfinder).unwrap();
            let mut second = MapGenerator::new(config.clone(), N::default(), GridPathfinder).unwrap();
            let (a, _) = first.build_attempt(seed);
            let (b, _) = second.build_attempt(seed);
            assert_eq!(a.start_positions, b.start_positions);
            assert_eq!(a.resource_fields, b.resource_fields);
            assert_eq!(a.surface, b.surface);
            assert_eq!(a, b);
        }
    }
}

#[test]
fn same_seed_gives_identical_maps() {
    assert_same_seed_same_map::<HashNoise>();
}

#[test]
fn same_seed_gives_identical_maps_with_coherent_noise() {
    assert_same_seed_same_map::<CoherentNoise>();
}

#[test]
fn coherent_noise_generator_is_reusable_across_seeds() {
    let mut generator =
        MapGenerator::new(MapConfig::default(), CoherentNoise::default(), GridPathfinder).unwrap();
    let (first, _) = generator.build_attempt(11);
    let _ = generator.build_attempt(12);
    let (again, _) = generator.build_attempt(11);
    assert_eq!(first, again);

    let mut fresh =
        MapGenerator::new(MapConfig::default(), CoherentNoise::new(999), GridPathfinder).unwrap();
    let (other, _) = fresh.build_attempt(11);
    assert_eq!(first, other);
}

#[test]
fn every_field_keeps_base_clearance() {
    let mut configs = layouts();
    configs.push(MapConfig {
        min_base_clearance: 10.0,
        ..MapConfig::default().with_layout(LayoutStrategy::Lanes, 2)
    });
    configs.push(MapConfig {
        min_base_clearance: 9.0,
        ..MapConfig::default().with_layout(LayoutStrategy::AsymmetricBalanced, 4)
    });

    for config in configs {
        for seed in 0..5 {
            let (map, _) = generator(config.clone()).build_attempt(seed);
            for field in &map.resource_fields {
                for start in &map.start_positions {
                    let d = distance(field.center(), start.center());
                    assert!(
                        d >= config.min_base_clearance,
                        "{:?} seed {seed}: field {} is {d} from base {}",
                        config.layout,
                        field.id,
                        start.player_id
                    );
                }
            }
        }
    }
}

#[test]
fn lanes_too_close_to_center_is_rejected() {
    let config = MapConfig {
        min_base_clearance: 12.0,
        ..MapConfig::default().with_layout(LayoutStrategy::Lanes, 2)
    };
    assert!(matches!(
        MapGenerator::new(config, HashNoise::default(), GridPathfinder),
        Err(ConfigError::ContestedTooClose { .. })
    ));
}

#[test]
fn fields_stay_in_bounds_and_apart() {
    let config = MapConfig::default();
    for seed in 0..20 {
        let (map, _) = generator(config.clone()).build_attempt(seed);
        for field in &map.resource_fields {
            assert!(field.grid_x >= field.radius);
            assert!(field.grid_x + field.radius < config.cols);
            assert!(field.grid_y >= field.radius);
            assert!(field.grid_y + field.radius < config.rows);
        }
        for (i, a) in map.resource_fields.iter().enumerate() {
            for b in &map.resource_fields[i + 1..] {
                let gap = (a.radius + b.radius) as f32 + 2.0;
                assert!(
                    distance(a.center(), b.center()) >= gap,
                    "seed {seed}: fields {} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }
}

#[test]
fn symmetric_two_player_layout_is_exact() {
    let config = MapConfig::default();
    let m = config.base_margin;
    let (map, _) = generator(config.clone()).build_attempt(99);
    let starts = &map.start_positions;
    assert_eq!(starts.len(), 2);
    assert_eq!(
        (starts[0].grid_x, starts[0].grid_y),
        (m, config.rows - m - BASE_FOOTPRINT)
    );
    assert_eq!(
        (starts[1].grid_x, starts[1].grid_y),
        (config.cols - m - BASE_FOOTPRINT, m)
    );
}

#[test]
fn generated_bases_are_connected_or_budget_spent() {
    for seed in [1, 2, 3, 12345] {
        let mut generator = generator(MapConfig::default());
        let outcome = generator.generate_with_seed(seed);
        if !outcome.validated {
            assert_eq!(outcome.attempts, 10);
            continue;
        }
        let starts = &outcome.map.start_positions;
        for (i, a) in starts.iter().enumerate() {
            for b in &starts[i + 1..] {
                let path = GridPathfinder.find_path(
                    &outcome.map.grid,
                    a.world_pos(),
                    b.world_pos(),
                    &PathOptions::default(),
                );
                assert!(!path.is_empty());
            }
        }
    }
}

#[test]
fn zero_terrain_density_places_no_features() {
    let config = MapConfig {
        terrain_density: 0.0,
        ..MapConfig::default()
    };
    for seed in 0..5 {
        let outcome = generator(config.clone()).generate_with_seed(seed);
        assert!(outcome.map.terrain_features.is_empty());
        assert!(
            !outcome
                .warnings
                .iter()
                .any(|w| matches!(w, GenerationWarning::FeatureOmitted { .. }))
        );
    }
}

#[test]
fn default_map_with_seed_12345_has_one_blue_center_field() {
    let config = MapConfig::default().with_seed(12345);
    assert_eq!((config.rows, config.cols), (30, 40));
    let outcome = generator(config).generate();

    assert_eq!(outcome.map.start_positions.len(), 2);
    let contested: Vec<_> = outcome
        .map
        .resource_fields
        .iter()
        .filter(|f| f.kind == FieldKind::Contested)
        .collect();
    assert_eq!(contested.len(), 1);
    let field = contested[0];
    assert_eq!(field.resource, ResourceKind::Blue);
    assert_eq!((field.grid_x, field.grid_y, field.radius), (20, 15, 3));
}

#[test]
fn two_generators_agree_on_first_surface_row() {
    let config = MapConfig::default();
    let (a, _) = generator(config.clone()).build_attempt(4242);
    let (b, _) = generator(config).build_attempt(4242);

    assert_eq!((a.surface.rows, a.surface.cols), (30, 40));
    assert_eq!((b.surface.rows, b.surface.cols), (30, 40));
    let first_a: Vec<_> = a.surface.row(0).iter().map(|c| c.category).collect();
    let first_b: Vec<_> = b.surface.row(0).iter().map(|c| c.category).collect();
    assert_eq!(first_a, first_b);
}

#[test]
fn base_footprints_stay_buildable() {
    for seed in 0..10 {
        let (map, _) = generator(MapConfig::default()).build_attempt(seed);
        for start in &map.start_positions {
            for dy in 0..BASE_FOOTPRINT {
                for dx in 0..BASE_FOOTPRINT {
                    let (x, y) = (start.grid_x + dx, start.grid_y + dy);
                    let cell = map.surface.get(x, y);
                    assert!(cell.buildable && cell.walkable && !cell.blocked);
                    assert!(map.grid.is_walkable(y, x));
                }
            }
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    surface: Option<(usize, usize)>,
    cells: usize,
    resources: usize,
}

impl TerrainSink for RecordingSink {
    fn set_surface_map(&mut self, surface: &SurfaceMap) {
        self.surface = Some((surface.rows, surface.cols));
    }

    fn set_cell(&mut self, _row: usize, _col: usize, cell: GridCell) {
        self.cells += 1;
        if cell.has_resource {
            self.resources += 1;
        }
    }
}

#[test]
fn external_grid_receives_only_final_map() {
    let config = MapConfig::default().with_seed(31);
    let mut generator = generator(config);
    let mut sink = RecordingSink::default();
    let outcome = generator.generate_into(&mut sink);

    assert_eq!(sink.surface, Some((30, 40)));
    assert_eq!(sink.cells, 30 * 40);
    let stamped = outcome.map.grid.cells.iter().filter(|c| c.has_resource).count();
    assert_eq!(sink.resources, stamped);
}

struct FirstAttemptsFail {
    remaining: std::cell::Cell<u32>,
}

impl Pathfinder for FirstAttemptsFail {
    fn find_path(
        &self,
        grid: &CellGrid,
        start: (f32, f32),
        end: (f32, f32),
        options: &PathOptions,
    ) -> Vec<(usize, usize)> {
        if self.remaining.get() > 0 {
            self.remaining.set(self.remaining.get() - 1);
            return Vec::new();
        }
        GridPathfinder.find_path(grid, start, end, options)
    }
}

#[test]
fn failed_attempts_are_retried_with_new_seed() {
    let pathfinder = FirstAttemptsFail {
        remaining: std::cell::Cell::new(2),
    };
    let mut generator =
        MapGenerator::new(MapConfig::default(), HashNoise::default(), pathfinder).unwrap();
    let outcome = generator.generate_with_seed(5);

    assert!(outcome.attempts >= 3);
    let failed: Vec<u32> = outcome
        .warnings
        .iter()
        .filter_map(|w| match w {
            GenerationWarning::Unreachable { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert!(failed.starts_with(&[1, 2]));
    assert_ne!(outcome.map.seed, 5);
}
