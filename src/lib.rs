pub mod chokepoints;
pub mod clearance;
pub mod config;
pub mod expansion;
pub mod features;
pub mod generator;
pub mod grid;
pub mod noise;
pub mod pathfinding;
pub mod preview;
pub mod resources;
pub mod rivers;
pub mod rng;
pub mod start;
pub mod surface;
pub mod transition;
pub mod types;

pub use config::{ConfigError, LayoutStrategy, MapConfig, ReplayState, SurfaceThresholds};
pub use generator::{GeneratedMap, GenerationOutcome, GenerationState, MapGenerator};
pub use grid::{CellGrid, GridCell, TerrainSink};
pub use noise::{CoherentNoise, HashNoise, NoiseProvider};
pub use pathfinding::{GridPathfinder, PathOptions, Pathfinder};
pub use preview::{PreviewError, render_preview, save_preview};
pub use surface::{SurfaceCell, SurfaceMap, TerrainCategory};
pub use types::{
    ChokePoint, ExpansionZone, FeatureKind, FieldKind, GenerationWarning, ResourceField,
    ResourceKind, RiverPath, StartPosition, TerrainFeature,
};
