use clap::Parser;
use skirmish_mapgen::{
    CoherentNoise, GenerationOutcome, GridPathfinder, MapConfig, MapGenerator, ReplayState,
    save_preview,
};
use std::fs;
use std::path::PathBuf;

/// Генератор карт для схваток
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long, required_unless_present = "replay")]
    config: Option<PathBuf>,

    /// Сид первой попытки (перекрывает сид из конфигурации)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Повторить карту по сохранённому replay.json
    #[arg(long, conflicts_with_all = ["config", "seed"])]
    replay: Option<PathBuf>,

    /// Каталог для map.json, replay.json и surface.png
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Пикселей на клетку в превью
    #[arg(long, default_value_t = 8)]
    preview_scale: u32,
}

fn run(
    config: MapConfig,
    seed: Option<u64>,
) -> Result<(GenerationOutcome, ReplayState), Box<dyn std::error::Error>> {
    let mut generator = MapGenerator::new(config, CoherentNoise::default(), GridPathfinder)?;
    let outcome = match seed {
        Some(seed) => generator.generate_with_seed(seed),
        None => generator.generate(),
    };
    let replay = generator.replay_state(&outcome);
    Ok((outcome, replay))
}

fn announce(config: &MapConfig) {
    println!(
        "Генерация карты (размер: {}×{}, игроков: {})...",
        config.cols, config.rows, config.player_count
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    let (outcome, replay) = if let Some(path) = &cli.replay {
        println!("🔍 Загрузка состояния для повтора...");
        let replay: ReplayState = serde_json::from_str(&fs::read_to_string(path)?)?;
        announce(&replay.config);
        let mut generator =
            MapGenerator::new(replay.config.clone(), CoherentNoise::default(), GridPathfinder)?;
        (generator.replay(&replay)?, replay)
    } else if let Some(path) = &cli.config {
        println!("🔍 Загрузка конфигурации...");
        let config = MapConfig::from_toml_file(path)?;
        announce(&config);
        run(config, cli.seed)?
    } else {
        return Err("either --config or --replay is required".into());
    };

    if outcome.validated {
        println!("Связность подтверждена с попытки {}", outcome.attempts);
    } else {
        println!(
            "⚠ Базы не связаны после {} попыток, сохраняется последняя карта",
            outcome.attempts
        );
    }
    for warning in &outcome.warnings {
        println!("  - {warning:?}");
    }

    fs::create_dir_all(&cli.output_dir)?;
    let map_path = cli.output_dir.join("map.json");
    let replay_path = cli.output_dir.join("replay.json");
    let preview_path = cli.output_dir.join("surface.png");

    println!("Сохранение в {:?}", cli.output_dir);
    fs::write(&map_path, serde_json::to_string_pretty(&outcome)?)?;
    fs::write(&replay_path, serde_json::to_string_pretty(&replay)?)?;
    save_preview(&outcome.map, cli.preview_scale, &preview_path)?;

    println!("\nГотово! Сид карты: {}", replay.seed);
    Ok(())
}
