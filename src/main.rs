use anyhow::Context;
use clap::Parser;
use parktrails::models::LayerInfo;
use parktrails::provider::{MemoryLayer, MemoryMap};
use parktrails::script::{self, Output};
use parktrails::utils::status::print_rows;
use parktrails::{Config, ParkMap, Source, logging};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Replays a park map session from a JSON-lines script
#[derive(Parser, Debug)]
#[command(name = "parktrails", version)]
struct Args {
    /// GeoJSON feature collection of park boundaries
    #[arg(long)]
    parks: PathBuf,

    /// GeoJSON feature collection of hiking trails
    #[arg(long)]
    trails: PathBuf,

    /// Session script, one JSON command per line. Reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// JSON file overriding the default configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long)]
    verbose: bool,
}

fn load_map(config: &Config) -> anyhow::Result<Arc<MemoryMap>> {
    let Some(Source::GeoJson { parks, trails }) = &config.source else {
        anyhow::bail!("no feature source configured");
    };
    let parks = MemoryLayer::from_path(LayerInfo::new("parks", &config.boundary_layer_title), parks)?;
    let trails = MemoryLayer::from_path(LayerInfo::new("trails", &config.trails_layer_title), trails)?;
    info!(
        parks = parks.features().len(),
        trails = trails.features().len(),
        "layers loaded"
    );
    Ok(Arc::new(
        MemoryMap::new(vec![Arc::new(parks), Arc::new(trails)]).with_tolerance(config.hit_tolerance),
    ))
}

fn read_script(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read script from stdin")?;
            Ok(source)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.source = Some(Source::GeoJson {
        parks: args.parks.clone(),
        trails: args.trails.clone(),
    });

    let memory = load_map(&config)?;
    let commands = script::parse_script(&read_script(args.script.as_ref())?)?;
    let app = ParkMap::from_memory(config, memory.clone())?;

    for command in commands {
        match script::execute(&app, &memory, command).await? {
            Output::Message(message) => println!("{}", message),
            Output::Rows(rows) => {
                let table = app.table();
                print_rows(&table.title(), &table.description(), &rows);
            }
        }
    }
    Ok(())
}
