//! CLI utility converting bot navigation meshes into `info_node` entities

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use bsp_entities::{load_entities, serialize_entities};
use nav_common::keyvalue;
use nav_mesh::{AreaGrid, NavMesh};
use nav_nodes::{generate, is_generated_entity, nodes_to_text, BuildFlags, NodeBuildConfig};

/// Convert `.nav` into `info_node` entities.
///
/// Reads `<BSP_FILE>` and the `.nav` file next to it, and writes the map's
/// entities followed by the generated nodes to `<BSP_FILE>.ent`.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// BSP file path. The NAV file must be located in the same directory.
    #[clap(value_parser)]
    bsp_file: PathBuf,

    /// Build modes: a = connections, b = encounter data, c = inside of areas
    /// (at least 1 entity per area). Defaults to "c".
    #[clap(long = "build-flag", short = 'f', value_parser = parse_build_flags)]
    order: Option<BuildFlags>,

    /// JSON file overriding node build parameters
    #[clap(long, value_parser)]
    config: Option<PathBuf>,

    /// Output entity file (defaults to the BSP path with an .ent extension)
    #[clap(long, short, value_parser)]
    output: Option<PathBuf>,

    /// Print the area beneath a position (x,y,z)
    #[clap(long, value_parser = parse_vector)]
    locate: Option<Vec3>,

    /// Write a JSON summary of the conversion
    #[clap(long, value_parser)]
    summary_json: Option<PathBuf>,

    /// Enable debug logging
    #[clap(short, long)]
    verbose: bool,
}

/// Outcome of a conversion
#[derive(Serialize, Debug, Default, PartialEq)]
struct Summary {
    nav_version: u32,
    area_count: usize,
    places: Vec<String>,
    corruption_count: usize,
    build_flags: String,
    entity_bytes: usize,
    info_node_count: usize,
}

fn parse_build_flags(s: &str) -> Result<BuildFlags, String> {
    BuildFlags::parse(s).map_err(|e| e.to_string())
}

/// Parse a comma-separated vector
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();

    if parts.len() != 3 {
        return Err(format!(
            "Vector must have 3 components, got {}",
            parts.len()
        ));
    }

    let x = parts[0].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let z = parts[2].trim().parse::<f32>().map_err(|e| e.to_string())?;

    Ok(Vec3::new(x, y, z))
}

fn load_config(path: Option<&Path>) -> Result<NodeBuildConfig> {
    let Some(path) = path else {
        return Ok(NodeBuildConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: NodeBuildConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

fn load_nav(path: &Path) -> Result<(NavMesh, usize)> {
    let mut mesh = NavMesh::load(path)
        .with_context(|| format!("Failed to load navigation mesh {}", path.display()))?;
    let report = mesh.resolve();
    Ok((mesh, report.issues.len()))
}

fn locate(mesh: &NavMesh, grid: &AreaGrid<'_>, pos: Vec3) {
    match grid.query(&pos) {
        Some(area) => {
            let place = mesh
                .place_of(area)
                .map(|p| p.name.as_str())
                .unwrap_or("-");
            println!(
                "Area at ({}): #{} place {} z {:.1}",
                keyvalue(&pos),
                area.id,
                place,
                area.get_z(&pos)
            );
        }
        None => println!("Area at ({}): none", keyvalue(&pos)),
    }
}

fn convert(args: &Args) -> Result<Summary> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(order) = args.order {
        config.build_flags = order;
    }
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    let nav_path = args.bsp_file.with_extension("nav");
    let (mesh, corruption_count) = load_nav(&nav_path)?;
    println!("NAV Version: {}", mesh.version());
    println!("NAV Area Count: {}", mesh.area_count());
    if corruption_count > 0 {
        println!("NAV Corrupt References: {}", corruption_count);
    }

    let grid = mesh.build_grid();
    let (size_x, size_y) = grid.dimensions();
    log::debug!("Area grid: {}x{} cells, {} areas", size_x, size_y, grid.area_count());
    if let Some(pos) = args.locate {
        locate(&mesh, &grid, pos);
    }

    let entities = load_entities(&args.bsp_file)
        .with_context(|| format!("Failed to read entities of {}", args.bsp_file.display()))?;
    let kept: Vec<_> = entities
        .into_iter()
        .filter(|e| !is_generated_entity(e))
        .collect();
    let mut text = serialize_entities(&kept);
    let entity_bytes = text.len();
    println!("BSP Entities: {} byte(s)", entity_bytes);

    println!("info_node Build Order:");
    for mode in config.build_flags.modes() {
        println!("- {}", mode.description());
    }
    println!();

    let nodes = generate(&mesh, &config).context("Failed to generate info_node entities")?;
    for node in &nodes {
        println!("[{}, {}]", node.id_string(), node.place_label(&mesh));
    }
    text.push_str(&nodes_to_text(&mesh, &nodes));

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.bsp_file.with_extension("ent"));
    fs::write(&output, text).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("info_node Total: {}", nodes.len());

    Ok(Summary {
        nav_version: mesh.version(),
        area_count: mesh.area_count(),
        places: mesh.places().iter().map(|p| p.name.clone()).collect(),
        corruption_count,
        build_flags: config.build_flags.to_string(),
        entity_bytes,
        info_node_count: nodes.len(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let summary = convert(&args)?;

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
