use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use partview::catalog::Catalog;
use partview::loader::{CancelToken, FsSource, load_scene};
use partview::model::{PartInfo, SystemContent};
use partview::procedural;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse 3D assemblies and inspect their parts", long_about = None)]
struct Cli {
    /// JSON catalog listing the systems to offer (defaults to the built-in demos)
    #[arg(short, long, value_name = "CATALOG_FILE")]
    catalog: Option<Utf8PathBuf>,

    /// Model files (.glb, .gltf, .obj) to add as extra systems
    #[arg(short, long = "open", value_name = "MODEL_FILE")]
    open: Vec<Utf8PathBuf>,

    /// Id of the system shown first
    #[arg(short, long)]
    system: Option<String>,

    /// Print the catalog as JSON and exit
    #[arg(long)]
    list: bool,

    /// Print the parts of the given system as JSON and exit
    #[arg(long, value_name = "SYSTEM_ID")]
    dump_parts: Option<String>,
}

fn dump_parts(catalog: &Catalog, id: &str) -> Result<Vec<PartInfo>> {
    let system = catalog
        .get(id)
        .with_context(|| format!("No system with id '{}'", id))?;
    let scene = match &system.content {
        SystemContent::Procedural { kind } => procedural::build_scene(kind),
        SystemContent::Asset { path } => {
            load_scene(&mut FsSource, path, &CancelToken::new(), |_| {})
                .with_context(|| format!("Failed to load {}", path))?
        }
    };
    Ok(scene.parts())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    let mut opened = Vec::new();
    for path in &cli.open {
        let system = catalog
            .push_asset(path.clone())
            .with_context(|| format!("Cannot open {}", path))?;
        opened.push(system.id.clone());
    }
    if let Some(id) = &cli.system {
        if catalog.get(id).is_none() {
            bail!("No system with id '{}'", id);
        }
    }

    if cli.list {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }
    if let Some(id) = &cli.dump_parts {
        let parts = dump_parts(&catalog, id)?;
        println!("{}", serde_json::to_string_pretty(&parts)?);
        return Ok(());
    }

    // Without an explicit --system, show the first model given with --open.
    let initial = cli.system.clone().or_else(|| opened.first().cloned());
    run_viewer(catalog, initial)
}

#[cfg(feature = "egui")]
fn run_viewer(catalog: Catalog, initial: Option<String>) -> Result<()> {
    partview::egui_app::run(catalog, initial)
}

#[cfg(not(feature = "egui"))]
fn run_viewer(_catalog: Catalog, _initial: Option<String>) -> Result<()> {
    bail!("Built without the `egui` feature; use --list or --dump-parts")
}
