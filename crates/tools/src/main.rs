use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use formats::FeatureCollection;
use tools::{FileFetcher, SvgDocument};
use widget::MapContext;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render and inspect municipal choropleth maps")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a static SVG snapshot of a GeoJSON dataset
    Render {
        /// GeoJSON FeatureCollection
        input: PathBuf,

        /// Output SVG path
        output: PathBuf,

        #[arg(long, default_value_t = 960.0)]
        width: f64,

        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Draw region name labels
        #[arg(long)]
        labels: bool,

        /// Zoom scale applied about the viewport center
        #[arg(long)]
        scale: Option<f64>,

        /// Select the first region whose name contains this text
        #[arg(long)]
        select: Option<String>,

        /// JSON config patch merged over the defaults
        #[arg(long)]
        config: Option<String>,
    },

    /// List region names and ids
    Inspect {
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Render {
            input,
            output,
            width,
            height,
            labels,
            scale,
            select,
            config,
        } => cmd_render(RenderArgs {
            input,
            output,
            width,
            height,
            labels,
            scale,
            select,
            config,
        }),
        Command::Inspect { input, json } => cmd_inspect(input, json),
    }
}

struct RenderArgs {
    input: PathBuf,
    output: PathBuf,
    width: f64,
    height: f64,
    labels: bool,
    scale: Option<f64>,
    select: Option<String>,
    config: Option<String>,
}

fn cmd_render(args: RenderArgs) -> Result<(), String> {
    let mut ctx = MapContext::new(SvgDocument::default(), args.width, args.height);

    if let Some(patch) = &args.config {
        let patch: serde_json::Value =
            serde_json::from_str(patch).map_err(|e| format!("--config: {e}"))?;
        ctx.update_config(&patch)
            .map_err(|e| format!("--config: {e}"))?;
    }
    if args.labels {
        ctx.set_labels(serde_json::json!({ "enabled": true }))
            .map_err(|e| format!("labels: {e}"))?;
    }

    let uri = args.input.to_string_lossy().into_owned();
    let count = pollster::block_on(ctx.load(&FileFetcher, &uri))
        .map(|regions| regions.len())
        .map_err(|e| e.to_string())?;

    if let Some(needle) = &args.select {
        match ctx.select_by_name(needle).and_then(|f| f.name()) {
            Some(name) => info!(name, "selected region"),
            None => warn!(needle = needle.as_str(), "no region selected"),
        }
    }
    if let Some(k) = args.scale {
        let applied = ctx.scale_to(k).k;
        if applied != k {
            warn!(requested = k, applied, "scale clamped to zoom bounds");
        }
    }

    let svg = ctx.into_surface().render();
    fs::write(&args.output, svg).map_err(|e| format!("write {:?}: {e}", args.output))?;
    eprintln!("wrote {} ({count} regions)", args.output.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct RegionRow {
    index: usize,
    name: Option<String>,
    id: Option<String>,
}

fn cmd_inspect(input: PathBuf, json: bool) -> Result<(), String> {
    let payload = fs::read_to_string(&input).map_err(|e| format!("read {input:?}: {e}"))?;
    let collection = FeatureCollection::from_geojson_str(&payload)
        .map_err(|e| format!("parse geojson: {e}"))?;

    let rows: Vec<RegionRow> = collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| RegionRow {
            index,
            name: feature.name().map(str::to_string),
            id: feature.display_id(),
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&rows).map_err(|e| format!("json: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    for row in &rows {
        println!(
            "{:>4}  {:<12}  {}",
            row.index,
            row.id.as_deref().unwrap_or("-"),
            row.name.as_deref().unwrap_or("-")
        );
    }
    eprintln!("{} regions", rows.len());
    Ok(())
}
