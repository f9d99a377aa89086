use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::{CanvasSize, Spherical, ViewRotation};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, repair and preview panorama scene documents")]
struct Args {
    /// Editor config JSON (hit radius, drag sensitivity, render style)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize assets, out-degrees and reachability as stored
    Inspect {
        document: PathBuf,
    },

    /// Sanitize and repair the navigation graph
    Repair {
        document: PathBuf,

        /// Output path (default: overwrite the input)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Map a spherical point onto the canvas and back
    Project {
        #[arg(long, allow_hyphen_values = true)]
        phi: f64,
        #[arg(long, allow_hyphen_values = true)]
        theta: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        tilt: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        roll: f64,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 400.0)]
        height: f64,
    },

    /// Print the draw commands for one asset at its stored view
    Render {
        document: PathBuf,
        #[arg(long)]
        asset: usize,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 400.0)]
        height: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let config = tools::load_config(args.config.as_deref())?;

    match args.command {
        Command::Inspect { document } => {
            let doc = tools::load_document(&document)?;
            print_json(&tools::inspect(&doc))
        }
        Command::Repair { document, out } => {
            let doc = tools::load_document(&document)?;
            let (repaired, summary) = tools::repair(&doc);
            let out = out.unwrap_or(document);
            repaired.save(&out).map_err(|e| format!("{out:?}: {e}"))?;
            info!(
                path = %out.display(),
                added = summary.added_outgoing.len() + summary.added_chained.len(),
                "wrote repaired document"
            );
            print_json(&summary)
        }
        Command::Project {
            phi,
            theta,
            pan,
            tilt,
            roll,
            width,
            height,
        } => print_json(&tools::project(
            Spherical::new(phi, theta),
            ViewRotation::new(tilt, pan, roll),
            CanvasSize::new(width, height),
        )),
        Command::Render {
            document,
            asset,
            width,
            height,
        } => {
            let doc = tools::load_document(&document)?;
            let frame = tools::render_frame(&doc, asset, CanvasSize::new(width, height), &config)?;
            print_json(&frame)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}
