//! `terrain-stl`: convert an elevation CSV grid into a printable binary STL.
//!
//! ```text
//! terrain-stl N54W004.csv
//! terrain-stl N54W004.csv -o lakes.stl --print-width 150 --print-height 8
//! terrain-stl N54W004.csv --config print.json --validate --log-level debug
//! ```

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mesh_terrain::{
    PartialParams, TerrainParams, convert_file, convert_file_validated, default_output_path,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Convert an elevation grid into a watertight binary STL solid
#[derive(Parser)]
#[command(name = "terrain-stl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert an elevation CSV grid into a printable binary STL", long_about = None)]
struct Cli {
    /// Input CSV grid: header row `width,height,max_height`, then `east,north,elevation` rows
    input: PathBuf,

    /// Output STL path [default: input with .stl extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with print parameters; must set all four dimensions
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Height of the terrain relief in mm [default: 5]
    #[arg(long, value_name = "MM")]
    print_height: Option<f64>,

    /// Length of the longer horizontal side in mm [default: 130]
    #[arg(long, value_name = "MM")]
    print_width: Option<f64>,

    /// Extra height given to every valid sample in mm [default: 0.5]
    #[arg(long, value_name = "MM")]
    base_offset: Option<f64>,

    /// Solid base under the terrain in mm [default: 1]
    #[arg(long, value_name = "MM")]
    base_thickness: Option<f64>,

    /// STL header text (80 bytes max)
    #[arg(long)]
    header: Option<String>,

    /// Check the solid is watertight and outward-facing before writing
    #[arg(long)]
    validate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn flag_params(&self) -> PartialParams {
        PartialParams {
            print_height: self.print_height,
            print_width: self.print_width,
            base_offset: self.base_offset,
            base_thickness: self.base_thickness,
            header: self.header.clone(),
        }
    }

    fn params(&self) -> Result<TerrainParams> {
        let file = self.config.as_deref().map(config::load_config).transpose()?;
        config::resolve_params(file, self.flag_params())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = cli.params()?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let context = || {
        format!(
            "Failed to convert {} to {}",
            cli.input.display(),
            output.display()
        )
    };
    let report = if cli.validate {
        let (report, solid) =
            convert_file_validated(&cli.input, &output, &params).with_context(context)?;
        print!("{solid}");
        report
    } else {
        convert_file(&cli.input, &output, &params).with_context(context)?
    };
    println!("{report}");

    Ok(())
}
