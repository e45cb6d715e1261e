use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Terrain-RGB elevation and surface metrics CLI tool
#[derive(Parser)]
#[command(name = "trgb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of the {z}/{x}/{y} tile directory
    #[arg(short, long, env = "TRGB_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Tile file extension inside the data directory
    #[arg(
        short = 'e',
        long,
        env = "TRGB_TILE_EXT",
        default_value = "png",
        global = true
    )]
    tile_ext: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation, slope, aspect and roughness for a single coordinate
    Query {
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Zoom level of the tile
        #[arg(short, long, allow_hyphen_values = true)]
        zoom: i32,

        /// Read this tile file instead of looking it up in the data directory
        #[arg(short, long)]
        tile: Option<PathBuf>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,

        /// Print the aspect with its Chinese label
        #[arg(long)]
        zh: bool,
    },

    /// Process terrain queries for multiple coordinates from a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_terrain.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Zoom level of the tiles
        #[arg(short, long)]
        zoom: i32,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,
    },

    /// Display information about a terrain-RGB tile
    Info {
        /// Path to a tile file, or a tile address (e.g., 12/3415/1686)
        tile: String,
    },

    /// List available tiles in the data directory
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            lon,
            lat,
            zoom,
            tile,
            json,
            zh,
        } => commands::query::run(
            cli.data_dir,
            &cli.tile_ext,
            commands::query::QueryArgs {
                lon,
                lat,
                zoom,
                tile,
                json,
                zh,
            },
        ),
        Commands::Batch {
            input,
            output,
            zoom,
            lon_col,
            lat_col,
        } => commands::batch::run(
            cli.data_dir,
            &cli.tile_ext,
            input,
            output,
            zoom,
            lon_col,
            lat_col,
        ),
        Commands::Info { tile } => commands::info::run(cli.data_dir, &cli.tile_ext, tile),
        Commands::List => commands::list::run(cli.data_dir, &cli.tile_ext),
    }
}
