pub mod batch;
pub mod info;
pub mod list;
pub mod query;

use anyhow::{Context, Result};
use std::path::PathBuf;
use trgb::{TileStore, TileStoreBuilder};

/// Build a tile store from `--data-dir`, falling back to `TRGB_DATA_DIR`.
pub fn open_store(data_dir: Option<PathBuf>, tile_ext: &str) -> Result<TileStore> {
    let builder = match data_dir {
        Some(dir) => TileStoreBuilder::new(dir),
        None => TileStoreBuilder::from_env().context(
            "TRGB_DATA_DIR environment variable not set. Use --data-dir or set TRGB_DATA_DIR",
        )?,
    };

    Ok(builder.tile_ext(tile_ext).build())
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
