use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use trgb::{RasterTile, TileAddress};

pub fn run(data_dir: Option<PathBuf>, tile_ext: &str, tile: String) -> Result<()> {
    // A path to an existing file wins over a "z/x/y" address
    let direct = PathBuf::from(&tile);
    let (address, tile_path) = if direct.is_file() {
        (TileAddress::parse(&tile), direct)
    } else {
        let address: TileAddress = tile.parse().context("Expected a tile file or z/x/y")?;
        let store = super::open_store(data_dir, tile_ext)?;
        (Some(address), store.tile_path(&address))
    };

    if !tile_path.exists() {
        bail!("Tile not found: {}", tile_path.display());
    }

    let raster = RasterTile::from_file(&tile_path).context("Failed to load tile")?;
    let file_size = std::fs::metadata(&tile_path)?.len();
    let (min_elev, max_elev) = raster.elevation_range();

    match address {
        Some(address) => println!("Tile: {}", address),
        None => println!("Tile: (unknown address)"),
    }
    println!("Path: {}", tile_path.display());
    println!();
    println!("Size: 256x256 pixels");
    println!("File size: {}", super::format_size(file_size));

    if let Some(address) = address {
        let center = address.center();
        println!("Center: {:.6}, {:.6} (lon, lat)", center.lon, center.lat);
        if !address.is_valid() {
            println!("Warning: x/y outside the 0..{} range", 1u64 << address.zoom.min(63));
        }
    }
    println!();

    println!("Min elevation: {:.1}m", min_elev);
    println!("Max elevation: {:.1}m", max_elev);

    Ok(())
}
