use anyhow::Result;
use std::fs;
use std::path::PathBuf;

pub fn run(data_dir: Option<PathBuf>, tile_ext: &str) -> Result<()> {
    let store = super::open_store(data_dir, tile_ext)?;

    if !store.data_dir().exists() {
        anyhow::bail!(
            "Data directory does not exist: {}",
            store.data_dir().display()
        );
    }

    let tiles = store.list_tiles();

    if tiles.is_empty() {
        println!(
            "No .{} tiles found in: {}",
            store.tile_ext(),
            store.data_dir().display()
        );
        return Ok(());
    }

    let mut total_size: u64 = 0;
    let mut zooms: Vec<u32> = Vec::new();

    println!("{:<20} {:>12} {:>24}", "TILE", "SIZE", "CENTER (LON, LAT)");
    println!("{}", "-".repeat(58));

    for address in &tiles {
        let size = fs::metadata(store.tile_path(address))
            .map(|m| m.len())
            .unwrap_or(0);
        total_size += size;

        if !zooms.contains(&address.zoom) {
            zooms.push(address.zoom);
        }

        let center = address.center();
        println!(
            "{:<20} {:>12} {:>24}",
            address.to_string(),
            super::format_size(size),
            format!("{:.4}, {:.4}", center.lon, center.lat)
        );
    }

    // Summary
    println!();
    println!("Summary:");
    println!("  Total tiles: {}", tiles.len());
    println!(
        "  Zoom levels: {}",
        zooms
            .iter()
            .map(|z| z.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Total size: {}", super::format_size(total_size));
    println!("  Data directory: {}", store.data_dir().display());

    Ok(())
}
