use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use trgb::{RasterTile, TerrainSample};

pub struct QueryArgs {
    pub lon: f64,
    pub lat: f64,
    pub zoom: i32,
    pub tile: Option<PathBuf>,
    pub json: bool,
    pub zh: bool,
}

#[derive(Serialize)]
struct TerrainResponse {
    lon: f64,
    lat: f64,
    elevation: f64,
    slope: f64,
    aspect: &'static str,
    aspect_degrees: f64,
    roughness: f64,
    tile: String,
    pixel: [i64; 2],
}

impl TerrainResponse {
    fn new(sample: &TerrainSample, zh: bool) -> Self {
        Self {
            lon: sample.lon,
            lat: sample.lat,
            elevation: sample.elevation,
            slope: sample.slope,
            aspect: if zh {
                sample.aspect.label_zh()
            } else {
                sample.aspect.label()
            },
            aspect_degrees: sample.aspect_degrees,
            roughness: sample.roughness,
            tile: sample.tile.to_string(),
            pixel: [sample.pixel.x, sample.pixel.y],
        }
    }
}

pub fn run(data_dir: Option<PathBuf>, tile_ext: &str, args: QueryArgs) -> Result<()> {
    let sample = match &args.tile {
        Some(path) => {
            let tile = RasterTile::from_file(path)
                .with_context(|| format!("Failed to load tile {}", path.display()))?;
            trgb::query(args.lon, args.lat, args.zoom, &tile)
                .context("Failed to query terrain")?
        }
        None => {
            let store = super::open_store(data_dir, tile_ext)?;
            store
                .query(args.lon, args.lat, args.zoom)
                .context("Failed to query terrain")?
        }
    };

    let response = TerrainResponse::new(&sample, args.zh);

    if args.json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("Elevation: {:.1} m", response.elevation);
        println!("Slope: {:.1}°", response.slope);
        println!(
            "Aspect: {} ({:.1}°)",
            response.aspect, response.aspect_degrees
        );
        println!("Roughness: {:.2} m", response.roughness);
        println!(
            "Tile: {} pixel ({}, {})",
            response.tile, response.pixel[0], response.pixel[1]
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trgb::tile::encode_elevation;

    #[test]
    fn test_response_serialize() {
        let tile = RasterTile::filled(encode_elevation(321.0));
        let sample = trgb::query(10.0, 20.0, 0, &tile).unwrap();

        let json = serde_json::to_string(&TerrainResponse::new(&sample, false)).unwrap();
        assert!(json.contains("\"lon\":10.0"));
        assert!(json.contains("\"tile\":\"0/0/0\""));
        assert!(json.contains("\"aspect\":\"S\""));

        let json = serde_json::to_string(&TerrainResponse::new(&sample, true)).unwrap();
        assert!(json.contains("南"));
    }
}
