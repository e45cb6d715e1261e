use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use trgb::{GeoCoordinate, TerrainSample, TileStore};

/// Columns appended to every output row.
const OUTPUT_COLUMNS: [&str; 4] = ["elevation", "slope", "aspect", "roughness"];

/// Rows queried between progress updates.
const QUERY_CHUNK: usize = 1024;

pub fn run(
    data_dir: Option<PathBuf>,
    tile_ext: &str,
    input: PathBuf,
    output: Option<PathBuf>,
    zoom: i32,
    lon_col: String,
    lat_col: String,
) -> Result<()> {
    let store = super::open_store(data_dir, tile_ext)?;

    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "csv" {
        bail!("Unsupported file format: {}. Use .csv", extension);
    }

    let output_path = process_csv(&store, &input, output, zoom, &lon_col, &lat_col)?;
    println!("Output written to: {}", output_path.display());
    Ok(())
}

fn process_csv(
    store: &TileStore,
    input: &Path,
    output: Option<PathBuf>,
    zoom: i32,
    lon_col: &str,
    lat_col: &str,
) -> Result<PathBuf> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;

    let coords = records
        .iter()
        .map(|record| -> Result<GeoCoordinate> {
            let lon: f64 = record
                .get(lon_idx)
                .context("Missing longitude")?
                .trim()
                .parse()
                .context("Invalid longitude")?;
            let lat: f64 = record
                .get(lat_idx)
                .context("Missing latitude")?
                .trim()
                .parse()
                .context("Invalid latitude")?;
            Ok(GeoCoordinate::new(lon, lat))
        })
        .collect::<Result<Vec<_>>>()?;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    // Grouped by tile inside the store, so each tile is read once per chunk
    let mut samples = Vec::with_capacity(coords.len());
    for chunk in coords.chunks(QUERY_CHUNK) {
        samples.extend(store.query_batch(chunk, zoom));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("done");

    tracing::info!(
        points = coords.len(),
        found = samples.iter().filter(|s| s.is_some()).count(),
        zoom,
        "Batch queried"
    );

    let output_path = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        input.with_file_name(format!("{}_terrain.csv", stem))
    });
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.extend(OUTPUT_COLUMNS);
    writer.write_record(&new_headers)?;

    for (record, sample) in records.iter().zip(&samples) {
        let values = format_sample(sample.as_ref());

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.extend(values.iter().map(String::as_str));
        writer.write_record(&new_record)?;
    }

    writer.flush()?;

    Ok(output_path)
}

/// Render a sample as output column values; missing samples become "void".
fn format_sample(sample: Option<&TerrainSample>) -> [String; 4] {
    match sample {
        Some(s) => [
            format!("{:.1}", s.elevation),
            format!("{:.2}", s.slope),
            s.aspect.label().to_string(),
            format!("{:.2}", s.roughness),
        ],
        None => std::array::from_fn(|_| "void".to_string()),
    }
}
