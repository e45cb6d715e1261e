use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;
use trgb::{GeoCoordinate, RasterTile, TileAddress, TileStore};

/// Synthetic tile with a diagonal elevation gradient.
fn gradient_tile() -> RasterTile {
    RasterTile::from_fn(|x, y| ((x + y) % 4000) as f64 * 1.5)
}

/// Write a raw gradient tile at `address` under `dir`.
fn create_tile(dir: &std::path::Path, address: TileAddress) {
    let path = dir.join(address.path("bin"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, gradient_tile().as_bytes()).unwrap();
}

fn bench_single_query(c: &mut Criterion) {
    let tile = gradient_tile();

    c.bench_function("single_query_in_memory", |b| {
        b.iter(|| {
            black_box(
                trgb::query(black_box(120.1551), black_box(30.2741), 0, &tile).unwrap(),
            );
        });
    });
}

fn bench_batch_same_tile(c: &mut Criterion) {
    let tile = gradient_tile();

    // 1000 coords inside the single z=0 tile
    let coords: Vec<GeoCoordinate> = (0..1000)
        .map(|i| {
            let frac = i as f64 / 1000.0;
            GeoCoordinate::new(-170.0 + frac * 340.0, -80.0 + frac * 160.0)
        })
        .collect();

    c.bench_function("batch_1000_same_tile", |b| {
        b.iter(|| {
            black_box(trgb::query_batch(black_box(&coords), 0, &tile));
        });
    });
}

fn bench_store_multi_tile(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    create_tile(tmp.path(), TileAddress::new(1, 0, 0));
    create_tile(tmp.path(), TileAddress::new(1, 1, 0));
    create_tile(tmp.path(), TileAddress::new(1, 0, 1));
    let store = TileStore::builder(tmp.path()).tile_ext("bin").build();

    // 1000 coords spread across 3 tiles
    let coords: Vec<GeoCoordinate> = (0..1000)
        .map(|i| {
            let frac = (i / 3) as f64 / 334.0;
            match i % 3 {
                0 => GeoCoordinate::new(-170.0 + frac * 160.0, 45.0),
                1 => GeoCoordinate::new(10.0 + frac * 160.0, 45.0),
                _ => GeoCoordinate::new(-170.0 + frac * 160.0, -45.0),
            }
        })
        .collect();

    c.bench_function("store_batch_1000_multi_tile", |b| {
        b.iter(|| {
            black_box(store.query_batch(black_box(&coords), 1));
        });
    });
}

criterion_group!(
    benches,
    bench_single_query,
    bench_batch_same_tile,
    bench_store_multi_tile,
);
criterion_main!(benches);
