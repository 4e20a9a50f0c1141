use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use isoterrain::color::BiomeColorEngine;
use isoterrain::fields::{DerivedFields, compute_moisture_field};
use isoterrain::heights::HeightGrid;
use isoterrain::settings::RichShadingConfig;

fn rolling(rows: usize, cols: usize) -> HeightGrid {
    let mut g = HeightGrid::new(rows, cols);
    for y in 0..rows as i32 {
        for x in 0..cols as i32 {
            g.set(x, y, ((x * 7 + y * 3) % 21) - 10);
        }
    }
    g
}

fn bench_grid_colors(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_colors");
    let cfg = RichShadingConfig { seed: Some(1), ..Default::default() };
    for size in [16usize, 64] {
        let g = rolling(size, size);
        let fields = DerivedFields::compute(&g);
        for key in ["grassland", "mountain", "ocean"] {
            group.bench_with_input(BenchmarkId::new(key, size), &g, |b, g| {
                let mut engine = BiomeColorEngine::default();
                b.iter(|| engine.grid_colors(black_box(g), &fields, key, &cfg));
            });
        }
    }
    group.finish();
}

fn bench_moisture(c: &mut Criterion) {
    let g = rolling(128, 128);
    c.bench_function("moisture_128", |b| b.iter(|| compute_moisture_field(black_box(&g))));
}

criterion_group!(benches, bench_grid_colors, bench_moisture);
criterion_main!(benches);
