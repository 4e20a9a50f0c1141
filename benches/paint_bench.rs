use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use isoterrain::color::BiomeColorEngine;
use isoterrain::heights::HeightGrid;
use isoterrain::painter::{DepthBandPainter, MemoryBandSink};
use isoterrain::projection::{IsoProjection, ProjectionSettings};
use isoterrain::settings::RichShadingConfig;

fn hills(n: usize) -> HeightGrid {
    let mut g = HeightGrid::new(n, n);
    let mid = n as f32 * 0.5;
    for y in 0..n as i32 {
        for x in 0..n as i32 {
            let d = ((x as f32 - mid).powi(2) + (y as f32 - mid).powi(2)).sqrt();
            g.set(x, y, (10.0 - d * 1.5).round() as i32);
        }
    }
    g
}

fn bench_paint_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("paint_pass");
    group.sample_size(20);
    let cfg = RichShadingConfig { seed: Some(3), ..Default::default() };
    for n in [8usize, 24] {
        let g = hills(n);
        let proj = IsoProjection::for_board(n, ProjectionSettings::default());
        for key in ["forest", "volcanic"] {
            group.bench_with_input(BenchmarkId::new(key, n), &g, |b, g| {
                let mut colors = BiomeColorEngine::default();
                let mut painter = DepthBandPainter::default();
                let mut sink = MemoryBandSink::default();
                b.iter(|| painter.paint_pass(black_box(g), key, &mut colors, &cfg, &proj, &mut sink));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_paint_pass);
criterion_main!(benches);
