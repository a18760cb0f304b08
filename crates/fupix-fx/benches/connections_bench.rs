//! Benchmarks for the per-frame swarm and plexus passes.
//!
//! Run with: cargo bench -p fupix-fx --bench connections_bench

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fupix_core::geometry::{Rect, Size};
use fupix_core::theme::ThemePalette;
use fupix_fx::plexus::PlexusField;
use fupix_fx::shape::GlyphBlockHost;
use fupix_fx::swarm::{SwarmPhase, TransitionController, render_swarm};
use fupix_fx::{PlexusConfig, RecordingSurface, SwarmConfig};

const VIEWPORTS: [(f32, f32); 3] = [(640.0, 480.0), (1280.0, 720.0), (1920.0, 1080.0)];

fn bench_swarm_connections(c: &mut Criterion) {
    // RUST_LOG=debug surfaces controller transitions while benchmarking.
    fupix_core::logging::init_json_subscriber();
    let mut group = c.benchmark_group("swarm_connections");
    for (w, h) in VIEWPORTS {
        let view = Size::new(w, h);
        let host = GlyphBlockHost::new(Some(Rect::from_size(view)));
        let mut swarm = TransitionController::start(SwarmConfig::default(), host, view, Duration::ZERO)
            .expect("anchor present");
        swarm.tick(Duration::from_millis(3500));
        swarm.step(Duration::from_millis(3500));
        let particles = swarm.particles().to_vec();
        let mut surface = RecordingSurface::new(view);

        group.throughput(Throughput::Elements(particles.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &particles,
            |b, particles| {
                b.iter(|| {
                    let stats = render_swarm(
                        &mut surface,
                        black_box(particles),
                        SwarmPhase::Assembled,
                        ThemePalette::DARK.accent,
                        22.0,
                        20,
                    );
                    surface.take_ops();
                    black_box(stats)
                })
            },
        );
    }
    group.finish();
}

fn bench_plexus_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("plexus_frame");
    for (w, h) in VIEWPORTS {
        let view = Size::new(w, h);
        let mut field = PlexusField::new(PlexusConfig::default(), view);
        let mut surface = RecordingSurface::new(view);
        let mut t = Duration::ZERO;
        group.bench_function(BenchmarkId::from_parameter(format!("{w}x{h}")), |b| {
            b.iter(|| {
                t += Duration::from_millis(16);
                let stats = field.frame(t, &mut surface);
                surface.take_ops();
                black_box(stats)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_swarm_connections, bench_plexus_frame);
criterion_main!(benches);
