//! Benchmarks for complete render quanta.
//!
//! A typical synth has a few dozen parameters, most of them idle, with a
//! handful under automation at any time.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wam_rt::{CurveType, EngineBuilder, EngineConfig, ParameterInfo};

use crate::BLOCK_SIZES;

const PARAMETERS: usize = 32;

pub fn bench_quantum(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/quantum");

    for &size in BLOCK_SIZES {
        let build = || {
            EngineBuilder::new()
                .config(EngineConfig::default().with_max_block_size(size))
                .parameters(
                    (0..PARAMETERS).map(|i| ParameterInfo::new(format!("p{i}"), 0.0, 1.0, 0.5)),
                )
                .build()
                .unwrap()
        };

        // === IDLE ===
        // No automation: cost of draining an empty ring and holding values
        let (_controller, mut processor) = build();
        let mut time = 0u64;
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                processor.on_render_quantum(black_box(size), time);
                time += size as u64;
            })
        });

        // === AUTOMATED ===
        // Four parameters get a new ramp every quantum
        let (mut controller, mut processor) = build();
        let mut time = 0u64;
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, _| {
            b.iter(|| {
                for p in 0..4 {
                    let _ = controller.schedule_parameter_change_with_curve(
                        &format!("p{p}"),
                        (time % 3) as f32 / 2.0,
                        size as u32 * 2,
                        time as u32 + p as u32,
                        CurveType::Linear,
                    );
                }
                processor.on_render_quantum(black_box(size), time);
                time += size as u64;
            })
        });
    }

    group.finish();
}
