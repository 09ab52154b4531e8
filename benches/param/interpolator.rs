//! Benchmarks for per-sample parameter interpolation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wam_rt::param::ParameterInterpolator;
use wam_rt::{CurveType, ExponentialFallback, ParamChange, ParamIndex, ParameterInfo};

use crate::BLOCK_SIZES;

pub fn bench_interpolator(c: &mut Criterion) {
    let mut group = c.benchmark_group("param/interpolator");
    let index = ParamIndex::new(0);
    let info = ParameterInfo::new("cutoff", 20.0, 20_000.0, 1_000.0);

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];

        // === IDLE ===
        // Baseline: nothing scheduled, value is held
        let mut idle = ParameterInterpolator::new(index, &info, ExponentialFallback::Linear, 16);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.process(black_box(&mut out)))
        });

        // === RAMPS ===
        // A fresh ramp every quantum, so the interpolator never goes idle
        for (name, curve) in [
            ("linear", CurveType::Linear),
            ("exponential", CurveType::Exponential),
        ] {
            let mut interp =
                ParameterInterpolator::new(index, &info, ExponentialFallback::Linear, 16);
            let mut high = false;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    high = !high;
                    let target = if high { 8_000.0 } else { 200.0 };
                    interp.schedule(0, ParamChange::new(index, target, size as u32 * 4, curve));
                    interp.process(black_box(&mut out));
                })
            });
        }

        // === DENSE AUTOMATION ===
        // Eight overriding changes inside one quantum
        let mut dense = ParameterInterpolator::new(index, &info, ExponentialFallback::Linear, 16);
        group.bench_with_input(BenchmarkId::new("dense", size), &size, |b, _| {
            b.iter(|| {
                for k in 0..8 {
                    let change =
                        ParamChange::new(index, 100.0 * (k + 1) as f32, 32, CurveType::Linear);
                    dense.schedule(k * size / 8, change);
                }
                dense.process(black_box(&mut out));
            })
        });
    }

    group.finish();
}
