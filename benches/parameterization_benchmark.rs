//! Retraction and Jacobian throughput for each local parameterization
//!
//! ## Usage
//!
//! ```bash
//! cargo bench --bench parameterization_benchmark
//! ```
//!
//! Every benchmark runs one call per variable block over a batch of random states,
//! which is the access pattern of a bundle-adjustment update step.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use local_parameterization::manifold::rotation::{random_euler_angles, random_unit_quaternion};
use local_parameterization::{
    LocalParameterization, OrthonormalLine, ParameterizationOptions, ParameterizationType,
    init_logger,
};
use std::hint::black_box;
use tracing::info;

const BATCH: usize = 1024;

fn random_state(kind: ParameterizationType) -> Vec<f64> {
    match kind {
        ParameterizationType::Quaternion => random_unit_quaternion().as_slice().to_vec(),
        ParameterizationType::Pose => {
            let mut x = vec![1.0, 2.0, 3.0];
            x.extend_from_slice(random_unit_quaternion().as_slice());
            x
        }
        ParameterizationType::EulerPose => {
            let mut x = vec![1.0, 2.0, 3.0];
            x.extend_from_slice(random_euler_angles(0.1).as_slice());
            x
        }
        ParameterizationType::OrthonormalLine => {
            OrthonormalLine::random().to_vector().as_slice().to_vec()
        }
    }
}

fn bench_parameterizations(c: &mut Criterion) {
    init_logger();

    let kinds = [
        ParameterizationType::Quaternion,
        ParameterizationType::Pose,
        ParameterizationType::EulerPose,
        ParameterizationType::OrthonormalLine,
    ];
    let presets = [
        ("legacy", ParameterizationOptions::default()),
        ("corrected", ParameterizationOptions::corrected()),
    ];

    let mut plus_group = c.benchmark_group("plus");
    for kind in kinds {
        let states: Vec<Vec<f64>> = (0..BATCH).map(|_| random_state(kind)).collect();
        let delta = vec![1e-3; kind.local_size()];
        info!("benchmarking {kind} plus over {BATCH} states");

        for (name, options) in presets {
            let param = kind.build(options);
            let mut out = vec![0.0; kind.ambient_size()];
            plus_group.bench_with_input(BenchmarkId::new(kind.to_string(), name), &states, |b, states| {
                b.iter(|| {
                    for x in states {
                        // Strict rejections are part of the measured cost.
                        let _ = param.plus(black_box(x), black_box(&delta), &mut out);
                    }
                    black_box(&out);
                })
            });
        }
    }
    plus_group.finish();

    let mut jacobian_group = c.benchmark_group("compute_jacobian");
    for kind in kinds {
        let states: Vec<Vec<f64>> = (0..BATCH).map(|_| random_state(kind)).collect();
        for (name, options) in presets {
            let param = kind.build(options);
            let mut jacobian = vec![0.0; kind.ambient_size() * kind.local_size()];
            jacobian_group.bench_with_input(
                BenchmarkId::new(kind.to_string(), name),
                &states,
                |b, states| {
                    b.iter(|| {
                        for x in states {
                            let _ = param.compute_jacobian(black_box(x), &mut jacobian);
                        }
                        black_box(&jacobian);
                    })
                },
            );
        }
    }
    jacobian_group.finish();
}

criterion_group!(benches, bench_parameterizations);
criterion_main!(benches);
