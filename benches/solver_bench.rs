//! Criterion benchmarks for the job-shop solver.
//!
//! Uses seeded generated instances so runs are comparable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_jobshop::cp::{JobShopSolver, SolverConfig};
use u_jobshop::dispatching::RuleKind;
use u_jobshop::generator::{GeneratorConfig, InstanceGenerator};
use u_jobshop::models::JobShopInstance;
use u_jobshop::scheduler::SimpleScheduler;

fn instance(config: GeneratorConfig, seed: u64) -> JobShopInstance {
    InstanceGenerator::new(config, seed)
        .generate()
        .expect("generator config is valid")
}

fn bench_exact_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_search");
    group.sample_size(10);

    for (name, config) in [
        ("3x3", GeneratorConfig::tiny()),
        ("4x3", GeneratorConfig::default()),
        ("5x4", GeneratorConfig::small()),
    ] {
        let inst = instance(config, 1);
        for warm_start in [false, true] {
            let solver =
                JobShopSolver::with_config(SolverConfig::default().with_warm_start(warm_start));
            group.bench_with_input(
                BenchmarkId::new(format!("warm_start_{warm_start}"), name),
                &inst,
                |b, inst| b.iter(|| solver.solve(black_box(inst))),
            );
        }
    }
    group.finish();
}

fn bench_dispatching(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatching");
    let inst = instance(GeneratorConfig::medium(), 3);

    for kind in RuleKind::ALL {
        let scheduler = SimpleScheduler::new().with_rule(kind);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{kind:?}")), &inst, |b, inst| {
            b.iter(|| scheduler.schedule(black_box(inst)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_exact_search, bench_dispatching);
criterion_main!(benches);
