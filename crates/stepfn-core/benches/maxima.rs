use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use stepfn_core::FunctionMaxima;

/// Deterministic op stream (stable across runs).
#[inline]
fn det_ops(n: usize, seed: u64) -> Vec<(i64, i64)> {
    let mut a = 1_664_525u64.wrapping_mul(seed).wrapping_add(1_013_904_223);
    (0..n)
        .map(|_| {
            a = a.wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let arg = (a >> 33) as i64 % (n as i64);
            let value = ((a >> 17) & 0xffff) as i64 - 0x8000;
            (arg, value)
        })
        .collect()
}

fn bench_maxima(c: &mut Criterion) {
    let mut group = c.benchmark_group("function_maxima");
    for &n in &[1_000usize, 10_000usize] {
        group.throughput(Throughput::Elements(n as u64));

        let ops = det_ops(n, 2024);

        // Build from scratch: inserts plus the occasional same-arg update.
        group.bench_function(BenchmarkId::new("set_value_build", n), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut f = FunctionMaxima::new();
                    for (arg, value) in ops {
                        f.set_value(arg, value);
                    }
                    black_box(f);
                },
                BatchSize::LargeInput,
            )
        });

        // Churn on a pre-built function: updates interleaved with erases.
        let built: FunctionMaxima<i64, i64> = ops.iter().copied().collect();
        group.bench_function(BenchmarkId::new("set_erase_churn", n), |b| {
            b.iter_batched(
                || built.clone(),
                |mut f| {
                    for &(arg, value) in ops.iter().take(n / 2) {
                        f.set_value(arg, value.wrapping_neg());
                        f.erase(&(arg + 1));
                    }
                    black_box(f);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_maxima);
criterion_main!(benches);
