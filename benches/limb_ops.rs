use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mpkernel::int::{mul_karatsuba, mul_schoolbook};
use mpkernel::limb::{CarryChain, Limb, Native, Portable};
use rand::prelude::*;

fn random_limbs(rng: &mut StdRng, n: usize) -> Vec<Limb> {
    (0..n).map(|_| rng.random()).collect()
}

fn bench_chain<C: CarryChain>(c: &mut Criterion, group_name: &str) {
    let mut group = c.benchmark_group(group_name);
    let mut rng = StdRng::seed_from_u64(1);

    for n in [4, 64, 1024] {
        let a = random_limbs(&mut rng, n);
        let b = random_limbs(&mut rng, n);
        let mut out = vec![0; n];
        group.throughput(Throughput::Bytes((n * std::mem::size_of::<Limb>()) as u64));

        group.bench_function(BenchmarkId::new(C::NAME, format!("add_n/{n}")), |bench| {
            bench.iter(|| C::add_n(&mut out, black_box(&a), black_box(&b), false))
        });
        group.bench_function(BenchmarkId::new(C::NAME, format!("sub_n/{n}")), |bench| {
            bench.iter(|| C::sub_n(&mut out, black_box(&a), black_box(&b), false))
        });
    }

    group.finish();
}

fn bench_carry_chains(c: &mut Criterion) {
    bench_chain::<Portable>(c, "carry_portable");
    bench_chain::<Native>(c, "carry_native");
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply");
    let mut rng = StdRng::seed_from_u64(2);

    for n in [16, 64, 256] {
        let a = random_limbs(&mut rng, n);
        let b = random_limbs(&mut rng, n);
        let parameter = format!("limbs={n}");

        group.bench_function(BenchmarkId::new("schoolbook", &parameter), |bench| {
            bench.iter(|| mul_schoolbook(black_box(&a), black_box(&b)))
        });
        group.bench_function(BenchmarkId::new("karatsuba", &parameter), |bench| {
            bench.iter(|| mul_karatsuba(black_box(&a), black_box(&b)))
        });
    }

    group.finish();
}

criterion_group! {
    name = default;
    config = Criterion::default().sample_size(20);
    targets = bench_carry_chains, bench_multiply
}
criterion_main!(default);
