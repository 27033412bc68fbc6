//! Benchmarks for fermion-to-qubit mapping and tapering.

use arvak_chem::excitation::PoolBuilder;
use arvak_chem::fermion::FermionicOperator;
use arvak_chem::mapping::MappingScheme;
use arvak_chem::reference::HartreeFock;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::{Array2, Array4};

/// Dense synthetic integrals with the 8-fold permutational symmetry.
fn synthetic_hamiltonian(n: usize) -> FermionicOperator {
    let mut h1 = Array2::<f64>::zeros((n, n));
    let mut h2 = Array4::<f64>::zeros((n, n, n, n));
    for p in 0..n {
        for q in 0..n {
            h1[[p, q]] = 1.0 / (1.0 + (p + q) as f64);
            for r in 0..n {
                for s in 0..n {
                    h2[[p, q, r, s]] = 0.1 / (1.0 + (p * q + r * s) as f64);
                }
            }
        }
    }
    let ints = arvak_chem::ElectronicIntegrals::new(h1, h2, n / 2, n / 2).unwrap();
    FermionicOperator::from_integrals(&ints).unwrap()
}

fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_hamiltonian");
    for n in [2usize, 4] {
        let op = synthetic_hamiltonian(n);
        for scheme in [
            MappingScheme::JordanWigner,
            MappingScheme::Parity,
            MappingScheme::BravyiKitaev,
        ] {
            let mapper = scheme.mapper();
            group.bench_with_input(BenchmarkId::new(scheme.as_str(), 2 * n), &op, |b, op| {
                b.iter(|| mapper.map(black_box(op)).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_pool(c: &mut Criterion) {
    let hf = HartreeFock::new(4, 2, 2).unwrap();
    let mapper = MappingScheme::JordanWigner.mapper();
    c.bench_function("pool_4orb_jw", |b| {
        b.iter(|| PoolBuilder::new(black_box(&hf), mapper.as_ref()).build(8).unwrap());
    });
}

criterion_group!(benches, bench_mapping, bench_pool);
criterion_main!(benches);
