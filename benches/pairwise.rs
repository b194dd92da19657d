use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hswca::{
    Hessian, HsWca, HsWca3d, HsWcaNeighborList, HsWcaPeriodic3d, PairInteraction, PairList,
    Potential,
};

/// Single-pair benchmarks of the interaction law
fn bench_interaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("interaction");

    let hs_wca = HsWca::new(1.0, 0.2, &[0.5, 0.5]);
    let r_squared = 1.1f64.powi(2);

    group.bench_function("energy", |b| {
        b.iter(|| hs_wca.energy(black_box(r_squared), 0, 1))
    });
    group.bench_function("energy_gradient", |b| {
        b.iter(|| hs_wca.energy_gradient(black_box(r_squared), 0, 1))
    });
    group.bench_function("energy_gradient_hessian", |b| {
        b.iter(|| hs_wca.energy_gradient_hessian(black_box(r_squared), 0, 1))
    });

    group.finish();
}

/// Simple cubic lattice with `per_side`³ particles of radius 0.5
fn cubic_lattice(per_side: usize, spacing: f64) -> Vec<f64> {
    let mut coords = Vec::with_capacity(3 * per_side.pow(3));
    for x in 0..per_side {
        for y in 0..per_side {
            for z in 0..per_side {
                coords.extend([x, y, z].map(|i| i as f64 * spacing));
            }
        }
    }
    coords
}

/// Nearest neighbour pairs of the lattice
fn lattice_pairs(coords: &[f64], cutoff: f64) -> PairList {
    let num_atoms = coords.len() / 3;
    let mut pairs = Vec::new();
    for i in 0..num_atoms {
        for j in (i + 1)..num_atoms {
            let r2: f64 = (0..3)
                .map(|k| (coords[3 * i + k] - coords[3 * j + k]).powi(2))
                .sum();
            if r2 < cutoff * cutoff {
                pairs.push((i, j));
            }
        }
    }
    PairList::new(pairs).unwrap()
}

/// Full configuration benchmarks comparing enumeration strategies and metrics
fn bench_potential(c: &mut Criterion) {
    let mut group = c.benchmark_group("potential");
    let spacing = 1.1;

    for per_side in [4, 8] {
        let coords = cubic_lattice(per_side, spacing);
        let num_atoms = coords.len() / 3;
        let radii = vec![0.5; num_atoms];
        let box_length = [per_side as f64 * spacing; 3];

        let dense = HsWca3d::hs_wca(1.0, 0.2, &radii).unwrap();
        let periodic = HsWcaPeriodic3d::hs_wca_periodic(1.0, 0.2, &radii, &box_length).unwrap();
        let neighbor_list = HsWcaNeighborList::hs_wca_neighbor_list(
            lattice_pairs(&coords, 1.2),
            1.0,
            0.2,
            &radii,
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("dense", num_atoms), &coords, |b, x| {
            b.iter(|| dense.energy(black_box(x)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("periodic", num_atoms), &coords, |b, x| {
            b.iter(|| periodic.energy(black_box(x)).unwrap())
        });
        group.bench_with_input(
            BenchmarkId::new("neighbor_list", num_atoms),
            &coords,
            |b, x| b.iter(|| neighbor_list.energy(black_box(x)).unwrap()),
        );

        let mut gradient = vec![0.0; coords.len()];
        group.bench_with_input(
            BenchmarkId::new("neighbor_list_gradient", num_atoms),
            &coords,
            |b, x| {
                b.iter(|| {
                    neighbor_list
                        .energy_gradient(black_box(x), &mut gradient)
                        .unwrap()
                })
            },
        );

        if per_side == 4 {
            let ndof = coords.len();
            let mut gradient = vec![0.0; ndof];
            let mut hessian = Hessian::zeros(ndof, ndof);
            group.bench_with_input(
                BenchmarkId::new("dense_hessian", num_atoms),
                &coords,
                |b, x| {
                    b.iter(|| {
                        dense
                            .energy_gradient_hessian(black_box(x), &mut gradient, &mut hessian)
                            .unwrap()
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_interaction, bench_potential);
criterion_main!(benches);
