// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bbq_lookup::{Aabb3D, AnyLookup, Line, Lookup, LookupKind, LookupOptions, Vec3, create};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
    fn next_vec3(&mut self, scale: f64) -> Vec3 {
        Vec3::new(self.next_f64(), self.next_f64(), self.next_f64()) * scale
    }
}

/// Unit-ish cubes laid out on an `n³` lattice.
fn gen_lattice_boxes(n: usize, cell: f64) -> Vec<Aabb3D> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let min = Vec3::new(x as f64, y as f64, z as f64) * cell;
                out.push(Aabb3D::new(min, min + Vec3::splat(cell * 0.8)));
            }
        }
    }
    out
}

/// Randomly placed boxes of random size in `[0, world)³`.
fn gen_random_boxes(count: usize, world: f64, max_side: f64) -> Vec<Aabb3D> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let min = rng.next_vec3(world - max_side);
            Aabb3D::new(min, min + rng.next_vec3(max_side))
        })
        .collect()
}

/// Small boxes packed around a handful of centers.
fn gen_clustered_boxes(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb3D> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let centers: Vec<_> = (0..n_clusters).map(|_| rng.next_vec3(2000.0)).collect();
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for c in centers {
        for _ in 0..per_cluster {
            let min = c + (rng.next_vec3(1.0) - Vec3::splat(0.5)) * spread;
            out.push(Aabb3D::new(min, min + Vec3::splat(12.0)));
        }
    }
    out
}

fn build(kind: LookupKind, boxes: &[Aabb3D]) -> AnyLookup<u32> {
    let mut lookup = create(kind, &LookupOptions::default()).unwrap();
    for (i, b) in boxes.iter().enumerate() {
        lookup.insert(i as u32, *b).unwrap();
    }
    lookup
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[8usize, 16] {
        let boxes = gen_lattice_boxes(n, 10.0);
        group.throughput(Throughput::Elements(boxes.len() as u64));
        for kind in LookupKind::ALL {
            group.bench_function(format!("{kind}_lattice_n{n}"), |b| {
                b.iter_batched(
                    || create::<u32>(kind, &LookupOptions::default()).unwrap(),
                    |mut lookup| {
                        for (i, aabb) in boxes.iter().enumerate() {
                            lookup.insert(i as u32, *aabb).unwrap();
                        }
                        black_box(lookup.len());
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let datasets = [
        ("random", gen_random_boxes(4_000, 1000.0, 40.0)),
        ("clustered", gen_clustered_boxes(16, 250, 120.0)),
    ];
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let windows: Vec<_> = (0..64)
        .map(|_| {
            let min = rng.next_vec3(900.0);
            Aabb3D::new(min, min + Vec3::splat(100.0))
        })
        .collect();
    let points: Vec<_> = (0..64).map(|_| rng.next_vec3(1000.0)).collect();
    let rays: Vec<_> = (0..64)
        .map(|_| Line::new(rng.next_vec3(1000.0), rng.next_vec3(1000.0)))
        .collect();

    for (name, boxes) in &datasets {
        for kind in LookupKind::ALL {
            let lookup = build(kind, boxes);
            group.bench_function(format!("{kind}_{name}_box"), |b| {
                b.iter(|| {
                    let hits: usize = windows.iter().map(|w| lookup.visit((*w).into()).count()).sum();
                    black_box(hits)
                });
            });
            group.bench_function(format!("{kind}_{name}_point"), |b| {
                b.iter(|| {
                    let hits: usize = points.iter().map(|p| lookup.visit((*p).into()).count()).sum();
                    black_box(hits)
                });
            });
            group.bench_function(format!("{kind}_{name}_line"), |b| {
                b.iter(|| {
                    let hits: usize = rays.iter().map(|r| lookup.visit((*r).into()).count()).sum();
                    black_box(hits)
                });
            });
            group.bench_function(format!("{kind}_{name}_first_hit"), |b| {
                b.iter(|| {
                    let mut found = 0;
                    for w in &windows {
                        lookup.visit_with_early_stop((*w).into(), |_, _, stop| {
                            found += 1;
                            stop.stop();
                        });
                    }
                    black_box(found)
                });
            });
        }
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    let boxes = gen_random_boxes(2_000, 1000.0, 40.0);
    group.throughput(Throughput::Elements(boxes.len() as u64));
    for kind in LookupKind::ALL {
        group.bench_function(format!("{kind}_remove_all"), |b| {
            b.iter_batched(
                || build(kind, &boxes),
                |mut lookup| {
                    for (i, aabb) in boxes.iter().enumerate() {
                        black_box(lookup.remove(&(i as u32), aabb));
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_remove);
criterion_main!(benches);
