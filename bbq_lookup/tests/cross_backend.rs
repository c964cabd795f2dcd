// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Every backend must hold the same multiset for the same operations.

#![allow(missing_docs)]

use bbq_lookup::{
    Aabb3D, AnyLookup, Line, Lookup, LookupKind, LookupOptions, QueryItem, Vec3, create,
};
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn all_backends<T>() -> Vec<AnyLookup<T>> {
    LookupKind::ALL
        .into_iter()
        .map(|k| create(k, &LookupOptions::default()).expect("default options are valid"))
        .collect()
}

type Key = (String, [u64; 6]);

fn key<T: ToString>(value: &T, b: &Aabb3D) -> Key {
    let bits = [b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z].map(f64::to_bits);
    (value.to_string(), bits)
}

fn multiset<L: Lookup<T>, T: ToString>(l: &L, q: QueryItem) -> Vec<Key> {
    let mut v: Vec<_> = l.visit(q).map(|e| key(&e.value, &e.aabb)).collect();
    v.sort_unstable();
    v
}

fn random_box(rng: &mut StdRng) -> Aabb3D {
    let min = Vec3::new(
        rng.gen_range(0.0..100.0),
        rng.gen_range(0.0..100.0),
        rng.gen_range(0.0..100.0),
    );
    let max = Vec3::new(
        rng.gen_range(min.x..100.0),
        rng.gen_range(min.y..100.0),
        rng.gen_range(min.z..100.0),
    );
    Aabb3D::new(min, max)
}

#[test]
fn ten_thousand_random_boxes_agree() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(42);
    let mut lookups = all_backends::<String>();

    for i in 1..=10_000 {
        let value = format!("{:016x}{:016x}", rng.r#gen::<u64>(), rng.r#gen::<u64>());
        let b = random_box(&mut rng);
        for l in &mut lookups {
            l.insert(value.clone(), b).unwrap();
            assert_eq!(l.len(), i, "{} size after insert {i}", l.kind());
        }
    }

    let expected = multiset(&lookups[0], QueryItem::All);
    assert_eq!(expected.len(), 10_000);
    for l in &lookups[1..] {
        assert_eq!(multiset(l, QueryItem::All), expected, "{}", l.kind());
    }

    let probes: Vec<QueryItem> = (0..50)
        .flat_map(|_| {
            let b = random_box(&mut rng);
            [
                b.into(),
                b.center().into(),
                Line::new(b.min, b.max + Vec3::splat(10.0)).into(),
            ]
        })
        .collect();
    for q in probes {
        let expected = multiset(&lookups[0], q);
        for l in &lookups[1..] {
            assert_eq!(multiset(l, q), expected, "{} {q:?}", l.kind());
        }
    }
}

#[test]
fn duplicate_occurrences_agree() {
    init_tracing();
    let b = Aabb3D::new(Vec3::ZERO, Vec3::splat(1.0));
    for mut l in all_backends::<&str>() {
        l.insert("v", b).unwrap();
        l.insert("v", b).unwrap();
        assert_eq!(l.len(), 2);
        assert!(l.remove(&"v", &b));
        assert_eq!(l.len(), 1, "{}", l.kind());
        assert_eq!(multiset(&l, b.into()), [key(&"v", &b)], "{}", l.kind());
        assert!(l.remove(&"v", &b));
        assert!(!l.remove(&"v", &b));
        assert!(l.is_empty());
    }
}

#[test]
fn disjoint_query_is_empty() {
    let mut rng = StdRng::seed_from_u64(7);
    for mut l in all_backends::<u32>() {
        for v in 0..200 {
            l.insert(v, random_box(&mut rng)).unwrap();
        }
        let far = Aabb3D::new(Vec3::splat(200.0), Vec3::splat(300.0));
        assert_eq!(l.visit(far.into()).count(), 0, "{}", l.kind());
        assert_eq!(l.visit(Vec3::splat(-1.0).into()).count(), 0);
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, usize),
    Remove(u8, usize),
    RemoveValue(u8),
}

// A small palette makes duplicate keys and shared boxes common.
fn palette() -> Vec<Aabb3D> {
    vec![
        Aabb3D::new(Vec3::ZERO, Vec3::splat(1.0)),
        Aabb3D::new(Vec3::splat(0.5), Vec3::splat(2.0)),
        Aabb3D::new(Vec3::new(-4.0, 0.0, 0.0), Vec3::new(-3.0, 9.0, 1.0)),
        Aabb3D::from_point(Vec3::new(7.0, 7.0, 7.0)),
        Aabb3D::new(Vec3::new(10.0, -2.0, 3.0), Vec3::new(30.0, 2.0, 3.0)),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let n = palette().len();
    prop_oneof![
        4 => (0_u8..4, 0..n).prop_map(|(v, b)| Op::Insert(v, b)),
        2 => (0_u8..4, 0..n).prop_map(|(v, b)| Op::Remove(v, b)),
        1 => (0_u8..4).prop_map(Op::RemoveValue),
    ]
}

#[test]
fn random_operation_sequences_match_a_model() {
    init_tracing();
    const SEED_BYTES: [u8; 32] = [
        0x42, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::default(), rng);
    let boxes = palette();

    runner
        .run(&prop::collection::vec(op_strategy(), 0..60), |ops| {
            let mut lookups = all_backends::<u8>();
            let mut model: Vec<(u8, usize)> = Vec::new();
            for op in &ops {
                match *op {
                    Op::Insert(v, b) => {
                        model.push((v, b));
                        for l in &mut lookups {
                            l.insert(v, boxes[b]).unwrap();
                            // Self-query always finds what was just inserted.
                            prop_assert!(l.visit(boxes[b].into()).any(|e| e.value == v));
                        }
                    }
                    Op::Remove(v, b) => {
                        let present = model.iter().position(|&o| o == (v, b));
                        if let Some(i) = present {
                            model.remove(i);
                        }
                        for l in &mut lookups {
                            let before = multiset(&*l, QueryItem::All);
                            prop_assert_eq!(l.remove(&v, &boxes[b]), present.is_some());
                            if present.is_none() {
                                prop_assert_eq!(multiset(&*l, QueryItem::All), before);
                            }
                        }
                    }
                    Op::RemoveValue(v) => {
                        let count = model.iter().filter(|o| o.0 == v).count();
                        model.retain(|o| o.0 != v);
                        for l in &mut lookups {
                            prop_assert_eq!(l.remove_value(&v), count);
                        }
                    }
                }
                let mut expected: Vec<_> = model.iter().map(|&(v, b)| key(&v, &boxes[b])).collect();
                expected.sort_unstable();
                for l in &lookups {
                    prop_assert_eq!(l.len(), model.len());
                    prop_assert_eq!(multiset(l, QueryItem::All), expected.clone());
                }
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    #[test]
    fn queries_agree_on_arbitrary_boxes(
        raw in prop::collection::vec(
            (prop::array::uniform3(-50.0_f64..50.0), prop::array::uniform3(0.0_f64..20.0)),
            1..40,
        ),
        probe in (prop::array::uniform3(-60.0_f64..60.0), prop::array::uniform3(0.0_f64..30.0)),
    ) {
        let to_box = |(lo, ext): ([f64; 3], [f64; 3])| {
            let min = Vec3::new(lo[0], lo[1], lo[2]);
            Aabb3D::new(min, min + Vec3::new(ext[0], ext[1], ext[2]))
        };
        let mut lookups = all_backends::<usize>();
        for (i, r) in raw.iter().enumerate() {
            for l in &mut lookups {
                l.insert(i, to_box(*r)).unwrap();
            }
        }
        let q = to_box(probe);
        let mut brute: Vec<_> = raw
            .iter()
            .enumerate()
            .filter(|(_, r)| to_box(**r).intersects_box(&q))
            .map(|(i, r)| key(&i, &to_box(*r)))
            .collect();
        brute.sort_unstable();
        for l in &lookups {
            prop_assert_eq!(multiset(l, q.into()), brute.clone());
            prop_assert_eq!(multiset(l, q.center().into()), {
                let mut v: Vec<_> = raw
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| to_box(**r).contains_point(q.center()))
                    .map(|(i, r)| key(&i, &to_box(*r)))
                    .collect();
                v.sort_unstable();
                v
            });
        }
    }
}
