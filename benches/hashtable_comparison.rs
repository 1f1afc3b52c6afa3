use std::hint::black_box;

use bytemuck::Pod;
use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use rand::Rng;
use rand::SeedableRng;
use rand::distr;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use strided::HashTable;
use strided::Vector;

const LOAD_FACTOR: f32 = 0.75;

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Find,
    Remove,
}

trait BenchValue: Pod {
    fn new(key: u32) -> Self;
}

impl BenchValue for u64 {
    fn new(key: u32) -> Self {
        black_box(u64::from(key) << 3)
    }
}

impl BenchValue for [u8; 64] {
    fn new(key: u32) -> Self {
        let mut value = [0u8; 64];
        for (i, byte) in value.iter_mut().enumerate() {
            *byte = (key >> ((i % 4) * 8)) as u8;
        }
        black_box(value)
    }
}

/// Distinct random keys, never the reserved empty key.
fn random_keys(count: usize, rng: &mut SmallRng) -> Vec<u32> {
    let mut seen = HashbrownMap::with_capacity(count);
    while seen.len() < count {
        let key = rng.random_range(0..u32::MAX);
        seen.insert(key, ());
    }
    seen.into_keys().collect()
}

fn bench_insert_random<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::seed_from_u64(1);

    for &size in SIZES {
        let keys = random_keys(size, &mut rng);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("strided/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = HashTable::<V>::with_capacity(0, LOAD_FACTOR);
                    for key in keys {
                        black_box(table.insert(key, V::new(key)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = HashbrownMap::<u32, V>::new();
                    for key in keys {
                        black_box(table.insert(key, V::new(key)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_insert_preallocated<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_preallocated_{}",
        core::any::type_name::<V>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::seed_from_u64(2);

    for &size in SIZES {
        let keys = random_keys(size, &mut rng);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("strided/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = HashTable::<V>::with_capacity(size as u32, LOAD_FACTOR);
                    for key in keys {
                        black_box(table.insert(key, V::new(key)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = HashbrownMap::<u32, V>::with_capacity(size);
                    for key in keys {
                        black_box(table.insert(key, V::new(key)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::seed_from_u64(3);

    for &size in SIZES {
        // The first half is inserted, the second half only looked up.
        let keys = random_keys(size * 2, &mut rng);
        let (present, _) = keys.split_at(size);

        let mut strided = HashTable::<V>::with_capacity(0, LOAD_FACTOR);
        let mut hashbrown = HashbrownMap::<u32, V>::new();
        for &key in present {
            strided.insert(key, V::new(key));
            hashbrown.insert(key, V::new(key));
        }

        let mut lookups = keys.clone();
        lookups.shuffle(&mut rng);

        group.throughput(Throughput::Elements(lookups.len() as u64));
        group.bench_function(format!("strided/{size}"), |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(strided.find(*key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(hashbrown.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::seed_from_u64(4);

    for &size in SIZES {
        let keys = random_keys(size, &mut rng);
        let mut removals = keys.clone();
        removals.shuffle(&mut rng);

        let mut strided = HashTable::<V>::with_capacity(0, LOAD_FACTOR);
        let mut hashbrown = HashbrownMap::<u32, V>::new();
        for &key in &keys {
            strided.insert(key, V::new(key));
            hashbrown.insert(key, V::new(key));
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("strided/{size}"), |b| {
            b.iter_batched(
                || strided.clone(),
                |mut table| {
                    for key in &removals {
                        black_box(table.remove(*key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut table| {
                    for key in &removals {
                        black_box(table.remove(key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_probabilistic_zipf<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "mixed_probabilistic_zipf_{}",
        core::any::type_name::<V>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    const KEY_SPACE_MULTIPLIER: f32 = 2.0;

    for &size in SIZES {
        let mut rng = SmallRng::seed_from_u64(5);
        let operations = (0..size * 3)
            .map(|_| {
                let op_choice: f64 = rng.sample(distr::Uniform::new(0.0, 1.0).unwrap());
                if op_choice < 0.5 {
                    Operation::Find
                } else if op_choice < 0.75 {
                    Operation::Insert
                } else {
                    Operation::Remove
                }
            })
            .collect::<Vec<Operation>>();

        let insert_distr = Zipf::new(size as f32 - 1.0, 1.0).unwrap();
        let find_remove_distr = Zipf::new(size as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();

        // Pre-sample so both tables see the same key sequence.
        let workload = operations
            .into_iter()
            .map(|operation| {
                let key = match operation {
                    Operation::Insert => rng.sample(insert_distr),
                    Operation::Find | Operation::Remove => rng.sample(find_remove_distr),
                };
                (operation, key as u32)
            })
            .collect::<Vec<(Operation, u32)>>();

        group.throughput(Throughput::Elements(workload.len() as u64));
        group.bench_function(format!("strided/{size}"), |b| {
            b.iter(|| {
                let mut table = HashTable::<V>::with_capacity(0, LOAD_FACTOR);
                for &(operation, key) in &workload {
                    match operation {
                        Operation::Insert => {
                            black_box(table.insert(key, V::new(key)));
                        }
                        Operation::Find => {
                            black_box(table.find(key));
                        }
                        Operation::Remove => {
                            black_box(table.remove(key));
                        }
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut table = HashbrownMap::<u32, V>::new();
                for &(operation, key) in &workload {
                    match operation {
                        Operation::Insert => {
                            black_box(table.insert(key, V::new(key)));
                        }
                        Operation::Find => {
                            black_box(table.get(&key));
                        }
                        Operation::Remove => {
                            black_box(table.remove(&key));
                        }
                    }
                }
                black_box(table)
            })
        });
    }

    group.finish();
}

fn bench_churn<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::seed_from_u64(6);

    for &size in SIZES {
        // Every key appears twice: the first visit inserts, the second removes.
        let mut toggles = random_keys(size, &mut rng)
            .into_iter()
            .flat_map(|key| [key, key])
            .collect::<Vec<u32>>();
        toggles.shuffle(&mut rng);

        group.throughput(Throughput::Elements(toggles.len() as u64));
        group.bench_function(format!("strided/{size}"), |b| {
            b.iter(|| {
                let mut table = HashTable::<V>::with_capacity(0, LOAD_FACTOR);
                for &key in &toggles {
                    if table.remove(key).is_none() {
                        table.insert(key, V::new(key));
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut table = HashbrownMap::<u32, V>::new();
                for &key in &toggles {
                    if table.remove(&key).is_none() {
                        table.insert(key, V::new(key));
                    }
                }
                black_box(table)
            })
        });
    }

    group.finish();
}

fn bench_vector_push<V: BenchValue>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("vector_push_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("strided/{size}"), |b| {
            b.iter(|| {
                let mut vector = Vector::new(core::mem::size_of::<V>());
                for key in 0..size as u32 {
                    vector.push_value(V::new(key));
                }
                black_box(vector)
            })
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                let mut vector = Vec::new();
                for key in 0..size as u32 {
                    vector.push(V::new(key));
                }
                black_box(vector)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<u64>,
    bench_insert_random::<[u8; 64]>,
    bench_insert_preallocated::<u64>,
    bench_insert_preallocated::<[u8; 64]>,
    bench_find_hit_miss::<u64>,
    bench_find_hit_miss::<[u8; 64]>,
    bench_remove::<u64>,
    bench_remove::<[u8; 64]>,
    bench_mixed_probabilistic_zipf::<u64>,
    bench_mixed_probabilistic_zipf::<[u8; 64]>,
    bench_churn::<u64>,
    bench_churn::<[u8; 64]>,
    bench_vector_push::<u64>,
    bench_vector_push::<[u8; 64]>,
);

criterion_main!(benches);
