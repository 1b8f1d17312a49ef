//! Criterion benchmark: search and sort over large rosters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use inquisitorio::model::{ItemProgress, ItemRef, User};
use inquisitorio::roster::{filter_and_sort, SortDirection, SortKey};

const NAMES: [&str; 8] = ["Pedro", "Ana", "Beto", "Carla", "Lucía", "Tomás", "Zoe", "Íñigo"];

/// Deterministic roster with repeated names and point ties
fn roster(size: usize) -> Vec<User> {
    (0..size)
        .map(|i| {
            let mut user = User::new(
                format!("u{}", i),
                format!("{} {}", NAMES[i % NAMES.len()], i),
                ((i * 37) % 400) as u32,
            );
            user.class = Some(format!("Clase {}", i % 5));
            user.items.push(ItemProgress {
                item: ItemRef::Id(format!("item{}", i % 12)),
                progress: (i % 10) as u32,
            });
            user
        })
        .collect()
}

fn bench_filter_and_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing");

    for size in [100usize, 1_000, 10_000] {
        let users = roster(size);

        group.bench_with_input(BenchmarkId::new("points_desc", size), &users, |b, users| {
            b.iter(|| filter_and_sort(black_box(users), "", SortKey::Points, SortDirection::Descending));
        });
        group.bench_with_input(BenchmarkId::new("name_search", size), &users, |b, users| {
            b.iter(|| filter_and_sort(black_box(users), black_box("ca"), SortKey::Name, SortDirection::Ascending));
        });
        group.bench_with_input(BenchmarkId::new("points_search", size), &users, |b, users| {
            b.iter(|| filter_and_sort(black_box(users), black_box("10"), SortKey::Points, SortDirection::Ascending));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_filter_and_sort);
criterion_main!(benches);
