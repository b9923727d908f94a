use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use sortbox_core::{format_array, parse_array, selection_sort};
use std::hint::black_box;

fn random_values(len: usize) -> Vec<i64> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(-500..500)).collect()
}

fn bench_selection_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort/selection");
    for len in [5usize, 55, 500] {
        let input = random_values(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| {
                let mut values = input.clone();
                selection_sort(black_box(&mut values));
                black_box(values);
            });
        });
    }
    group.finish();
}

fn bench_parse_sort_format(c: &mut Criterion) {
    let text = format_array(&random_values(55));

    c.bench_function("sort/parse_sort_format", |b| {
        b.iter(|| {
            let mut values = parse_array(black_box(&text)).expect("parse generated array");
            selection_sort(&mut values);
            black_box(format_array(&values));
        });
    });
}

criterion_group!(benches, bench_selection_sort, bench_parse_sort_format);
criterion_main!(benches);
