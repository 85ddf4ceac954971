use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tagdrill_core::merge::merge_performance;
use tagdrill_core::table::parse_table;
use tagdrill_core::ReferenceData;

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    let small = generate_performance_csv(50, 2);
    let large = generate_performance_csv(1000, 3);

    group.bench_function("parse_1000x3", |b| b.iter(|| parse_table(black_box(&large))));

    let small_table = parse_table(&small);
    let large_table = parse_table(&large);

    group.bench_function("performance_50x2", |b| {
        b.iter(|| merge_performance(black_box(&small_table.rows)))
    });

    group.bench_function("performance_1000x3", |b| {
        b.iter(|| merge_performance(black_box(&large_table.rows)))
    });

    group.bench_function("from_tables_1000x3", |b| {
        b.iter(|| {
            ReferenceData::from_tables(
                black_box(Some(&large_table)),
                None,
                black_box(Some(&large_table)),
                None,
            )
        })
    });

    group.finish();
}

/// `n` tags, each split over `stages` rows with distinct flow readings.
fn generate_performance_csv(n: usize, stages: usize) -> String {
    let mut s = String::from("tag,name,medium,power_kw,flow_m3h,speed_rpm\n");
    for i in 0..n {
        for stage in 0..stages {
            let suffix = (b'A' + stage as u8) as char;
            s.push_str(&format!(
                "P{i}{suffix},泵{i},水,{}kW,{} m3/h,1450\n",
                10 + i % 90,
                100 + stage * 50
            ));
        }
    }
    s
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
