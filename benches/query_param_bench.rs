use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use query_params::masker::mask;
use query_params::{
    parse_filters, prune, serialize_filters, FiltersQueryParam, OptionsQueryParam,
    OrderByQueryParam, PruneMode,
};
use std::hint::black_box;

fn filter_cases() -> Vec<(&'static str, &'static str)> {
    vec![
        ("simple", "status eq 'open'"),
        ("medium", "status eq 'open' and priority gt 2 and not assignee eq 'me'"),
        (
            "complex",
            "title eq 'Release Plan' and (version eq 'v1' or version eq 'v2') and (due ge '2024-01-01' and (owner eq 1,2,3 or team eq 'core'))",
        ),
    ]
}

// 基准测试：字面量屏蔽性能
fn benchmark_masker(c: &mut Criterion) {
    let mut group = c.benchmark_group("masker_performance");

    for (name, input) in filter_cases() {
        group.bench_with_input(BenchmarkId::new("mask", name), &input, |b, &input| {
            b.iter(|| match mask(black_box(input)) {
                Ok(masked) => black_box(masked),
                Err(_) => panic!("屏蔽失败"),
            })
        });
    }

    group.finish();
}

// 基准测试：语法分析性能
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");

    for (name, input) in filter_cases() {
        group.bench_with_input(BenchmarkId::new("parse", name), &input, |b, &input| {
            b.iter(|| match parse_filters(black_box(input)) {
                Ok(parts) => black_box(parts),
                Err(_) => panic!("解析失败"),
            })
        });
    }

    group.finish();
}

// 基准测试：清理分组
fn benchmark_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune_performance");

    for (name, input) in filter_cases() {
        let parts = parse_filters(input).expect("解析应该成功");

        for mode in [PruneMode::EmptyGroups, PruneMode::EmptyOrSingletonGroups] {
            let id = format!("{name}/{mode:?}");
            group.bench_with_input(BenchmarkId::new("prune", id), &parts, |b, parts| {
                b.iter(|| {
                    let pruned = prune(black_box(parts), |field, _, _| field != "version", mode);
                    black_box(pruned)
                })
            });
        }
    }

    group.finish();
}

// 基准测试：序列化
fn benchmark_serializer(c: &mut Criterion) {
    let mut group = c.benchmark_group("serializer_performance");

    for (name, input) in filter_cases() {
        let parts = parse_filters(input).expect("解析应该成功");
        group.bench_with_input(BenchmarkId::new("serialize", name), &parts, |b, parts| {
            b.iter(|| black_box(serialize_filters(black_box(parts))))
        });
    }

    group.finish();
}

// 基准测试：完整的端到端处理
fn benchmark_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end_performance");

    for (name, input) in filter_cases() {
        group.bench_with_input(BenchmarkId::new("filters", name), &input, |b, &input| {
            b.iter(|| {
                let mut filters = FiltersQueryParam::new(black_box(input));
                filters
                    .clean(|field, _, _| field != "owner", false)
                    .expect("清理应该成功");
                black_box(filters.clean_query_param_string().expect("序列化应该成功"))
            })
        });
    }

    group.bench_function("options_and_order_by", |b| {
        b.iter(|| {
            let mut options = OptionsQueryParam::new(black_box("include-test,include-foo,'a,b'"));
            options.clean(|option| option != "include-foo", false).expect("清理应该成功");
            let mut order_by = OrderByQueryParam::new(black_box("name desc, id, created asc"));
            order_by.clean(|field, _| field != "id", false).expect("清理应该成功");
            black_box((
                options.clean_query_param_string(),
                order_by.clean_query_param_string(),
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_masker,
    benchmark_parser,
    benchmark_prune,
    benchmark_serializer,
    benchmark_end_to_end
);
criterion_main!(benches);
