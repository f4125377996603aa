use std::fs;
use std::path::Path;
use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use setcache::simulator::{MalformedRecordPolicy, Simulator};
use setcache::util::{get_configs, read_config, FIXTURES_PATH};

// The fixture traces are tiny, repeat them so there's something to measure
const REPEATS: usize = 2_000;

/// Replays every fixture trace against its config
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Examples");

    get_configs(Path::new(FIXTURES_PATH))
        .unwrap()
        .iter()
        .for_each(|case| {
            // Ignoring expected output
            let config = read_config(&case.config).unwrap();
            // For the purposes of this we aren't interested in IO effects
            let trace = fs::read(&case.trace).unwrap().repeat(REPEATS);
            let name = case.output.file_stem().unwrap().to_string_lossy().into_owned();
            group.throughput(Throughput::Bytes(trace.len() as u64));
            group.bench_with_input(BenchmarkId::new("Example", name), &(config, trace), |bench, (conf, trace)| {
                bench.iter(|| {
                    Simulator::new(conf).simulate(trace, MalformedRecordPolicy::Fail).unwrap().total_cycles()
                });
            });
        });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
