use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trip_aggregator::aggregator::cheapest_flight;
use trip_aggregator::breaker::{BreakerConfig, BreakerMachine, OutcomeWindow};
use trip_aggregator::config::AggregatorConfig;
use trip_aggregator::upstream::Flight;

fn bench_config() -> BreakerConfig {
    BreakerConfig {
        failure_window: 20,
        failure_threshold_percent: 50,
        recovery_time_ms: 30_000,
        half_open_max_probes: 5,
        call_timeout_ms: 3_000,
    }
}

fn benchmark_breaker_admit(c: &mut Criterion) {
    let mut machine = BreakerMachine::new(bench_config());

    c.bench_function("breaker_admit_closed", |b| {
        b.iter(|| black_box(machine.admit(black_box(1_000))))
    });
}

fn benchmark_breaker_record(c: &mut Criterion) {
    let mut machine = BreakerMachine::new(bench_config());

    c.bench_function("breaker_record_success", |b| {
        b.iter(|| black_box(machine.record(black_box(true), black_box(1_000))))
    });
}

fn benchmark_window_push(c: &mut Criterion) {
    let mut window = OutcomeWindow::new(20);
    let mut outcome = false;

    c.bench_function("window_push", |b| {
        b.iter(|| {
            outcome = !outcome;
            window.push(black_box(outcome));
        })
    });
}

fn benchmark_window_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_scale");

    for capacity in [10usize, 100, 1_000, 10_000].iter() {
        let mut window = OutcomeWindow::new(*capacity);
        // Saturate so every push takes the eviction path
        for _ in 0..*capacity {
            window.push(true);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &_cap| b.iter(|| window.push(black_box(false))),
        );
    }
    group.finish();
}

fn benchmark_cheapest_flight(c: &mut Criterion) {
    let mut group = c.benchmark_group("cheapest_flight");

    for size in [10usize, 100, 1_000].iter() {
        let flights: Vec<Flight> = (0..*size)
            .map(|i| Flight {
                id: format!("F-{}", i),
                price: ((i * 37) % 997) as f64,
                arrival_time: "19:30".to_string(),
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &_size| {
            b.iter(|| black_box(cheapest_flight(&flights)))
        });
    }
    group.finish();
}

fn benchmark_config_parsing(c: &mut Criterion) {
    let yaml = r#"
server:
  host: "0.0.0.0"
  port: 8080

upstreams:
  flights: "http://localhost:3001"
  hotels: "http://localhost:3002"
  weather: "http://localhost:3003"
  events: "http://localhost:3004"

timeouts:
  scatter_ms: 1000
  strict_ms: 2000
  chain_ms: 2000
  branch_ms: 1000

breaker:
  failure_window: 20
  failure_threshold_percent: 50
  recovery_time_ms: 30000
  half_open_max_probes: 5
  call_timeout_ms: 3000
"#;

    c.bench_function("config_parsing", |b| {
        b.iter(|| black_box(serde_yaml::from_str::<AggregatorConfig>(yaml)))
    });
}

criterion_group!(
    benches,
    benchmark_breaker_admit,
    benchmark_breaker_record,
    benchmark_window_push,
    benchmark_window_scale,
    benchmark_cheapest_flight,
    benchmark_config_parsing
);
criterion_main!(benches);
