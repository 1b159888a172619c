//! Load generator tests

use std::fs;
use std::thread;
use std::time::Duration;

use shardkv::loadgen::{
    self, percentile_of, write_csv, LoadConfig, LoadReport, Operation, CSV_HEADER,
};
use shardkv::network::Server;
use shardkv::{Config, KvError};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_percentile_of_sorted_latencies() {
    let latencies: Vec<Duration> = (1..=10).map(ms).collect();

    assert_eq!(percentile_of(&latencies, 0.0), ms(1));
    assert_eq!(percentile_of(&latencies, 50.0), ms(5));
    assert_eq!(percentile_of(&latencies, 90.0), ms(9));
    assert_eq!(percentile_of(&latencies, 100.0), ms(10));
    assert_eq!(percentile_of(&latencies, 250.0), ms(10));
}

#[test]
fn test_percentile_of_empty() {
    assert_eq!(percentile_of(&[], 99.0), Duration::ZERO);
}

#[test]
fn test_report_summary_stats() {
    let report = LoadReport {
        operation: Operation::Get,
        count: 4,
        errors: 1,
        total: Duration::from_secs(2),
        latencies: vec![ms(1), ms(2), ms(3), ms(6)],
    };

    assert_eq!(report.rps(), 2.0);
    assert!((report.average().as_secs_f64() - 0.003).abs() < 1e-9);
    assert_eq!(report.fastest(), ms(1));
    assert_eq!(report.slowest(), ms(6));
    assert_eq!(report.error_rate(), 0.25);

    let line = report.to_string();
    assert!(line.starts_with("Get"));
    assert!(line.contains("errors=1"));
}

#[test]
fn test_average_does_not_truncate() {
    let report = LoadReport {
        operation: Operation::Put,
        count: 3,
        errors: 0,
        total: Duration::from_secs(1),
        latencies: vec![ms(1), ms(1), ms(2)],
    };

    // 4ms / 3, not rounded down to a whole divisor
    let average = report.average().as_secs_f64() * 1000.0;
    assert!((average - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_average_of_empty_report() {
    let report = LoadReport {
        operation: Operation::Get,
        count: 0,
        errors: 0,
        total: Duration::ZERO,
        latencies: Vec::new(),
    };

    assert_eq!(report.average(), Duration::ZERO);
}

// =============================================================================
// CSV Output Tests
// =============================================================================

fn sample_reports() -> Vec<LoadReport> {
    vec![
        LoadReport {
            operation: Operation::Put,
            count: 4,
            errors: 1,
            total: Duration::from_secs(2),
            latencies: vec![ms(1), ms(2), ms(3), ms(6)],
        },
        LoadReport {
            operation: Operation::Get,
            count: 2,
            errors: 0,
            total: Duration::from_millis(500),
            latencies: vec![ms(2), ms(4)],
        },
    ]
}

#[test]
fn test_write_csv_rows() {
    let mut out = Vec::new();
    write_csv(&mut out, &sample_reports()).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines,
        vec![
            "name,count,total,average,fastest,slowest,rps,errorCount,errorRate",
            "Put,4,2.00,3.00,1.00,6.00,2.00,1,0.25",
            "Get,2,0.50,3.00,2.00,4.00,4.00,0,0.00",
        ]
    );
}

#[test]
fn test_write_csv_no_reports_is_header_only() {
    let mut out = Vec::new();
    write_csv(&mut out, &[]).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", CSV_HEADER));
}

#[test]
fn test_csv_file_name() {
    let plain = loadgen::csv_file_name(None);
    assert!(plain.starts_with("benchmark_results_"));
    assert!(plain.ends_with(".csv"));
    // benchmark_results_YYYY-MM-DD_HH-MM-SS.csv
    assert_eq!(plain.len(), "benchmark_results_".len() + 19 + ".csv".len());

    let tagged = loadgen::csv_file_name(Some("baseline"));
    assert!(tagged.ends_with("_baseline.csv"));

    assert_eq!(loadgen::csv_file_name(Some("")).len(), plain.len());
}

#[test]
fn test_save_csv_creates_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("results");

    let path = loadgen::save_csv(&dir, Some("run1"), &sample_reports()).unwrap();

    assert!(path.starts_with(&dir));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("benchmark_results_"));
    assert!(name.ends_with("_run1.csv"));

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert_eq!(text.lines().next(), Some(CSV_HEADER));
}

#[test]
fn test_zero_concurrency_is_rejected() {
    let config = LoadConfig {
        concurrency: 0,
        ..LoadConfig::default()
    };

    assert!(matches!(
        loadgen::run(&config, Operation::Put),
        Err(KvError::Config(_))
    ));
}

#[test]
fn test_run_all_against_live_server() {
    let server = Server::open(Config::builder().listen_addr("127.0.0.1:0").build()).unwrap();
    let addr = server.local_addr();
    let shutdown = server.shutdown_handle();
    let engine = server.service().engine().clone();
    let handle = thread::spawn(move || server.run());

    let config = LoadConfig {
        server_addr: addr.to_string(),
        concurrency: 4,
        total_requests: 101,
    };
    let reports = loadgen::run_all(&config).unwrap();

    assert_eq!(reports.len(), 3);
    for (report, operation) in reports.iter().zip(Operation::ALL) {
        assert_eq!(report.operation, operation);
        assert_eq!(report.count, 101);
        assert_eq!(report.latencies.len(), 101);
        assert_eq!(report.errors, 0);
    }
    assert!(engine.is_empty());

    shutdown.shutdown();
    handle.join().unwrap().unwrap();
}
