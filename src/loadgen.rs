//! Load Generator
//!
//! Drives concurrent Put/Get/Delete traffic at a server and summarizes
//! throughput and latency.
//!
//! Requests are spread round-robin over `concurrency` worker threads, each
//! with its own connection. Request `i` uses key `key-{i}` and value
//! `value-{i}`, so running the phases in order Put, Get, Delete exercises
//! hits for every request.
//!
//! Reports can be saved as CSV, one row per phase, under a timestamped
//! file name.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::client::Client;
use crate::error::{KvError, Result};

/// Which RPC a load phase sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Put,
    Get,
    Delete,
}

impl Operation {
    /// All phases in the order that keeps Gets and Deletes hitting
    pub const ALL: [Operation; 3] = [Operation::Put, Operation::Get, Operation::Delete];
}

/// Load generator settings
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Server address (host:port)
    pub server_addr: String,

    /// Number of concurrent workers (connections)
    pub concurrency: usize,

    /// Total requests per phase
    pub total_requests: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:50051".to_string(),
            concurrency: 50,
            total_requests: 1000,
        }
    }
}

/// Results of one load phase
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub operation: Operation,

    /// Requests attempted
    pub count: usize,

    /// Requests that failed or got an unexpected answer
    pub errors: usize,

    /// Wall-clock time for the whole phase
    pub total: Duration,

    /// Per-request latencies, sorted ascending
    pub latencies: Vec<Duration>,
}

impl LoadReport {
    /// Requests per second over the whole phase
    pub fn rps(&self) -> f64 {
        let secs = self.total.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.count as f64 / secs
    }

    pub fn average(&self) -> Duration {
        if self.latencies.is_empty() {
            return Duration::ZERO;
        }
        let sum = self.latencies.iter().sum::<Duration>();
        Duration::from_secs_f64(sum.as_secs_f64() / self.latencies.len() as f64)
    }

    pub fn fastest(&self) -> Duration {
        self.latencies.first().copied().unwrap_or_default()
    }

    pub fn slowest(&self) -> Duration {
        self.latencies.last().copied().unwrap_or_default()
    }

    /// Nearest-rank percentile (0-100) of the sorted latencies
    pub fn percentile(&self, percentile: f64) -> Duration {
        percentile_of(&self.latencies, percentile)
    }

    pub fn error_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.errors as f64 / self.count as f64
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        write!(
            f,
            "{:<6} count={} errors={} total={:.2}s rps={:.2} avg={:.2}ms \
             fastest={:.2}ms slowest={:.2}ms p50={:.2}ms p90={:.2}ms p95={:.2}ms p99={:.2}ms",
            format!("{:?}", self.operation),
            self.count,
            self.errors,
            self.total.as_secs_f64(),
            self.rps(),
            ms(self.average()),
            ms(self.fastest()),
            ms(self.slowest()),
            ms(self.percentile(50.0)),
            ms(self.percentile(90.0)),
            ms(self.percentile(95.0)),
            ms(self.percentile(99.0)),
        )
    }
}

// =============================================================================
// CSV Output
// =============================================================================

/// Column names of a saved report
pub const CSV_HEADER: &str = "name,count,total,average,fastest,slowest,rps,errorCount,errorRate";

/// Write reports as CSV: `total` in seconds, latencies in milliseconds
pub fn write_csv<W: Write>(writer: &mut W, reports: &[LoadReport]) -> Result<()> {
    let ms = |d: Duration| d.as_secs_f64() * 1000.0;

    writeln!(writer, "{}", CSV_HEADER)?;
    for report in reports {
        writeln!(
            writer,
            "{:?},{},{:.2},{:.2},{:.2},{:.2},{:.2},{},{:.2}",
            report.operation,
            report.count,
            report.total.as_secs_f64(),
            ms(report.average()),
            ms(report.fastest()),
            ms(report.slowest()),
            report.rps(),
            report.errors,
            report.error_rate(),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// File name for a report saved now: `benchmark_results_<ts>[_<tag>].csv`
pub fn csv_file_name(tag: Option<&str>) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    match tag.filter(|tag| !tag.is_empty()) {
        Some(tag) => format!("benchmark_results_{}_{}.csv", timestamp, tag),
        None => format!("benchmark_results_{}.csv", timestamp),
    }
}

/// Save reports under `dir` (created if missing); returns the file's path
pub fn save_csv(dir: &Path, tag: Option<&str>, reports: &[LoadReport]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(csv_file_name(tag));
    let mut writer = BufWriter::new(File::create(&path)?);
    write_csv(&mut writer, reports)?;

    tracing::info!(path = %path.display(), reports = reports.len(), "Results saved");
    Ok(path)
}

/// Pick the latency at `percentile` from an ascending slice
pub fn percentile_of(sorted: &[Duration], percentile: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let clamped = percentile.clamp(0.0, 100.0);
    let index = ((sorted.len() - 1) as f64 * clamped / 100.0) as usize;
    sorted[index]
}

/// Run every phase in order
pub fn run_all(config: &LoadConfig) -> Result<Vec<LoadReport>> {
    Operation::ALL
        .iter()
        .map(|&operation| run(config, operation))
        .collect()
}

/// Run one phase of `total_requests` requests
pub fn run(config: &LoadConfig, operation: Operation) -> Result<LoadReport> {
    if config.concurrency == 0 {
        return Err(KvError::Config("concurrency must be at least 1".to_string()));
    }

    let workers = config.concurrency.min(config.total_requests.max(1));

    // Connect up front so connection setup isn't measured
    let clients = (0..workers)
        .map(|_| Client::connect(config.server_addr.as_str()))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(?operation, workers, requests = config.total_requests, "Load phase starting");

    let started = Instant::now();
    let results: Vec<(Vec<Duration>, usize)> = thread::scope(|scope| {
        let handles: Vec<_> = clients
            .into_iter()
            .enumerate()
            .map(|(worker, client)| {
                scope.spawn(move || {
                    drive(client, operation, worker, workers, config.total_requests)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| (Vec::new(), 0)))
            .collect()
    });
    let total = started.elapsed();

    let mut latencies = Vec::with_capacity(config.total_requests);
    let mut errors = 0;
    for (worker_latencies, worker_errors) in results {
        latencies.extend(worker_latencies);
        errors += worker_errors;
    }
    latencies.sort_unstable();

    Ok(LoadReport {
        operation,
        count: config.total_requests,
        errors: errors + config.total_requests.saturating_sub(latencies.len()),
        total,
        latencies,
    })
}

/// Send this worker's share of requests; returns (latencies, errors)
fn drive(
    mut client: Client,
    operation: Operation,
    worker: usize,
    stride: usize,
    total: usize,
) -> (Vec<Duration>, usize) {
    let mut latencies = Vec::with_capacity(total / stride + 1);
    let mut errors = 0;

    for i in (worker..total).step_by(stride) {
        let key = format!("key-{}", i);
        let value = format!("value-{}", i);

        let started = Instant::now();
        let outcome = match operation {
            Operation::Put => client.put(key.as_bytes(), value.as_bytes()),
            Operation::Get => client.get(key.as_bytes()).map(|found| found.is_some()),
            Operation::Delete => client.delete(key.as_bytes()),
        };
        latencies.push(started.elapsed());

        match outcome {
            Ok(true) => {}
            Ok(false) => errors += 1,
            Err(e) => {
                tracing::debug!("Request {} failed: {}", i, e);
                errors += 1;
            }
        }
    }

    (latencies, errors)
}
