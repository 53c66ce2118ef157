// scripts/benchmark.rs
use anyhow::Result;
use sde_bridge_viz::distributions::InitialDistribution;
use sde_bridge_viz::math_utils::Timer;
use sde_bridge_viz::models::bridge::BridgeType;
use sde_bridge_viz::models::forward_sde::SdeType;
use sde_bridge_viz::{generate_bridge, generate_sde, BridgeConfig, SdeConfig};
use std::env;
use std::fs::File;
use std::io::Write;
use std::process::Command;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rust_version: Command::new("rustc")
                .arg("--version")
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown Rust version".to_string()),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    paths: usize,
    steps: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    value: f64,
    analytic_value: Option<f64>,
}

impl BenchmarkResult {
    fn relative_error(&self) -> Option<f64> {
        self.analytic_value
            .map(|a| (self.value - a).abs() / a.abs().max(f64::EPSILON))
    }
}

/// Endpoint spread of the SDE paths against `√(μ² Var[x₀] + v)` at the last
/// Euler-Maruyama time `(steps − 1)·dt`
fn run_sde_benchmarks() -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    // bimodal ±2 with uniform jitter of width 0.5
    let initial_variance = 4.0 + 0.25 / 12.0;

    for sde_type in SdeType::ALL {
        for &paths in &[1_000, 10_000, 100_000] {
            println!("Benchmarking {} with {} paths...", sde_type.name(), paths);
            let cfg = SdeConfig {
                paths,
                steps: 200,
                sde_type,
                initial_dist: InitialDistribution::Bimodal,
                seed: 42,
                ..Default::default()
            };

            let mut timer = Timer::new();
            timer.start();
            let result = generate_sde(&cfg)?;
            let time_ms = timer.elapsed_ms();

            let t_end = (cfg.steps - 1) as f64 * cfg.dt();
            let mu = sde_type.mu_decay(t_end);
            let analytic_std = (mu * mu * initial_variance + sde_type.variance(t_end)).sqrt();

            results.push(BenchmarkResult {
                name: format!("{} endpoint std", sde_type.key()),
                paths,
                steps: cfg.steps,
                time_ms,
                throughput_paths_per_sec: paths as f64 / (time_ms / 1000.0),
                value: result.summary.std_end,
                analytic_value: Some(analytic_std),
            });
        }
    }

    Ok(results)
}

/// Bridge generation is dominated by the KDE, which scales with pairs × grid
fn run_bridge_benchmarks() -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();

    for model_type in BridgeType::ALL {
        for &paths in &[20, 1_000, 10_000] {
            println!("Benchmarking {} bridge with {} paths...", model_type, paths);
            let cfg = BridgeConfig {
                paths,
                model_type,
                seed: 42,
                ..Default::default()
            };

            let mut timer = Timer::new();
            timer.start();
            let result = generate_bridge(&cfg)?;
            let time_ms = timer.elapsed_ms();

            results.push(BenchmarkResult {
                name: format!("{} target mean", model_type),
                paths,
                steps: cfg.steps,
                time_ms,
                throughput_paths_per_sec: paths as f64 / (time_ms / 1000.0),
                value: result.target_mean,
                analytic_value: Some(cfg.target_center),
            });
        }
    }

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Benchmark,Paths,Steps,Time_ms,Throughput_paths_per_sec,Value,Analytic_Value,Relative_Error"
    )?;
    for result in results {
        writeln!(
            file,
            "{},{},{},{:.2},{:.0},{:.6},{},{}",
            result.name,
            result.paths,
            result.steps,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result
                .analytic_value
                .map(|v| format!("{:.6}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            result
                .relative_error()
                .map(|e| format!("{:.6}", e))
                .unwrap_or_else(|| "N/A".to_string())
        )?;
    }

    println!("Results written to {}", filename);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    println!("sde-bridge-viz Benchmark Suite");
    println!("==============================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    println!("Running forward SDE benchmarks...");
    let mut all_results = run_sde_benchmarks()?;
    println!("\nRunning bridge benchmarks...");
    all_results.extend(run_bridge_benchmarks()?);

    println!("\n{:=<96}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<96}", "");
    println!(
        "{:<28} {:>8} {:>6} {:>12} {:>15} {:>10} {:>10} {:>10}",
        "Benchmark", "Paths", "Steps", "Time (ms)", "Throughput", "Value", "Expected", "Rel Error"
    );
    println!("{:-<96}", "");

    for result in &all_results {
        println!(
            "{:<28} {:>8} {:>6} {:>12.2} {:>15.0} {:>10.4} {:>10} {:>10}",
            result.name,
            result.paths,
            result.steps,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result
                .analytic_value
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            result
                .relative_error()
                .map(|e| format!("{:.2}%", e * 100.0))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }
    println!("{:=<96}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    write_results_to_csv(&all_results, &system_info, &filename)?;

    println!("\nTo reproduce these results:");
    println!("1. Use Rust version: {}", system_info.rust_version);
    println!("2. Run: cargo run --bin benchmark --release");
    println!("3. Ensure {} CPU threads available", system_info.rayon_threads);
    Ok(())
}
