// scripts/simulate.rs
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use sde_bridge_viz::output::{write_density_to_csv, write_json, write_paths_to_csv};
use sde_bridge_viz::{generate_bridge, generate_sde, BridgeConfig, OptionValue, SdeConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    Sde,
    Bridge,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate SDE or diffusion-bridge visualization data"
)]
struct Args {
    #[arg(value_enum, default_value_t = Demo::Sde)]
    demo: Demo,

    /// JSON configuration file; missing keys take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Option override, e.g. `--set sdeType=ve --set xRange=-6,6`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Output file (json) or directory (csv)
    #[arg(long, default_value = "results/simulation.json")]
    out: PathBuf,
}

fn parse_override(raw: &str) -> Result<(&str, OptionValue)> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.trim(), OptionValue::parse(value))),
        None => bail!("override '{}' is not of the form KEY=VALUE", raw),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

fn run_sde(args: &Args) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => SdeConfig::from_json(&fs::read_to_string(path)?)?,
        None => SdeConfig::default(),
    };
    for raw in &args.overrides {
        let (key, value) = parse_override(raw)?;
        cfg.update(key, value)?;
    }

    let result = generate_sde(&cfg)?;
    println!(
        "{} | {} paths × {} steps | end mean {:.4}, std {:.4}",
        result.sde_type.name(),
        result.sde_paths.len(),
        result.t.len(),
        result.summary.mean_end,
        result.summary.std_end
    );

    match args.format {
        Format::Json => {
            ensure_parent(&args.out)?;
            write_json(&args.out, &result)?;
        }
        Format::Csv => {
            fs::create_dir_all(&args.out)?;
            write_density_to_csv(args.out.join("density.csv"), &result.x_grid, &result.t, &result.density)?;
            write_paths_to_csv(args.out.join("sde_paths.csv"), &result.t, &result.sde_paths)?;
            write_paths_to_csv(args.out.join("ode_paths.csv"), &result.t, &result.ode_paths)?;
        }
    }
    info!(out = %args.out.display(), "sde results written");
    Ok(())
}

fn run_bridge(args: &Args) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => BridgeConfig::from_json(&fs::read_to_string(path)?)?,
        None => BridgeConfig::default(),
    };
    for raw in &args.overrides {
        let (key, value) = parse_override(raw)?;
        cfg.update(key, value)?;
    }

    let result = generate_bridge(&cfg)?;
    println!(
        "{} | {} paths × {} steps | x̄ = {:.4}, ȳ = {:.4}",
        result.model_type,
        result.paths.len(),
        result.t.len(),
        result.source_mean,
        result.target_mean
    );

    match args.format {
        Format::Json => {
            ensure_parent(&args.out)?;
            write_json(&args.out, &result)?;
        }
        Format::Csv => {
            fs::create_dir_all(&args.out)?;
            write_density_to_csv(args.out.join("density.csv"), &result.x_grid, &result.t, &result.density)?;
            write_paths_to_csv(args.out.join("bridge_paths.csv"), &result.t, &result.paths)?;
            if !result.mean_path.is_empty() {
                write_paths_to_csv(
                    args.out.join("mean_path.csv"),
                    &result.t,
                    std::slice::from_ref(&result.mean_path),
                )?;
            }
        }
    }
    info!(out = %args.out.display(), "bridge results written");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let args = Args::parse();
    match args.demo {
        Demo::Sde => run_sde(&args),
        Demo::Bridge => run_bridge(&args),
    }
}
