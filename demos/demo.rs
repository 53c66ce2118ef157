// demos/demo.rs
use sde_bridge_viz::controller::Regenerator;
use sde_bridge_viz::math_utils::Timer;
use sde_bridge_viz::models::bridge::BridgeType;
use sde_bridge_viz::models::forward_sde::SdeType;
use sde_bridge_viz::output;
use sde_bridge_viz::{
    generate_bridge, generate_sde, BridgeConfig, BridgeSimulator, OptionValue, SdeConfig,
};
use std::time::{Duration, Instant};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--csv" {
        write_csv_snapshot();
    } else {
        run_demo_mode();
    }
}

fn run_demo_mode() {
    println!("Forward SDEs");
    println!("============");
    for sde_type in SdeType::ALL {
        let cfg = SdeConfig {
            sde_type,
            ..Default::default()
        };
        let mut timer = Timer::new();
        timer.start();
        let result = generate_sde(&cfg).expect("Valid configuration");
        println!(
            "{:<8} {:<32} end mean {:>7.4}  end std {:>6.4}  ({:.1} ms)",
            sde_type.name(),
            sde_type.formula(),
            result.summary.mean_end,
            result.summary.std_end,
            timer.elapsed_ms()
        );
    }

    println!("\nDiffusion Bridges");
    println!("=================");
    for model_type in BridgeType::ALL {
        let cfg = BridgeConfig {
            model_type,
            ..Default::default()
        };
        let result = generate_bridge(&cfg).expect("Valid configuration");
        let mid = result.t.len() / 2;
        let peak = result
            .density
            .column(mid)
            .iter()
            .cloned()
            .fold(0.0_f64, f64::max);
        println!(
            "{:<6} x̄ {:>7.4}  ȳ {:>7.4}  peak density at t = {:.2}: {:.4}",
            model_type, result.source_mean, result.target_mean, result.t[mid], peak
        );
    }

    println!("\nDebounced regeneration");
    println!("======================");
    let start = Instant::now();
    let mut regen = Regenerator::new(BridgeSimulator::default());
    for (ms, sigma) in [(0, 0.2), (80, 0.4), (160, 0.6), (240, 1.0)] {
        regen
            .simulator_mut()
            .config
            .update("sigmaMax", OptionValue::Real(sigma))
            .expect("Known option");
        regen.schedule(start + Duration::from_millis(ms));
    }
    let mut runs = 0;
    for ms in (0..1000).step_by(50) {
        if let Some(result) = regen.poll(start + Duration::from_millis(ms)) {
            runs += 1;
            let result = result.expect("Valid configuration");
            println!(
                "   regenerated at +{} ms with σ_max = {} ({} paths)",
                ms,
                regen.simulator().config.sigma_max,
                result.paths.len()
            );
        }
    }
    println!("   4 option changes, {} regeneration(s)", runs);
}

fn write_csv_snapshot() {
    let current_dir = std::env::current_dir().expect("Failed to get current directory");
    let out_dir = current_dir.join("results");
    std::fs::create_dir_all(&out_dir).expect("Could not create results directory");

    let sde = generate_sde(&SdeConfig::default()).expect("Valid configuration");
    output::write_density_to_csv(out_dir.join("sde_density.csv"), &sde.x_grid, &sde.t, &sde.density)
        .expect("Could not write density");
    output::write_paths_to_csv(out_dir.join("sde_paths.csv"), &sde.t, &sde.sde_paths)
        .expect("Could not write paths");

    let bridge = generate_bridge(&BridgeConfig::default()).expect("Valid configuration");
    output::write_density_to_csv(
        out_dir.join("bridge_density.csv"),
        &bridge.x_grid,
        &bridge.t,
        &bridge.density,
    )
    .expect("Could not write density");
    output::write_summary_to_csv(
        out_dir.join("summary.csv"),
        &[
            ("sde_mean_end", format!("{:.6}", sde.summary.mean_end)),
            ("sde_std_end", format!("{:.6}", sde.summary.std_end)),
            ("bridge_source_mean", format!("{:.6}", bridge.source_mean)),
            ("bridge_target_mean", format!("{:.6}", bridge.target_mean)),
        ],
    )
    .expect("Could not write summary");

    println!("CSV snapshot written to {}", out_dir.display());
}
