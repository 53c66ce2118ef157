// demos/error_handling_demo.rs
use sde_bridge_viz::controller::Regenerator;
use sde_bridge_viz::error::SdeError;
use sde_bridge_viz::{BridgeConfig, OptionValue, SdeConfig, SdeSimulator};

fn main() {
    println!("Error Handling Demo for sde-bridge-viz");
    println!("======================================\n");

    // Test 1: Unknown option name
    println!("1. Testing an unknown option...");
    let mut cfg = SdeConfig::default();
    match cfg.update("colorScheme", "viridis".into()) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: dt is derived
    println!("\n2. Testing a write to the derived time step...");
    match cfg.update("dt", OptionValue::Real(0.01)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }
    println!("   dt is still T / steps = {}", cfg.dt());

    // Test 3: Unknown selector falls back silently
    println!("\n3. Testing an unknown SDE type...");
    cfg.update("sdeType", "cosine".into())
        .expect("Selector fallback never errors");
    println!("   ✓ Fell back to {}", cfg.sde_type.name());

    // Test 4: Wrong value shape
    println!("\n4. Testing a malformed range...");
    match cfg.update("xRange", OptionValue::Real(4.0)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 5: Validation at generation time
    println!("\n5. Testing invalid bridge parameters...");
    let bad_bridge = BridgeConfig {
        sigma_max: -1.0,
        ..Default::default()
    };
    match sde_bridge_viz::generate_bridge(&bad_bridge) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 6: Degenerate but valid grids
    println!("\n6. Testing degenerate step counts...");
    for steps in [0, 1] {
        let cfg = SdeConfig {
            steps,
            ..Default::default()
        };
        match sde_bridge_viz::generate_sde(&cfg) {
            Ok(result) => println!(
                "   ✓ steps = {}: {} time points, density {:?}",
                steps,
                result.t.len(),
                result.density.dim()
            ),
            Err(e) => println!("   ✗ steps = {}: {}", steps, e),
        }
    }

    // Test 7: Busy gate
    println!("\n7. Testing overlapping regeneration...");
    let regen = Regenerator::new(SdeSimulator::default());
    let guard = regen.gate().try_acquire().expect("Gate starts free");
    match regen.regenerate() {
        Err(SdeError::GenerationInProgress) => println!("   ✓ Second run refused while busy"),
        other => println!("   Unexpected: {:?}", other.map(|r| r.t.len())),
    }
    drop(guard);
    match regen.regenerate() {
        Ok(result) => println!("   ✓ Gate released, regenerated {} paths", result.sde_paths.len()),
        Err(e) => println!("   ✗ {}", e),
    }

    println!("\nError handling demo complete!");
}
