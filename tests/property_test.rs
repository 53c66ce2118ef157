// tests/property_test.rs
use proptest::prelude::*;
use sde_bridge_viz::distributions::{EndpointDistribution, InitialDistribution};
use sde_bridge_viz::models::bridge::BridgeType;
use sde_bridge_viz::models::forward_sde::SdeType;
use sde_bridge_viz::{generate_bridge, generate_sde, BridgeConfig, SdeConfig};

fn initial_dist() -> impl Strategy<Value = InitialDistribution> {
    prop::sample::select(InitialDistribution::ALL.to_vec())
}

fn endpoint_dist() -> impl Strategy<Value = EndpointDistribution> {
    prop::sample::select(EndpointDistribution::ALL.to_vec())
}

fn bridge_type() -> impl Strategy<Value = BridgeType> {
    prop::sample::select(BridgeType::ALL.to_vec())
}

fn sde_type() -> impl Strategy<Value = SdeType> {
    prop::sample::select(SdeType::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Initial densities are finite and non-negative for any decay and width
    #[test]
    fn prop_initial_pdf_non_negative(
        dist in initial_dist(),
        x in -50.0f64..50.0,
        mu in 0.0f64..1.0,
        sigma in 0.0f64..10.0,
    ) {
        let p = dist.pdf(x, mu, sigma);
        prop_assert!(p.is_finite());
        prop_assert!(p >= 0.0);
    }

    /// Endpoint densities survive zero spread
    #[test]
    fn prop_endpoint_pdf_non_negative(
        dist in endpoint_dist(),
        x in -50.0f64..50.0,
        center in -5.0f64..5.0,
        spread in 0.0f64..3.0,
    ) {
        let p = dist.pdf(x, center, spread);
        prop_assert!(p.is_finite());
        prop_assert!(p >= 0.0);
    }

    /// Every bridge schedule is finite with non-negative noise on [0, T]
    #[test]
    fn prop_schedule_finite(
        bridge in bridge_type(),
        frac in 0.0f64..=1.0,
        t_max in 1e-6f64..10.0,
        sigma_max in 0.0f64..60.0,
    ) {
        let sched = bridge.schedule(frac * t_max, t_max, sigma_max);
        prop_assert!(sched.a_t.is_finite());
        prop_assert!(sched.b_t.is_finite());
        prop_assert!(sched.sigma_t.is_finite());
        prop_assert!(sched.sigma_t >= 0.0);
    }

    /// Noise vanishes at both ends of every schedule
    #[test]
    fn prop_schedule_pinned_at_ends(
        bridge in bridge_type(),
        t_max in 0.1f64..10.0,
        sigma_max in 1e-3f64..3.0,
    ) {
        let start = bridge.schedule(0.0, t_max, sigma_max);
        let end = bridge.schedule(t_max, t_max, sigma_max);
        prop_assert!(start.sigma_t.abs() < 1e-9);
        prop_assert!(end.sigma_t.abs() < 1e-6);
        prop_assert!((start.a_t + start.b_t - 1.0).abs() < 1e-9);
        prop_assert!((end.a_t + end.b_t - 1.0).abs() < 1e-9);
    }

    /// Mean decay stays in (0, 1] and variance grows from zero
    #[test]
    fn prop_sde_moments(sde in sde_type(), t in 0.0f64..20.0) {
        let mu = sde.mu_decay(t);
        prop_assert!(mu > 0.0 && mu <= 1.0);
        prop_assert!(sde.variance(t) >= 0.0);
        prop_assert!(sde.variance(t + 0.1) >= sde.variance(t));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Identical configuration gives identical output, for any seed
    #[test]
    fn prop_sde_deterministic(
        seed in any::<u64>(),
        sde in sde_type(),
        dist in initial_dist(),
        steps in 2usize..40,
        paths in 1usize..10,
    ) {
        let cfg = SdeConfig { seed, sde_type: sde, initial_dist: dist, steps, paths, ..Default::default() };
        let a = generate_sde(&cfg).unwrap();
        let b = generate_sde(&cfg).unwrap();
        prop_assert_eq!(a.sde_paths, b.sde_paths);
        prop_assert_eq!(a.density, b.density);
    }

    #[test]
    fn prop_bridge_deterministic_and_finite(
        seed in any::<u64>(),
        bridge in bridge_type(),
        source in endpoint_dist(),
        target in endpoint_dist(),
        sigma_max in 0.0f64..2.0,
        steps in 2usize..30,
    ) {
        let cfg = BridgeConfig {
            seed,
            model_type: bridge,
            source_dist: source,
            target_dist: target,
            sigma_max,
            steps,
            paths: 5,
            ..Default::default()
        };
        let a = generate_bridge(&cfg).unwrap();
        let b = generate_bridge(&cfg).unwrap();
        prop_assert!(a.density.iter().all(|p| p.is_finite() && *p >= 0.0));
        prop_assert_eq!(a.paths, b.paths);
        prop_assert_eq!(a.density, b.density);
    }
}
