use chart3d_rs::core::easing::SETTLE_EPSILON;
use chart3d_rs::core::{EasedValue, GrowthAnimation, bar_height, smoothing_factor};
use proptest::prelude::*;

proptest! {
    #[test]
    fn growth_is_monotonic_and_settles_at_one(
        rate in 0.05f64..10.0,
        steps in proptest::collection::vec(0.0f64..0.25, 1..400)
    ) {
        let mut growth = GrowthAnimation::new(rate);
        prop_assert_eq!(growth.progress(), 0.0);

        let mut previous = growth.progress();
        for dt in steps {
            growth.advance(dt);
            let progress = growth.progress();
            prop_assert!(progress >= previous);
            prop_assert!(progress <= 1.0);
            previous = progress;
        }

        for _ in 0..((1.0 / (rate * 0.1)).ceil() as usize + 1) {
            growth.advance(0.1);
        }
        prop_assert_eq!(growth.progress(), 1.0);
        prop_assert!(!growth.advance(0.1));
        prop_assert_eq!(growth.progress(), 1.0);
    }

    #[test]
    fn heights_never_exceed_max_visual_height(
        value in 0.0f64..1_000.0,
        extra in 0.0f64..1_000.0,
        max_visual_height in 0.0f64..50.0,
        progress in -1.0f64..2.0
    ) {
        let height = bar_height(value, value + extra, max_visual_height, progress);
        prop_assert!(height >= 0.0);
        prop_assert!(height <= max_visual_height);
    }

    #[test]
    fn smoothing_factor_stays_in_unit_interval(
        sharpness in 0.0f64..100.0,
        dt in 0.0f64..1.0
    ) {
        let factor = smoothing_factor(sharpness, dt);
        prop_assert!((0.0..=1.0).contains(&factor));
    }

    #[test]
    fn hover_easing_approaches_target_without_overshoot(
        start in 0.0f64..1.0,
        hovered in any::<bool>(),
        sharpness in 1.0f64..40.0,
        dt in 0.001f64..0.1
    ) {
        let target = if hovered { 1.0 } else { 0.0 };
        let mut eased = EasedValue::new(start);
        eased.set_target(target);

        let mut distance = (target - eased.value()).abs();
        let mut steps = 0usize;
        while !eased.is_settled() {
            eased.step(sharpness, dt);
            let next = (target - eased.value()).abs();
            prop_assert!(next <= distance);
            prop_assert!((0.0..=1.0).contains(&eased.value()));
            distance = next;
            steps += 1;
            prop_assert!(steps <= 20_000);
        }
        prop_assert_eq!(eased.value(), target);
    }
}

#[test]
fn smoothing_is_frame_rate_independent() {
    let one_step = smoothing_factor(8.0, 0.032);
    let two_steps = 1.0 - (1.0 - smoothing_factor(8.0, 0.016)).powi(2);
    assert!((one_step - two_steps).abs() <= 1e-12);
}

#[test]
fn eased_value_snaps_once_within_epsilon() {
    let mut eased = EasedValue::new(1.0 - SETTLE_EPSILON * 0.5);
    eased.set_target(1.0);
    assert!(!eased.step(10.0, 0.016));
    assert_eq!(eased.value(), 1.0);
}

#[test]
fn invalid_growth_rate_completes_immediately() {
    let mut growth = GrowthAnimation::new(0.0);
    assert!(!growth.advance(0.016));
    assert!(growth.is_complete());
}
