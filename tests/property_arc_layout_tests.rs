use chart3d_rs::core::{Color, ProportionSlice, compute_slice_spans};
use proptest::prelude::*;
use std::f64::consts::TAU;

fn slices(counts: &[u64]) -> Vec<ProportionSlice> {
    counts
        .iter()
        .map(|count| ProportionSlice::new("s", *count, Color::BLACK, 0.0))
        .collect()
}

proptest! {
    #[test]
    fn spans_are_contiguous_and_sum_to_full_circle(
        counts in proptest::collection::vec(0u64..10_000, 1..24)
    ) {
        prop_assume!(counts.iter().sum::<u64>() > 0);
        let spans = compute_slice_spans(&slices(&counts));

        prop_assert_eq!(spans.len(), counts.len());
        prop_assert_eq!(spans[0].start_angle, 0.0);
        for pair in spans.windows(2) {
            prop_assert_eq!(pair[1].start_angle, pair[0].end_angle);
            prop_assert!(pair[1].index == pair[0].index + 1);
        }
        let last = spans[spans.len() - 1];
        prop_assert_eq!(last.end_angle, TAU);

        let sum: f64 = spans.iter().map(|span| span.span).sum();
        prop_assert!((sum - TAU).abs() <= 1e-9);
    }

    #[test]
    fn span_is_proportional_to_count(
        counts in proptest::collection::vec(1u64..1_000, 1..12)
    ) {
        let total: u64 = counts.iter().sum();
        let spans = compute_slice_spans(&slices(&counts));
        for (span, count) in spans.iter().zip(&counts) {
            let expected = *count as f64 / total as f64 * TAU;
            prop_assert!((span.span - expected).abs() <= 1e-9);
            prop_assert!(span.span >= 0.0);
        }
    }
}
