//! Invariant 12: as `alpha` grows, the empirical distribution of retained
//! arrival times shifts toward larger (more recent) values.
//!
//! This is a slower, fixed-large-N statistical check rather than a
//! `proptest` property: it needs a large sample to make the trend visible
//! above sampling noise, not randomized small inputs.

use wrsample::{DefaultRng, Reservoir, ReservoirConfig};

fn mean_retained_time(capacity: u64, alpha: f64, seed: u32, n_total: u64, batch: usize) -> f64 {
    let mut r = Reservoir::new(ReservoirConfig::new(capacity, alpha), Box::new(DefaultRng::new(seed)));
    let mut presented = 0u64;
    while presented < n_total {
        let this_batch = batch.min((n_total - presented) as usize);
        r.keep_n_append(this_batch);
        presented += this_batch as u64;
    }
    let times = r.current().unwrap();
    times.iter().copied().sum::<u64>() as f64 / times.len() as f64
}

#[test]
fn bias_increases_with_alpha() {
    const CAPACITY: u64 = 200;
    const N_TOTAL: u64 = 50_000;
    const BATCH: usize = 97;

    let alphas = [0.0, 1.0, 3.0, 6.0];
    let mut means = Vec::new();
    for (i, &alpha) in alphas.iter().enumerate() {
        means.push(mean_retained_time(CAPACITY, alpha, 1000 + i as u32, N_TOTAL, BATCH));
    }

    for window in means.windows(2) {
        assert!(
            window[1] >= window[0] - 1.0,
            "mean retained arrival time should not decrease as alpha grows: {means:?}"
        );
    }

    // alpha == 0.0 is plain uniform sampling: the mean should sit near the
    // midpoint of the stream, well below the heavily-recency-biased runs.
    let uniform_mean = means[0];
    let biased_mean = *means.last().unwrap();
    assert!(
        biased_mean > uniform_mean + (N_TOTAL as f64) * 0.1,
        "large alpha should noticeably favor recent arrivals over uniform sampling: {means:?}"
    );
}
