//! The pure sampling algorithm. Given the reservoir's current retained
//! state and a batch of `n_provided` arrivals, computes which retained
//! slots survive and which arrivals are selected.

use crate::rng::UniformSource;

/// One workspace entry: `(original_index, arrival_time, u_key, priority)`.
///
/// A local value type, not a domain entity in its own right — it only lives
/// for the duration of a single `sample_inject` call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    /// For a surviving retained item, its old slot index. For an admitted
    /// newcomer, its offset within the incoming batch.
    pub original_index: usize,
    pub arrival_time: u64,
    pub u_key: f64,
    pub priority: f64,
}

/// Fast path: absorbs `n_provided` arrivals directly into
/// `chosen_times`/`chosen_u` starting at `current_size`, with no eviction.
/// Caller guarantees `current_size + n_provided <= chosen_times.len()`.
pub(crate) fn direct_inject(
    chosen_times: &mut [u64],
    chosen_u: &mut [f64],
    current_size: usize,
    grand_total: u64,
    n_provided: usize,
    rng: &mut dyn UniformSource,
) {
    let mut size = current_size;
    let mut total = grand_total;
    for _ in 0..n_provided {
        chosen_times[size] = total;
        chosen_u[size] = rng.uniform_real(0.0, 1.0);
        size += 1;
        total += 1;
    }
}

/// Priority of an item at arrival index `t` with uniform key `u`, given the
/// current reference `ref_l` and normalization `factor`.
#[inline]
fn priority(t: u64, ref_l: u64, factor: f64, alpha: f64, u: f64) -> f64 {
    (((t - ref_l) as f64) * factor).powf(alpha) / u
}

/// General path: runs the A-Res/A-ExpJ-style selection, chunk by chunk, and
/// returns a workspace whose first `capacity` entries are exactly the
/// survivors (retained items and/or newcomers, in unspecified order).
///
/// `ref_l` is recomputed as `min(chosen_times[..current_size])` only when
/// `current_size > 0` — it is a cached reference read only by this slow
/// path, not refreshed by `direct_inject`.
pub(crate) fn sample_inject(
    chosen_times: &[u64],
    chosen_u: &[f64],
    current_size: usize,
    grand_total: u64,
    n_provided: usize,
    capacity: u64,
    alpha: f64,
    ref_l: &mut u64,
    rng: &mut dyn UniformSource,
) -> Vec<Candidate> {
    let capacity = capacity as usize;
    debug_assert!(capacity > 0);

    let buffer_size = (current_size + n_provided).min(3 * capacity);
    let mut workspace = vec![
        Candidate {
            original_index: 0,
            arrival_time: 0,
            u_key: 0.0,
            priority: 0.0,
        };
        buffer_size
    ];

    if current_size > 0 {
        *ref_l = chosen_times[..current_size].iter().copied().min().unwrap();
    }

    let factor = 1.0 / ((grand_total - *ref_l) as f64 + n_provided as f64);

    for i in 0..current_size {
        let t = chosen_times[i];
        let u = chosen_u[i];
        workspace[i] = Candidate {
            original_index: i,
            arrival_time: t,
            u_key: u,
            priority: priority(t, *ref_l, factor, alpha, u),
        };
    }

    let mut idx_grand = grand_total;
    let mut ref_diff = idx_grand - *ref_l;
    let mut idx0 = current_size;
    let mut idx_new = 0usize;

    while idx_new < n_provided {
        let mut idx = idx0;
        while idx < buffer_size {
            let u = rng.uniform_real(0.0, 1.0);
            workspace[idx] = Candidate {
                original_index: idx_new,
                arrival_time: idx_grand,
                u_key: u,
                priority: priority(idx_grand, *ref_l, factor, alpha, u),
            };
            idx += 1;
            idx_new += 1;
            if idx_new == n_provided {
                break;
            }
            idx_grand += 1;
            ref_diff += 1;
        }

        // Place the `capacity` largest-priority entries in [0, capacity);
        // the tail (losers so far) may be overwritten by the next chunk.
        debug_assert!(idx > capacity, "a chunk must grow past `capacity` entries");
        workspace[..idx].select_nth_unstable_by(capacity, |a, b| {
            b.priority.partial_cmp(&a.priority).unwrap_or(std::cmp::Ordering::Equal)
        });

        idx0 = capacity;
    }

    workspace.truncate(capacity);
    workspace
}
