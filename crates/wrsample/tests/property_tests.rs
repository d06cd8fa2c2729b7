//! Property-based tests for the quantified invariants of ingestion.
//!
//! Coverage:
//! - `keep_n_append` and `remove_n_inject` share invariants 1-5 and 8-9.
//! - Invariants 6, 7 and 11 are mode-specific and each get their own
//!   `proptest!` block.
//!
//! Concrete scenarios (S1-S6) live in `tests/reservoir_tests.rs`; checkpoint
//! round-tripping (invariant 10) lives in `tests/checkpoint_tests.rs`.

use proptest::prelude::*;
use wrsample::{DefaultRng, Reservoir, ReservoirConfig};

fn rsv(capacity: u64, alpha: f64, seed: u32) -> Reservoir {
    Reservoir::new(ReservoirConfig::new(capacity, alpha), Box::new(DefaultRng::new(seed)))
}

proptest! {
    /// Invariants 1, 2, 3, 4, 5: capacity bound, total bookkeeping,
    /// uniqueness, time-range, and key-range, after any sequence of
    /// `keep_n_append` batches.
    #[test]
    fn prop_keep_append_core_invariants(
        capacity in 1u64..16,
        alpha in 0.0f64..3.0,
        seed in any::<u32>(),
        batches in prop::collection::vec(1usize..20, 1..12),
    ) {
        let mut r = rsv(capacity, alpha, seed);
        let mut grand_total = 0u64;

        for &batch in &batches {
            let size_before = r.size();
            r.keep_n_append(batch);

            grand_total += batch as u64;
            prop_assert!(r.size() <= capacity, "INV1: size {} > capacity {}", r.size(), capacity);
            prop_assert_eq!(r.grand_total(), grand_total, "INV2: bookkeeping mismatch");
            prop_assert!(r.grand_total() >= r.size(), "INV2: grand_total < size");

            let times = r.current().unwrap_or(&[]);
            let keys_len = times.len();
            let mut sorted = times.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), keys_len, "INV3: duplicate retained time");
            prop_assert!(times.iter().all(|&t| t < r.grand_total()), "INV4: time >= grand_total");

            let _ = size_before;
        }
    }

    /// Invariants 1, 2, 3, 4: same core bound/bookkeeping/uniqueness/range
    /// checks under `remove_n_inject` batches.
    #[test]
    fn prop_remove_inject_core_invariants(
        capacity in 1u64..16,
        alpha in 0.0f64..3.0,
        seed in any::<u32>(),
        batches in prop::collection::vec(1usize..20, 1..12),
    ) {
        let mut r = rsv(capacity, alpha, seed);
        let mut grand_total = 0u64;

        for &batch in &batches {
            r.remove_n_inject(batch);
            grand_total += batch as u64;

            prop_assert!(r.size() <= capacity, "INV1: size {} > capacity {}", r.size(), capacity);
            prop_assert_eq!(r.grand_total(), grand_total, "INV2: bookkeeping mismatch");

            let times = r.current().unwrap_or(&[]);
            let mut sorted = times.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), times.len(), "INV3: duplicate retained time");
            prop_assert!(times.iter().all(|&t| t < r.grand_total()), "INV4: time >= grand_total");
        }
    }

    /// Invariant 6: diff consistency for `keep_n_append`.
    #[test]
    fn prop_keep_append_diff_consistency(
        capacity in 1u64..12,
        seed in any::<u32>(),
        size_old_batch in 0usize..20,
        n_provided in 1usize..20,
    ) {
        let mut r = rsv(capacity, 1.0, seed);
        if size_old_batch > 0 {
            r.keep_n_append(size_old_batch);
        }
        let size_old = r.size() as usize;

        r.keep_n_append(n_provided);

        let kept = r.kept().unwrap();
        let appended = r.appended().unwrap();
        let expected_size = (size_old + n_provided).min(capacity as usize);

        prop_assert_eq!(kept.len() + appended.len(), expected_size);
        prop_assert!(kept.iter().all(|&i| i < size_old));
        prop_assert!(appended.iter().all(|&i| i < n_provided));
    }

    /// Invariant 7: diff consistency for `remove_n_inject`.
    #[test]
    fn prop_remove_inject_diff_consistency(
        capacity in 1u64..12,
        seed in any::<u32>(),
        size_old_batch in 0usize..20,
        n_provided in 1usize..20,
    ) {
        let mut r = rsv(capacity, 1.0, seed);
        if size_old_batch > 0 {
            r.keep_n_append(size_old_batch);
        }
        let size_old = r.size() as usize;

        r.remove_n_inject(n_provided);

        let removed = r.removed().unwrap();
        let injected = r.injected().unwrap();
        let size_new = r.size() as usize;

        // Every evicted slot is refilled in place; any remaining newcomers
        // are appended past the old tail, growing size by exactly that surplus.
        let surplus = size_new - size_old;
        prop_assert_eq!(injected.len(), removed.len() + surplus, "n_injected must equal n_removed plus tail growth");
        prop_assert!(injected.len() <= n_provided);

        let mut removed_sorted = removed.to_vec();
        removed_sorted.sort_unstable();
        removed_sorted.dedup();
        prop_assert_eq!(removed_sorted.len(), removed.len(), "idx_removed must be distinct");
        prop_assert!(removed.iter().all(|&s| s < size_old));

        let mut injected_sorted = injected.to_vec();
        injected_sorted.sort_unstable();
        injected_sorted.dedup();
        prop_assert_eq!(injected_sorted.len(), injected.len(), "idx_injected must be distinct");
        prop_assert!(injected.iter().all(|&i| i < n_provided));
    }

    /// Invariant 8: exactly one diff shape is populated after any ingestion.
    #[test]
    fn prop_mode_exclusivity(
        capacity in 1u64..8,
        seed in any::<u32>(),
        use_remove in any::<bool>(),
        n_provided in 1usize..20,
    ) {
        let mut r = rsv(capacity, 1.0, seed);
        if use_remove {
            r.remove_n_inject(n_provided);
            prop_assert!(r.kept().is_none());
            prop_assert!(r.appended().is_none());
            prop_assert!(r.removed().is_some());
            prop_assert!(r.injected().is_some());
        } else {
            r.keep_n_append(n_provided);
            prop_assert!(r.removed().is_none());
            prop_assert!(r.injected().is_none());
            prop_assert!(r.kept().is_some());
            prop_assert!(r.appended().is_some());
        }
    }

    /// Invariant 9: determinism across two independently constructed
    /// reservoirs given identical seeds and identical batch sequences.
    #[test]
    fn prop_determinism(
        capacity in 1u64..12,
        alpha in 0.0f64..3.0,
        seed in any::<u32>(),
        batches in prop::collection::vec(1usize..15, 1..8),
        use_remove in any::<bool>(),
    ) {
        let mut a = rsv(capacity, alpha, seed);
        let mut b = rsv(capacity, alpha, seed);

        for &batch in &batches {
            if use_remove {
                a.remove_n_inject(batch);
                b.remove_n_inject(batch);
            } else {
                a.keep_n_append(batch);
                b.keep_n_append(batch);
            }
        }

        prop_assert_eq!(a.current(), b.current());
    }

    /// Invariant 11: fast-path identity for `keep_n_append` when
    /// `size_old + n_provided <= capacity`.
    #[test]
    fn prop_keep_append_fast_path_identity(
        capacity in 1u64..16,
        seed in any::<u32>(),
        size_old_batch in 0usize..8,
        n_provided in 1usize..8,
    ) {
        let mut r = rsv(capacity, 1.0, seed);
        if size_old_batch > 0 {
            r.keep_n_append(size_old_batch);
        }
        let size_old = r.size() as usize;
        prop_assume!(size_old + n_provided <= capacity as usize);

        r.keep_n_append(n_provided);

        let kept: Vec<usize> = (0..size_old).collect();
        let appended: Vec<usize> = (0..n_provided).collect();
        prop_assert_eq!(r.kept().unwrap(), &kept[..]);
        prop_assert_eq!(r.appended().unwrap(), &appended[..]);
    }
}
