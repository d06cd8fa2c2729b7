//! Debug assertion macros for reservoir invariants.
//!
//! These are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds. Checked after every
//! ingestion call in `reservoir.rs`.

/// INV-CAP: size never exceeds capacity.
macro_rules! debug_assert_capacity_bound {
    ($size:expr, $capacity:expr) => {
        debug_assert!(
            $size <= $capacity,
            "INV-CAP violated: size {} exceeds capacity {}",
            $size,
            $capacity
        )
    };
}

/// INV-UNIQUE: retained arrival times are pairwise distinct.
macro_rules! debug_assert_unique_times {
    ($times:expr) => {
        debug_assert!(
            {
                let mut sorted: Vec<u64> = $times.to_vec();
                sorted.sort_unstable();
                sorted.windows(2).all(|w| w[0] != w[1])
            },
            "INV-UNIQUE violated: duplicate arrival time in retained set"
        )
    };
}

/// INV-RANGE: every retained arrival time `t` satisfies `ref_l <= t < grand_total`.
macro_rules! debug_assert_time_range {
    ($times:expr, $ref_l:expr, $grand_total:expr) => {
        debug_assert!(
            $times.iter().all(|&t| t >= $ref_l && t < $grand_total),
            "INV-RANGE violated: retained time outside [ref_l, grand_total)"
        )
    };
}

/// INV-KEY: every retained uniform key lies in `[0, 1)`.
macro_rules! debug_assert_key_range {
    ($keys:expr) => {
        debug_assert!(
            $keys.iter().all(|&u| (0.0..1.0).contains(&u)),
            "INV-KEY violated: retained key outside [0, 1)"
        )
    };
}

pub(crate) use {
    debug_assert_capacity_bound, debug_assert_key_range, debug_assert_time_range,
    debug_assert_unique_times,
};
