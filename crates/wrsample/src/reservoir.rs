use crate::invariants::{
    debug_assert_capacity_bound, debug_assert_key_range, debug_assert_time_range,
    debug_assert_unique_times,
};
use crate::kernel;
use crate::rng::{DefaultRng, UniformSource};
use crate::ReservoirConfig;

/// Which ingestion mode produced the current diff, and the diff itself.
///
/// Replaces the source's single integer tag plus two overloaded arrays: the
/// two ingestion shapes are mutually exclusive by construction here, so
/// there is no "valid only when mode matches" footgun left for callers.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffRecord {
    /// No ingestion has run yet (or the reservoir was just [`Reservoir::clear`]ed).
    None,
    /// Produced by [`Reservoir::keep_n_append`].
    KeepAppend {
        /// Old-array slot indices that survived, in scan order.
        kept: Vec<usize>,
        /// Batch offsets `[0, n_provided)` that were admitted, in scan order.
        appended: Vec<usize>,
    },
    /// Produced by [`Reservoir::remove_n_inject`].
    RemoveInject {
        /// Old-array slot indices that were evicted, ascending.
        removed: Vec<usize>,
        /// Batch offsets `[0, n_provided)` that were admitted, paired in
        /// order with `removed` and then with any surplus appended past the
        /// old tail.
        injected: Vec<usize>,
    },
}

/// A fixed-capacity weighted reservoir over an unbounded arrival stream.
///
/// See the crate documentation for the sampling contract. A `Reservoir` is
/// either built live via [`Reservoir::new`] (capacity and alpha fixed for
/// its lifetime) or built via [`Reservoir::pending_import`] purely to be
/// handed to [`Reservoir::import_from`] (see the `checkpoint` module).
pub struct Reservoir {
    alpha: f64,
    capacity: u64,
    size: u64,
    grand_total: u64,
    ref_l: u64,
    chosen_times: Vec<u64>,
    chosen_u: Vec<f64>,
    diff: DiffRecord,
    rng: Box<dyn UniformSource>,
}

impl Reservoir {
    /// Builds an empty, live reservoir with the given configuration and RNG.
    #[must_use]
    pub fn new(config: ReservoirConfig, rng: Box<dyn UniformSource>) -> Self {
        let capacity = config.capacity();
        Self {
            alpha: config.alpha(),
            capacity,
            size: 0,
            grand_total: 0,
            ref_l: 0,
            chosen_times: vec![0; capacity as usize],
            chosen_u: vec![0.0; capacity as usize],
            diff: DiffRecord::None,
            rng,
        }
    }

    /// Convenience over [`Reservoir::new`] using [`DefaultRng`] seeded from
    /// process entropy. Prefer `new` with an explicit seed in tests.
    #[must_use]
    pub fn new_with_default_rng(config: ReservoirConfig) -> Self {
        Self::new(config, Box::new(DefaultRng::from_entropy()))
    }

    /// Builds a reservoir with no capacity of its own, suitable only as the
    /// target of [`Reservoir::import_from`] (mirrors the source's
    /// default-constructed `weighted_reservoir`, which likewise allocates
    /// nothing until a checkpoint is imported into it).
    #[must_use]
    pub fn pending_import(rng: Box<dyn UniformSource>) -> Self {
        Self {
            alpha: 0.0,
            capacity: 0,
            size: 0,
            grand_total: 0,
            ref_l: 0,
            chosen_times: Vec::new(),
            chosen_u: Vec::new(),
            diff: DiffRecord::None,
            rng,
        }
    }

    /// Empties the reservoir. Does not change `capacity` or `alpha`, and
    /// does not reallocate the retained arrays.
    pub fn clear(&mut self) {
        self.size = 0;
        self.grand_total = 0;
        self.ref_l = 0;
        self.diff = DiffRecord::None;
    }

    /// `true` iff the reservoir has never ingested anything: `size == 0 &&
    /// grand_total == 0 && ref_l == 0`, independent of allocation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.grand_total == 0 && self.ref_l == 0
    }

    /// Number of items currently retained.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reservoir capacity `K`.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Recency-bias exponent `alpha`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Total arrivals ever presented to the reservoir.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    /// Read-only view of the currently retained arrival times, or `None`
    /// when empty.
    #[must_use]
    pub fn current(&self) -> Option<&[u64]> {
        if self.size == 0 {
            None
        } else {
            Some(&self.chosen_times[..self.size as usize])
        }
    }

    /// Slots kept in place by the most recent [`Reservoir::keep_n_append`],
    /// or `None` if the last ingestion (if any) was a `remove_n_inject` or
    /// none has run yet.
    #[must_use]
    pub fn kept(&self) -> Option<&[usize]> {
        match &self.diff {
            DiffRecord::KeepAppend { kept, .. } => Some(kept),
            _ => None,
        }
    }

    /// Batch offsets appended by the most recent `keep_n_append`.
    #[must_use]
    pub fn appended(&self) -> Option<&[usize]> {
        match &self.diff {
            DiffRecord::KeepAppend { appended, .. } => Some(appended),
            _ => None,
        }
    }

    /// Slots evicted by the most recent `remove_n_inject`.
    #[must_use]
    pub fn removed(&self) -> Option<&[usize]> {
        match &self.diff {
            DiffRecord::RemoveInject { removed, .. } => Some(removed),
            _ => None,
        }
    }

    /// Batch offsets injected by the most recent `remove_n_inject`.
    #[must_use]
    pub fn injected(&self) -> Option<&[usize]> {
        match &self.diff {
            DiffRecord::RemoveInject { injected, .. } => Some(injected),
            _ => None,
        }
    }

    /// The diff record produced by the most recent ingestion, if any.
    #[must_use]
    pub fn diff(&self) -> &DiffRecord {
        &self.diff
    }

    fn check_ingest_preconditions(&self, n_provided: usize) {
        assert!(n_provided > 0, "n_provided must be > 0");
        assert!(
            self.capacity > 0,
            "reservoir has no capacity; construct with Reservoir::new or import a checkpoint first"
        );
        assert!(
            self.grand_total.checked_add(n_provided as u64).is_some(),
            "grand_total would overflow"
        );
    }

    /// Absorbs a batch of `n_provided` new arrivals. Retained items that
    /// survive keep their slot positions; newly admitted items are
    /// logically appended after the kept block.
    ///
    /// # Panics
    ///
    /// Panics if `n_provided == 0`, if the reservoir has zero capacity, or
    /// if `grand_total + n_provided` would overflow `u64`.
    pub fn keep_n_append(&mut self, n_provided: usize) {
        self.check_ingest_preconditions(n_provided);

        let n64 = n_provided as u64;
        let size = self.size as usize;
        let capacity = self.capacity as usize;

        if size + n_provided <= capacity {
            kernel::direct_inject(
                &mut self.chosen_times,
                &mut self.chosen_u,
                size,
                self.grand_total,
                n_provided,
                self.rng.as_mut(),
            );

            self.diff = DiffRecord::KeepAppend {
                kept: (0..size).collect(),
                appended: (0..n_provided).collect(),
            };
            self.size += n64;
            self.grand_total += n64;
            self.debug_check_invariants();
            return;
        }

        let workspace = kernel::sample_inject(
            &self.chosen_times,
            &self.chosen_u,
            size,
            self.grand_total,
            n_provided,
            self.capacity,
            self.alpha,
            &mut self.ref_l,
            self.rng.as_mut(),
        );

        let grand_total = self.grand_total;
        let mut kept = Vec::new();
        for candidate in &workspace {
            if candidate.arrival_time < grand_total {
                self.chosen_times[kept.len()] = candidate.arrival_time;
                self.chosen_u[kept.len()] = candidate.u_key;
                kept.push(candidate.original_index);
            }
        }

        let n_kept = kept.len();
        let mut appended = Vec::new();
        for candidate in &workspace {
            if candidate.arrival_time >= grand_total {
                let slot = n_kept + appended.len();
                self.chosen_times[slot] = candidate.arrival_time;
                self.chosen_u[slot] = candidate.u_key;
                appended.push(candidate.original_index);
            }
        }

        self.diff = DiffRecord::KeepAppend { kept, appended };
        self.size = self.capacity;
        self.grand_total += n64;
        self.debug_check_invariants();
    }

    /// Absorbs a batch of `n_provided` new arrivals. Retained items that
    /// survive keep their slot positions *unchanged*; evicted slots are
    /// overwritten in place by admitted newcomers, and any admitted
    /// newcomers beyond the number of vacancies are appended past the old
    /// tail.
    ///
    /// # Panics
    ///
    /// Same preconditions as [`Reservoir::keep_n_append`].
    pub fn remove_n_inject(&mut self, n_provided: usize) {
        self.check_ingest_preconditions(n_provided);

        let n64 = n_provided as u64;
        let size = self.size as usize;
        let capacity = self.capacity as usize;

        if size + n_provided <= capacity {
            kernel::direct_inject(
                &mut self.chosen_times,
                &mut self.chosen_u,
                size,
                self.grand_total,
                n_provided,
                self.rng.as_mut(),
            );

            self.diff = DiffRecord::RemoveInject {
                removed: Vec::new(),
                injected: (0..n_provided).collect(),
            };
            self.size += n64;
            self.grand_total += n64;
            self.debug_check_invariants();
            return;
        }

        let workspace = kernel::sample_inject(
            &self.chosen_times,
            &self.chosen_u,
            size,
            self.grand_total,
            n_provided,
            self.capacity,
            self.alpha,
            &mut self.ref_l,
            self.rng.as_mut(),
        );

        // Pre-increment grand_total doubles as the "evacuated" sentinel:
        // every pre-existing time is strictly less than it.
        let sentinel = self.grand_total;
        for t in &mut self.chosen_times[..capacity] {
            *t = sentinel;
        }

        for candidate in &workspace {
            if candidate.arrival_time < sentinel {
                self.chosen_times[candidate.original_index] = candidate.arrival_time;
            }
        }

        let mut removed = Vec::new();
        for (slot, &t) in self.chosen_times[..size].iter().enumerate() {
            if t == sentinel {
                removed.push(slot);
            }
        }

        let mut injected = Vec::new();
        let mut cursor = workspace.iter();
        for &slot in &removed {
            let candidate = loop {
                let c = cursor.next().expect("enough newcomers to fill every eviction");
                if c.arrival_time >= sentinel {
                    break c;
                }
            };
            self.chosen_times[slot] = candidate.arrival_time;
            self.chosen_u[slot] = candidate.u_key;
            injected.push(candidate.original_index);
        }

        let mut tail = size;
        for candidate in cursor {
            if candidate.arrival_time >= sentinel {
                self.chosen_times[tail] = candidate.arrival_time;
                self.chosen_u[tail] = candidate.u_key;
                injected.push(candidate.original_index);
                tail += 1;
            }
        }

        self.diff = DiffRecord::RemoveInject { removed, injected };
        self.size = self.capacity;
        self.grand_total += n64;
        self.debug_check_invariants();
    }

    fn debug_check_invariants(&self) {
        if self.size == 0 {
            return;
        }
        let live_times = &self.chosen_times[..self.size as usize];
        let live_keys = &self.chosen_u[..self.size as usize];
        debug_assert_capacity_bound!(self.size, self.capacity);
        debug_assert_unique_times!(live_times);
        debug_assert_time_range!(live_times, self.ref_l, self.grand_total);
        debug_assert_key_range!(live_keys);
    }

}

#[cfg(feature = "checkpoint")]
impl Reservoir {
    /// Writes the seven named datasets of the checkpoint layout (`alpha`,
    /// `capacity`, `current_size`, `grand_total`, `ref_L`, `chosen_times`,
    /// `chosen_u`) to `store`. The two arrays are always written at full
    /// `capacity` length; entries beyond `size` are whatever zero
    /// initialization left them, by design, so re-exporting an imported
    /// checkpoint reproduces it byte-for-byte.
    pub fn export_to<S: crate::checkpoint::BlobStore>(
        &self,
        store: &mut S,
    ) -> Result<(), crate::StoreError> {
        store.write_f64("alpha", self.alpha)?;
        store.write_u64("capacity", self.capacity)?;
        store.write_u64("current_size", self.size)?;
        store.write_u64("grand_total", self.grand_total)?;
        store.write_u64("ref_L", self.ref_l)?;
        if self.capacity > 0 {
            store.write_u64_array("chosen_times", &self.chosen_times)?;
            store.write_f64_array("chosen_u", &self.chosen_u)?;
        }
        Ok(())
    }

    /// Reads a checkpoint written by [`Reservoir::export_to`] into `self`,
    /// replacing its entire state. Reallocates the retained arrays only if
    /// `capacity` read back differs from the reservoir's current capacity.
    ///
    /// # Panics
    ///
    /// Panics unless `self.is_empty()`.
    pub fn import_from<S: crate::checkpoint::BlobStore>(
        &mut self,
        store: &S,
    ) -> Result<(), crate::StoreError> {
        assert!(
            self.is_empty(),
            "import_from requires an empty reservoir (never ingested, never cleared-from-live)"
        );

        let alpha = store.read_f64("alpha")?;
        let capacity = store.read_u64("capacity")?;
        if capacity == 0 {
            return Err(crate::StoreError::Corrupt { field: "capacity" });
        }
        let size = store.read_u64("current_size")?;
        let grand_total = store.read_u64("grand_total")?;
        let ref_l = store.read_u64("ref_L")?;
        let chosen_times = store.read_u64_array("chosen_times", capacity as usize)?;
        let chosen_u = store.read_f64_array("chosen_u", capacity as usize)?;

        self.alpha = alpha;
        self.capacity = capacity;
        self.size = size;
        self.grand_total = grand_total;
        self.ref_l = ref_l;
        self.chosen_times = chosen_times;
        self.chosen_u = chosen_u;
        self.diff = DiffRecord::None;
        Ok(())
    }

    /// Like [`Reservoir::export_to`], but writes through a named subgroup of
    /// `store` rather than `store`'s own top level. The sentinel name `"."`
    /// means "use `store` directly", matching [`Reservoir::export_to`].
    pub fn export_to_group(
        &self,
        store: &mut crate::checkpoint::FileBlobStore,
        name: &str,
    ) -> Result<(), crate::StoreError> {
        let mut group = store.create_group(name)?;
        self.export_to(&mut group)
    }

    /// Like [`Reservoir::import_from`], but reads through a named subgroup
    /// of `store`. The sentinel name `"."` means "use `store` directly".
    pub fn import_from_group(
        &mut self,
        store: &crate::checkpoint::FileBlobStore,
        name: &str,
    ) -> Result<(), crate::StoreError> {
        let group = store.open_group(name)?;
        self.import_from(&group)
    }

    /// Convenience over [`Reservoir::export_to_group`] that opens (creating
    /// if needed) a standalone file at `path` first.
    pub fn export_to_file(
        &self,
        path: impl AsRef<std::path::Path>,
        name: &str,
    ) -> Result<(), crate::StoreError> {
        let mut store = crate::checkpoint::FileBlobStore::new();
        let mut group = store.create_group(name)?;
        self.export_to(&mut group)?;
        store.write_to_file(path)
    }

    /// Convenience over [`Reservoir::import_from_group`] that opens an
    /// existing standalone file at `path` first.
    pub fn import_from_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
        name: &str,
    ) -> Result<(), crate::StoreError> {
        let store = crate::checkpoint::FileBlobStore::read_from_file(path)?;
        self.import_from_group(&store, name)
    }
}
