use thiserror::Error;

/// Errors surfaced by the checkpoint blob store.
///
/// Precondition violations on the in-memory [`crate::Reservoir`] (negative
/// `alpha`, zero capacity, `n_provided == 0`, `grand_total` overflow,
/// importing into a non-empty reservoir) are caller bugs and panic directly
/// rather than producing a value of this type — see the error handling
/// design in `DESIGN.md`. `StoreError` is reserved for the checkpoint I/O
/// boundary, where failures are the environment's fault, not the caller's.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying file or stream failed.
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A required dataset was absent from the checkpoint.
    #[error("checkpoint is missing dataset `{name}`")]
    MissingDataset {
        /// Fully-qualified dataset path, e.g. `"replay/chosen_times"`.
        name: String,
    },

    /// A dataset was present but had the wrong length for its declared type.
    #[error("dataset `{name}` has {actual} bytes, expected {expected}")]
    LengthMismatch {
        /// Fully-qualified dataset path.
        name: String,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// A scalar field read back a value that can never be valid, e.g.
    /// `capacity == 0`.
    #[error("checkpoint is corrupted: field `{field}` has an invalid value")]
    Corrupt {
        /// Name of the offending field.
        field: &'static str,
    },
}
