//! Weighted reservoir sampling over an unbounded arrival stream.
//!
//! A [`Reservoir`] holds up to `capacity` items drawn from a stream of
//! arrivals, biasing retention toward recent arrivals by an exponent
//! `alpha` (`alpha == 0.0` recovers classical uniform reservoir sampling).
//! Items are presented in batches through one of two ingestion modes:
//!
//! - [`Reservoir::keep_n_append`]: survivors keep their slot position;
//!   admitted newcomers are appended after the kept block.
//! - [`Reservoir::remove_n_inject`]: survivors keep their slot position
//!   *unchanged*; admitted newcomers fill evicted slots in place, with any
//!   surplus appended past the old tail.
//!
//! Both modes record a [`DiffRecord`] describing what changed, retrievable
//! through [`Reservoir::kept`]/[`Reservoir::appended`] or
//! [`Reservoir::removed`]/[`Reservoir::injected`].
//!
//! # Example
//!
//! ```
//! use wrsample::{Reservoir, ReservoirConfig, DefaultRng};
//!
//! let config = ReservoirConfig::new(4, 1.0);
//! let mut reservoir = Reservoir::new(config, Box::new(DefaultRng::new(42)));
//!
//! reservoir.keep_n_append(10);
//! assert_eq!(reservoir.size(), 4);
//! assert_eq!(reservoir.grand_total(), 10);
//! ```
//!
//! With the default `checkpoint` feature, a reservoir's state round-trips
//! through a byte-stable file format:
//!
//! ```
//! # #[cfg(feature = "checkpoint")]
//! # {
//! use wrsample::{Reservoir, ReservoirConfig, DefaultRng};
//! use tempfile::tempdir;
//!
//! let mut reservoir = Reservoir::new(ReservoirConfig::new(4, 1.0), Box::new(DefaultRng::new(1)));
//! reservoir.keep_n_append(10);
//!
//! let dir = tempdir().unwrap();
//! let path = dir.path().join("checkpoint.bin");
//! reservoir.export_to_file(&path, ".").unwrap();
//!
//! let mut restored = Reservoir::pending_import(Box::new(DefaultRng::new(0)));
//! restored.import_from_file(&path, ".").unwrap();
//! assert_eq!(restored.current(), reservoir.current());
//! # }
//! ```

mod config;
mod error;
mod invariants;
mod kernel;
mod reservoir;
mod rng;

#[cfg(feature = "checkpoint")]
mod checkpoint;

pub use config::ReservoirConfig;
pub use error::StoreError;
pub use reservoir::{DiffRecord, Reservoir};
pub use rng::{DefaultRng, UniformSource};

#[cfg(feature = "checkpoint")]
pub use checkpoint::{BlobStore, FileBlobStore};
