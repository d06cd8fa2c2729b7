//! The persistent checkpoint format: a hierarchical key/value blob store
//! holding the seven named datasets of a reservoir's state, plus a
//! byte-stable file-backed implementation of it.
//!
//! The source persists through HDF5 — an external collaborator this crate
//! doesn't depend on (see `DESIGN.md`). What the core actually needs is
//! "a key/value blob store" keyed by dataset name, with a group/subgroup
//! notion for namespacing multiple reservoirs in one file. [`FileBlobStore`]
//! provides that directly: a flat, sorted table of `path -> bytes`, framed
//! with explicit little-endian encoding so that export -> import -> export
//! reproduces the same file byte-for-byte.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use std::rc::Rc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::StoreError;

/// One location in a hierarchical key/value blob store: either the top
/// level of a store, or a named subgroup within one.
pub trait BlobStore {
    /// Writes a scalar `u64` dataset.
    fn write_u64(&mut self, name: &str, value: u64) -> Result<(), StoreError>;
    /// Writes a scalar `f64` dataset.
    fn write_f64(&mut self, name: &str, value: f64) -> Result<(), StoreError>;
    /// Writes a `u64` array dataset.
    fn write_u64_array(&mut self, name: &str, values: &[u64]) -> Result<(), StoreError>;
    /// Writes an `f64` array dataset.
    fn write_f64_array(&mut self, name: &str, values: &[f64]) -> Result<(), StoreError>;

    /// Reads a scalar `u64` dataset.
    fn read_u64(&self, name: &str) -> Result<u64, StoreError>;
    /// Reads a scalar `f64` dataset.
    fn read_f64(&self, name: &str) -> Result<f64, StoreError>;
    /// Reads a `u64` array dataset of exactly `len` elements.
    fn read_u64_array(&self, name: &str, len: usize) -> Result<Vec<u64>, StoreError>;
    /// Reads an `f64` array dataset of exactly `len` elements.
    fn read_f64_array(&self, name: &str, len: usize) -> Result<Vec<f64>, StoreError>;
}

/// A file-backed [`BlobStore`]. Cloning shares the same underlying table —
/// `create_group`/`open_group` hand back a clone with a longer path prefix,
/// the same way an HDF5 group id is itself a location you can keep opening
/// subgroups within.
#[derive(Clone)]
pub struct FileBlobStore {
    entries: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
    prefix: String,
}

impl Default for FileBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileBlobStore {
    /// An empty, in-memory store rooted at the top level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(BTreeMap::new())),
            prefix: String::new(),
        }
    }

    fn full_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    /// Creates (or, for the sentinel name `"."`, reuses) a named subgroup.
    pub fn create_group(&mut self, name: &str) -> Result<Self, StoreError> {
        if name == "." {
            return Ok(self.clone());
        }
        Ok(Self {
            entries: Rc::clone(&self.entries),
            prefix: self.full_name(name),
        })
    }

    /// Opens a named subgroup that must already contain at least one
    /// dataset. The sentinel name `"."` means "use this location directly".
    pub fn open_group(&self, name: &str) -> Result<Self, StoreError> {
        if name == "." {
            return Ok(self.clone());
        }
        let prefix = self.full_name(name);
        let needle = format!("{prefix}/");
        let exists = self.entries.borrow().keys().any(|k| k.starts_with(&needle));
        if !exists {
            return Err(StoreError::MissingDataset { name: prefix });
        }
        Ok(Self {
            entries: Rc::clone(&self.entries),
            prefix,
        })
    }

    /// Flushes this store's entries to `path`, sorted by dataset path so
    /// the result depends only on content, not on write order.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let mut file = std::fs::File::create(path)?;
        for (name, bytes) in self.entries.borrow().iter() {
            file.write_u32::<LittleEndian>(name.len() as u32)?;
            file.write_all(name.as_bytes())?;
            file.write_u64::<LittleEndian>(bytes.len() as u64)?;
            file.write_all(bytes)?;
        }
        Ok(())
    }

    /// Opens a standalone file written by [`FileBlobStore::write_to_file`].
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut file = std::fs::File::open(path)?;
        let mut entries = BTreeMap::new();
        loop {
            let name_len = match file.read_u32::<LittleEndian>() {
                Ok(v) => v,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            let mut name_buf = vec![0u8; name_len as usize];
            file.read_exact(&mut name_buf)?;
            let name = String::from_utf8(name_buf)
                .map_err(|_| StoreError::Corrupt { field: "dataset name" })?;
            let payload_len = file.read_u64::<LittleEndian>()?;
            let mut payload = vec![0u8; payload_len as usize];
            file.read_exact(&mut payload)?;
            entries.insert(name, payload);
        }
        Ok(Self {
            entries: Rc::new(RefCell::new(entries)),
            prefix: String::new(),
        })
    }
}

impl BlobStore for FileBlobStore {
    fn write_u64(&mut self, name: &str, value: u64) -> Result<(), StoreError> {
        let mut buf = Vec::with_capacity(8);
        buf.write_u64::<LittleEndian>(value)?;
        self.entries.borrow_mut().insert(self.full_name(name), buf);
        Ok(())
    }

    fn write_f64(&mut self, name: &str, value: f64) -> Result<(), StoreError> {
        let mut buf = Vec::with_capacity(8);
        buf.write_f64::<LittleEndian>(value)?;
        self.entries.borrow_mut().insert(self.full_name(name), buf);
        Ok(())
    }

    fn write_u64_array(&mut self, name: &str, values: &[u64]) -> Result<(), StoreError> {
        let mut buf = Vec::with_capacity(values.len() * 8);
        for v in values {
            buf.write_u64::<LittleEndian>(*v)?;
        }
        self.entries.borrow_mut().insert(self.full_name(name), buf);
        Ok(())
    }

    fn write_f64_array(&mut self, name: &str, values: &[f64]) -> Result<(), StoreError> {
        let mut buf = Vec::with_capacity(values.len() * 8);
        for v in values {
            buf.write_f64::<LittleEndian>(*v)?;
        }
        self.entries.borrow_mut().insert(self.full_name(name), buf);
        Ok(())
    }

    fn read_u64(&self, name: &str) -> Result<u64, StoreError> {
        let full = self.full_name(name);
        let entries = self.entries.borrow();
        let bytes = entries
            .get(&full)
            .ok_or_else(|| StoreError::MissingDataset { name: full.clone() })?;
        if bytes.len() != 8 {
            return Err(StoreError::LengthMismatch { name: full, expected: 8, actual: bytes.len() });
        }
        Ok((&bytes[..]).read_u64::<LittleEndian>()?)
    }

    fn read_f64(&self, name: &str) -> Result<f64, StoreError> {
        let full = self.full_name(name);
        let entries = self.entries.borrow();
        let bytes = entries
            .get(&full)
            .ok_or_else(|| StoreError::MissingDataset { name: full.clone() })?;
        if bytes.len() != 8 {
            return Err(StoreError::LengthMismatch { name: full, expected: 8, actual: bytes.len() });
        }
        Ok((&bytes[..]).read_f64::<LittleEndian>()?)
    }

    fn read_u64_array(&self, name: &str, len: usize) -> Result<Vec<u64>, StoreError> {
        let full = self.full_name(name);
        let entries = self.entries.borrow();
        let bytes = entries
            .get(&full)
            .ok_or_else(|| StoreError::MissingDataset { name: full.clone() })?;
        let expected = len * 8;
        if bytes.len() != expected {
            return Err(StoreError::LengthMismatch { name: full, expected, actual: bytes.len() });
        }
        let mut cursor = &bytes[..];
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(cursor.read_u64::<LittleEndian>()?);
        }
        Ok(out)
    }

    fn read_f64_array(&self, name: &str, len: usize) -> Result<Vec<f64>, StoreError> {
        let full = self.full_name(name);
        let entries = self.entries.borrow();
        let bytes = entries
            .get(&full)
            .ok_or_else(|| StoreError::MissingDataset { name: full.clone() })?;
        let expected = len * 8;
        if bytes.len() != expected {
            return Err(StoreError::LengthMismatch { name: full, expected, actual: bytes.len() });
        }
        let mut cursor = &bytes[..];
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(cursor.read_f64::<LittleEndian>()?);
        }
        Ok(out)
    }
}
