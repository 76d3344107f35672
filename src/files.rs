// SPDX-License-Identifier: MIT
//! Supplementary files referenced by File elements
//!
//! Bytes are stored once per distinct content hash; names map onto
//! `(hash, content type)` pairs. Re-adding the same content under a name is
//! a no-op, different content under a taken name is stored under a derived
//! name (`/a.pdf` becomes `/a_0001.pdf`, then `/a_0002.pdf`, ...).

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use thiserror::Error;
use tracing::debug;

use crate::hash::ContentHash;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Supplementary file not found: {0}")]
    NotFound(String),
}

/// Storage for supplementary files while they travel between packages
pub trait SupplementaryFileStore {
    /// Store `contents` under `name` and return the name actually used
    fn add_file(
        &mut self,
        name: &str,
        contents: &mut dyn Read,
        content_type: &str,
    ) -> Result<String, FileStoreError>;

    fn content_type(&self, name: &str) -> Result<&str, FileStoreError>;

    fn hash(&self, name: &str) -> Result<&ContentHash, FileStoreError>;

    /// Copy the stored bytes of `name` into `sink`
    fn write_contents(&self, name: &str, sink: &mut dyn Write) -> Result<(), FileStoreError>;

    fn contains(&self, name: &str) -> bool;

    /// Stored names in ascending order
    fn names(&self) -> Vec<String>;

    fn len(&self) -> usize {
        self.names().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    hash: ContentHash,
    content_type: String,
}

/// [`SupplementaryFileStore`] that keeps everything in memory
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    blobs: HashMap<ContentHash, Vec<u8>>,
    names: BTreeMap<String, Entry>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for callers holding the bytes already
    pub fn add_bytes(
        &mut self,
        name: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, FileStoreError> {
        let mut reader = data;
        self.add_file(name, &mut reader, content_type)
    }

    /// Stored bytes of `name`
    pub fn get(&self, name: &str) -> Result<&[u8], FileStoreError> {
        let entry = self.entry(name)?;
        self.blobs
            .get(&entry.hash)
            .map(Vec::as_slice)
            .ok_or_else(|| FileStoreError::NotFound(name.to_string()))
    }

    fn entry(&self, name: &str) -> Result<&Entry, FileStoreError> {
        self.names
            .get(name)
            .ok_or_else(|| FileStoreError::NotFound(name.to_string()))
    }
}

impl SupplementaryFileStore for InMemoryFileStore {
    fn add_file(
        &mut self,
        name: &str,
        contents: &mut dyn Read,
        content_type: &str,
    ) -> Result<String, FileStoreError> {
        let mut data = Vec::new();
        contents.read_to_end(&mut data)?;
        let entry = Entry {
            hash: ContentHash::of(&data),
            content_type: content_type.to_string(),
        };

        let mut candidate = name.to_string();
        let mut counter = 1;
        loop {
            match self.names.get(&candidate) {
                None => break,
                Some(existing) if *existing == entry => {
                    debug!(name = %candidate, "supplementary file already stored");
                    return Ok(candidate);
                }
                Some(_) => {
                    candidate = append_counter(name, counter);
                    counter += 1;
                }
            }
        }

        debug!(
            name = %candidate,
            hash = %entry.hash,
            size = data.len(),
            "storing supplementary file"
        );
        self.blobs.entry(entry.hash.clone()).or_insert(data);
        self.names.insert(candidate.clone(), entry);
        Ok(candidate)
    }

    fn content_type(&self, name: &str) -> Result<&str, FileStoreError> {
        Ok(&self.entry(name)?.content_type)
    }

    fn hash(&self, name: &str) -> Result<&ContentHash, FileStoreError> {
        Ok(&self.entry(name)?.hash)
    }

    fn write_contents(&self, name: &str, sink: &mut dyn Write) -> Result<(), FileStoreError> {
        sink.write_all(self.get(name)?)?;
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    fn names(&self) -> Vec<String> {
        self.names.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

/// Insert `_NNNN` before the extension of the last path segment
fn append_counter(name: &str, counter: u32) -> String {
    let segment_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[segment_start..].rfind('.') {
        Some(dot) => {
            let (stem, extension) = name.split_at(segment_start + dot);
            format!("{}_{:04}{}", stem, counter, extension)
        }
        None => format!("{}_{:04}", name, counter),
    }
}
