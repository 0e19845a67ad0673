//! Collection document loading and saving.
//!
//! A collection is held as raw JSON: the inputs are schemaless by design and
//! every merge rule works on field presence, so nothing is validated here.
//! This layer is the only part of the crate that touches the filesystem, and
//! its policy is fail-fast: any read, parse, or write error aborts the whole
//! operation before a merge runs or a partial output is written.

use crate::{merge, prune};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from moving collection documents on and off disk.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One parsed collection document.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    root: Value,
}

impl Collection {
    /// Wrap an already-parsed document.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a collection from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            root: serde_json::from_str(json)?,
        })
    }

    /// Load a collection from a file (supports both plain JSON and gzip).
    pub fn from_file(path: &Path) -> Result<Self, CollectionError> {
        let file = File::open(path).map_err(|source| CollectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        // Check for gzip magic bytes
        let mut magic = [0u8; 2];
        reader
            .read_exact(&mut magic)
            .map_err(|source| CollectionError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        // Reset to start
        drop(reader);
        let file = File::open(path).map_err(|source| CollectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let root = if magic == [0x1f, 0x8b] {
            serde_json::from_reader(GzDecoder::new(reader))
        } else {
            serde_json::from_reader(reader)
        }
        .map_err(|source| CollectionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { root })
    }

    /// Serialize to JSON with 4-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        self.root.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the document to a file, creating intermediate directories.
    pub fn write_to_file(&self, path: &Path, gzip: bool) -> Result<(), CollectionError> {
        let write_err = |source| CollectionError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let json = self.to_json_pretty().map_err(|source| CollectionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let file = File::create(path).map_err(write_err)?;
        if gzip {
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(json.as_bytes()).map_err(write_err)?;
            encoder.finish().map_err(write_err)?;
        } else {
            let mut writer = BufWriter::new(file);
            writer.write_all(json.as_bytes()).map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }

        Ok(())
    }

    /// Merge another document's edits into this collection.
    ///
    /// `self` is the original copy (authoritative for IDs and bookkeeping),
    /// `modified` the edited copy (authoritative for request content and new
    /// items). Neither input is touched.
    pub fn merged_with(&self, modified: &Collection) -> Collection {
        Collection {
            root: merge::merge_collections(&self.root, &modified.root),
        }
    }

    /// Drop items the modified document no longer contains.
    pub fn pruned_against(&self, modified: &Collection) -> Collection {
        Collection {
            root: prune::prune_removed(&self.root, &modified.root),
        }
    }

    /// The raw document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume the wrapper, yielding the raw document.
    pub fn into_root(self) -> Value {
        self.root
    }

    /// The document's `_id`, if present.
    pub fn root_id(&self) -> Option<&Value> {
        self.root.get("_id")
    }

    /// The collection's display name, if present.
    pub fn name(&self) -> Option<&str> {
        self.root.get("colName").and_then(Value::as_str)
    }

    /// Number of top-level folders.
    pub fn folder_count(&self) -> usize {
        self.root
            .get("folders")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Number of top-level requests.
    pub fn request_count(&self) -> usize {
        self.root
            .get("requests")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}
