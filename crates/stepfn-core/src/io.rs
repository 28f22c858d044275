//! Serialization helpers for function snapshots.
//!
//! A [`Sample`] is the portable, serde-plain form of one point. JSON and
//! CBOR read/write utilities with extension-based auto-detection: unknown
//! or missing extensions are rejected for reads and default to JSON for
//! writes.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::maxima::FunctionMaxima;
use crate::point::Point;

/// Plain `(argument, value)` record: the snapshot form of a [`Point`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sample<A, V> {
    /// Argument (domain) component.
    pub arg: A,
    /// Value (range) component.
    pub value: V,
}

impl<A: Clone, V: Clone> Sample<A, V> {
    /// Snapshot a shared point into a plain record.
    #[must_use]
    pub fn from_point(point: &Point<A, V>) -> Self {
        Self {
            arg: point.arg().clone(),
            value: point.value().clone(),
        }
    }
}

impl<A: Ord + Clone, V: Ord + Clone> FunctionMaxima<A, V> {
    /// Snapshot the function view (ascending argument) as plain samples.
    #[must_use]
    pub fn to_samples(&self) -> Vec<Sample<A, V>> {
        self.iter().map(Sample::from_point).collect()
    }

    /// Snapshot the maxima view (descending value, ascending argument on
    /// ties) as plain samples.
    #[must_use]
    pub fn maxima_samples(&self) -> Vec<Sample<A, V>> {
        self.maxima().map(Sample::from_point).collect()
    }
}

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Read `Vec<Sample>` from **JSON**.
pub fn read_samples_json<A, V, P>(path: P) -> Result<Vec<Sample<A, V>>>
where
    A: DeserializeOwned,
    V: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::new(f);
    serde_json::from_reader(rdr).with_context(|| "deserialize JSON samples")
}

/// Write samples to **JSON** (pretty).
pub fn write_samples_json<A, V, P>(path: P, samples: &[Sample<A, V>]) -> Result<()>
where
    A: Serialize,
    V: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = BufWriter::new(f);
    serde_json::to_writer_pretty(w, samples).with_context(|| "serialize JSON samples")
}

/// Read `Vec<Sample>` from **CBOR**.
pub fn read_samples_cbor<A, V, P>(path: P) -> Result<Vec<Sample<A, V>>>
where
    A: DeserializeOwned,
    V: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR samples")
}

/// Write samples to **CBOR**.
pub fn write_samples_cbor<A, V, P>(path: P, samples: &[Sample<A, V>]) -> Result<()>
where
    A: Serialize,
    V: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(samples, &mut w).with_context(|| "serialize CBOR samples")
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_samples_auto<A, V, P>(path: P) -> Result<Vec<Sample<A, V>>>
where
    A: DeserializeOwned,
    V: DeserializeOwned,
    P: AsRef<Path>,
{
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_samples_json(path),
        Some("cbor") => read_samples_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported samples extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_samples_auto<A, V, P>(path: P, samples: &[Sample<A, V>]) -> Result<()>
where
    A: Serialize,
    V: Serialize,
    P: AsRef<Path>,
{
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_samples_cbor(path, samples),
        _ => write_samples_json(path, samples),
    }
}
