//! Vector index abstraction and the exact flat L2 index.
//!
//! `index.vec` layout (little-endian):
//!
//! | field   | type          |
//! |---------|---------------|
//! | magic   | `b"FVEC"`     |
//! | version | `u32`         |
//! | dim     | `u32`         |
//! | count   | `u64`         |
//! | data    | `count * dim` `f32` |

use forge_core::{AppError, AppResult};
use std::fs;
use std::io::Write;
use std::path::Path;

const MAGIC: &[u8; 4] = b"FVEC";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Trait for vector index backends.
///
/// Vectors are addressed by insertion position.
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored vector has.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector and return its position.
    fn add(&mut self, vector: &[f32]) -> AppResult<usize>;

    /// Up to `k` positions closest to `query`, nearest first.
    ///
    /// Returns `(position, squared L2 distance)` pairs.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>>;

    /// Drop every vector at or after `len`.
    fn truncate(&mut self, len: usize);

    /// Remove all vectors, keeping the dimension.
    fn reset(&mut self);
}

/// Exact nearest-neighbor index over a contiguous `f32` buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Serialize to the `index.vec` byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Parse the `index.vec` byte layout.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(AppError::CorruptIndex(format!(
                "index file is {} bytes, shorter than its header",
                bytes.len()
            )));
        }

        if &bytes[0..4] != MAGIC {
            return Err(AppError::CorruptIndex("index file has a bad magic number".to_string()));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(AppError::CorruptIndex(format!(
                "unsupported index format version {}",
                version
            )));
        }

        let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&bytes[12..20]);
        let count = u64::from_le_bytes(count_bytes) as usize;

        let body = &bytes[HEADER_LEN..];
        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| AppError::CorruptIndex("index header overflows".to_string()))?;
        if body.len() != expected {
            return Err(AppError::CorruptIndex(format!(
                "index header declares {} vectors of dimension {} but body has {} bytes",
                count,
                dimension,
                body.len()
            )));
        }

        let data = body
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self { dimension, data })
    }

    /// Read an index file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read index {:?}: {}", path, e))
        })?;
        let index = Self::from_bytes(&bytes)?;
        tracing::debug!(
            "Loaded {} vectors of dimension {} from {:?}",
            index.len(),
            index.dimension,
            path
        );
        Ok(index)
    }

    /// Write the index through a temp file and rename it into place.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let tmp_path = path.with_extension("vec.tmp");

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&self.to_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            AppError::Knowledge(format!("Failed to write index {:?}: {}", path, e))
        })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    fn add(&mut self, vector: &[f32]) -> AppResult<usize> {
        if vector.len() != self.dimension {
            return Err(AppError::Knowledge(format!(
                "Vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(AppError::Knowledge(format!(
                "Query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension.max(1))
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();

        // NaN distances sort last; ties keep the lower position first.
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or_else(|| a.1.is_nan().cmp(&b.1.is_nan()))
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k.min(self.len()));

        Ok(scored)
    }

    fn truncate(&mut self, len: usize) {
        self.data.truncate(len.saturating_mul(self.dimension));
    }

    fn reset(&mut self) {
        self.data.clear();
    }
}
