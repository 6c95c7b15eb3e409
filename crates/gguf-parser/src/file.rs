//! A parsed GGUF file bound to its byte source.

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::checksum::{TernaryDigest, structural_digest};
use crate::error::Result;
use crate::model::GGUFModel;
use crate::parser;
use crate::tensor::{self, TensorView};
use crate::validate::{self, ValidationReport};

enum ByteSource {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for ByteSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(m) => m,
            Self::Owned(v) => v,
        }
    }
}

/// Owns the byte source (mapping or buffer) and the model parsed from it.
/// The mapping is released when this value is dropped.
pub struct GGUFFile {
    path: Option<PathBuf>,
    source: ByteSource,
    model: GGUFModel,
}

impl GGUFFile {
    /// Memory-map and parse `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let source = if len == 0 {
            ByteSource::Owned(Vec::new())
        } else {
            // SAFETY: the mapping is read-only and owned by the returned value;
            // the file must not be truncated by another process while mapped.
            ByteSource::Mapped(unsafe { Mmap::map(&file)? })
        };
        let model = parser::parse(&source)?;
        debug!(
            path = %path.display(),
            file_size = len,
            tensors = model.tensors.len(),
            "opened GGUF file"
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            source,
            model,
        })
    }

    /// Parse an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let model = parser::parse(&bytes)?;
        Ok(Self {
            path: None,
            source: ByteSource::Owned(bytes),
            model,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn model(&self) -> &GGUFModel {
        &self.model
    }

    pub fn bytes(&self) -> &[u8] {
        &self.source
    }

    pub fn validate(&self) -> ValidationReport {
        validate::validate(&self.model)
    }

    /// Look up a tensor by name. Fails with `NotFound` on a miss.
    pub fn tensor(&self, name: &str) -> Result<TensorView<'_>> {
        tensor::view(&self.model, &self.source, name)
    }

    /// Base-3 checksum of the structural section.
    pub fn checksum(&self) -> TernaryDigest {
        structural_digest(&self.model, &self.source)
    }
}
