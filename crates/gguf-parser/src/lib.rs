//! Pure-Rust GGUF file parser, validator and inspector.
//!
//! The pipeline is single-threaded and synchronous:
//!
//! * **parse**: one forward pass over the header, metadata and tensor-info
//!   table, for format versions 1 through 3;
//! * **validate**: structural checks reported as findings, never errors;
//! * **access**: typed read-only views of tensor bytes with bounded
//!   dequantization previews;
//! * **checksum**: a base-3 digest of the structural section.
//!
//! Integers can be rendered in balanced ternary via [`ternary`].

pub mod bench;
pub mod checksum;
pub mod dequant;
pub mod error;
pub mod file;
pub mod ggml;
pub mod model;
pub mod parser;
pub mod reader;
pub mod summary;
pub mod tensor;
pub mod ternary;
pub mod types;
pub mod validate;

#[cfg(test)]
mod test_factory;

pub use bench::{BenchColumns, REQUIRED_COLUMNS};
pub use checksum::{DIGEST_WIDTH, TernaryDigest};
pub use error::{GGUFError, Result};
pub use file::GGUFFile;
pub use ggml::{GGMLType, TypeTraits, type_traits};
pub use model::{GGUFModel, TensorDescriptor};
pub use parser::{WireFormat, parse};
pub use reader::{ByteReader, LenWidth};
pub use summary::{Rendered, Summary};
pub use tensor::{DEFAULT_PREVIEW_ELEMENTS, TensorView};
pub use ternary::{
    ParseTernaryError, format_balanced_ternary, format_balanced_ternary_u64, format_base3,
    parse_balanced_ternary,
};
pub use types::{
    GGUF_MAGIC, GGUFHeader, GGUFMetadataKV, GGUFValue, GGUFValueType, file_type_name,
};
pub use validate::{Finding, FindingKind, Location, Severity, ValidationReport, validate};
