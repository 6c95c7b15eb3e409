//! In-memory model of a parsed GGUF file.

use std::ops::Range;

use serde::Serialize;

use crate::ggml::{GGMLType, TypeTraits, type_traits};
use crate::types::{GGUFHeader, GGUFMetadataKV, GGUFValue};

/// One entry of the tensor-info table.
#[derive(Debug, Clone, Serialize)]
pub struct TensorDescriptor {
    pub name: String,
    /// Dimensions in file order (innermost first).
    pub dims: Vec<u64>,
    /// Raw element-type id as stored in the file.
    pub type_id: u32,
    /// `None` when the type id is not in the type table.
    pub ggml_type: Option<GGMLType>,
    /// Offset relative to the start of the data section.
    pub offset: u64,
    /// Absolute file offset, `None` if it overflows.
    pub data_offset: Option<u64>,
    /// Computed size in bytes, `None` for unknown types or on overflow.
    pub byte_len: Option<u64>,
}

impl TensorDescriptor {
    pub fn traits(&self) -> Option<&'static TypeTraits> {
        type_traits(self.type_id)
    }

    pub fn type_name(&self) -> &'static str {
        self.ggml_type.map_or("UNKNOWN", GGMLType::name)
    }

    /// Product of all dimensions; `None` on overflow.
    pub fn element_count(&self) -> Option<u64> {
        self.dims.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))
    }

    /// Absolute byte range of the tensor data.
    pub fn byte_range(&self) -> Option<Range<u64>> {
        let start = self.data_offset?;
        let end = start.checked_add(self.byte_len?)?;
        Some(start..end)
    }

    /// Shape rendered as `4096×32000`.
    pub fn shape(&self) -> String {
        self.dims
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("×")
    }
}

/// Parsed header, metadata and tensor table. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct GGUFModel {
    pub header: GGUFHeader,
    pub metadata: Vec<GGUFMetadataKV>,
    pub tensors: Vec<TensorDescriptor>,
    /// Alignment of the data section.
    pub alignment: u64,
    /// Absolute offset where the data section begins.
    pub data_offset: u64,
    /// End of the tensor-info table; `[0, structural_end)` is the
    /// structural section.
    pub structural_end: u64,
    pub file_size: u64,
}

impl GGUFModel {
    pub fn get(&self, key: &str) -> Option<&GGUFValue> {
        self.metadata
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| &kv.value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(GGUFValue::as_str)
    }

    pub fn architecture(&self) -> Option<&str> {
        self.get_str("general.architecture")
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("general.name")
    }

    /// First tensor with the given name.
    pub fn tensor(&self, name: &str) -> Option<&TensorDescriptor> {
        self.tensors.iter().find(|t| t.name == name)
    }

    /// Sum of element counts over all tensors, saturating.
    pub fn parameter_count(&self) -> u64 {
        self.tensors
            .iter()
            .map(|t| t.element_count().unwrap_or(u64::MAX))
            .fold(0u64, u64::saturating_add)
    }

    /// Sum of computed tensor sizes, saturating; unknown sizes count as zero.
    pub fn tensor_bytes(&self) -> u64 {
        self.tensors
            .iter()
            .filter_map(|t| t.byte_len)
            .fold(0u64, u64::saturating_add)
    }
}
