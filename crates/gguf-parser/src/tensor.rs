//! Read-only access to tensor bytes and bounded dequantization previews.

use crate::error::{GGUFError, Result};
use crate::ggml::GGMLType;
use crate::model::{GGUFModel, TensorDescriptor};

/// Preview length used when the caller does not choose one.
pub const DEFAULT_PREVIEW_ELEMENTS: usize = 32;

/// A tensor's descriptor together with its bytes in the source.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    descriptor: &'a TensorDescriptor,
    data: &'a [u8],
}

/// Resolve `name` in `model` to its bytes within `bytes`.
pub fn view<'a>(model: &'a GGUFModel, bytes: &'a [u8], name: &str) -> Result<TensorView<'a>> {
    let descriptor = model
        .tensor(name)
        .ok_or_else(|| GGUFError::NotFound(name.to_string()))?;
    let range = descriptor.byte_range().ok_or_else(|| {
        GGUFError::Malformed(format!(
            "tensor '{name}' ({}) has no computable byte range",
            descriptor.type_name()
        ))
    })?;
    let data = usize::try_from(range.start)
        .ok()
        .zip(usize::try_from(range.end).ok())
        .and_then(|(start, end)| bytes.get(start..end))
        .ok_or_else(|| {
            GGUFError::Malformed(format!(
                "tensor '{name}' bytes {}..{} lie outside the file ({} bytes)",
                range.start,
                range.end,
                bytes.len()
            ))
        })?;
    Ok(TensorView { descriptor, data })
}

impl<'a> TensorView<'a> {
    pub fn descriptor(&self) -> &'a TensorDescriptor {
        self.descriptor
    }

    /// Raw tensor bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn ggml_type(&self) -> Option<GGMLType> {
        self.descriptor.ggml_type
    }

    /// At most `max_bytes` leading bytes.
    pub fn raw_prefix(&self, max_bytes: usize) -> &'a [u8] {
        self.data.get(..max_bytes).unwrap_or(self.data)
    }

    /// Whether [`preview`](Self::preview) can decode this element type.
    pub fn can_preview(&self) -> bool {
        self.descriptor.traits().is_some_and(|t| t.preview.is_some())
    }

    /// Approximate values of the first `max_elements` elements.
    ///
    /// Only the blocks covering the prefix are decoded.
    pub fn preview(&self, max_elements: usize) -> Result<Vec<f32>> {
        let traits = self.descriptor.traits().ok_or_else(|| {
            GGUFError::Malformed(format!(
                "element type id {} is not recognised",
                self.descriptor.type_id
            ))
        })?;
        let decode = traits.preview.ok_or_else(|| {
            GGUFError::Malformed(format!("no preview decoder for {}", traits.name))
        })?;

        let total = self.descriptor.element_count().unwrap_or(0);
        let wanted = usize::try_from(total).map_or(max_elements, |t| t.min(max_elements));
        let block_size = traits.block_size as usize;
        let type_size = traits.type_size as usize;
        let blocks = wanted.div_ceil(block_size);

        let mut out = Vec::with_capacity(blocks.saturating_mul(block_size));
        for block in self.data.chunks_exact(type_size).take(blocks) {
            decode(block, &mut out)?;
        }
        out.truncate(wanted);
        Ok(out)
    }

    /// Exact values of the first `max_elements` elements of an integer tensor.
    ///
    /// `None` for non-integer element types.
    pub fn integer_preview(&self, max_elements: usize) -> Option<Vec<i64>> {
        let ty = self.ggml_type().filter(|t| t.is_integer())?;
        let width = ty.traits()?.type_size as usize;
        let values = self
            .data
            .chunks_exact(width)
            .take(max_elements)
            .map(|chunk| match ty {
                GGMLType::I8 => chunk.first().map_or(0, |b| i64::from(*b as i8)),
                GGMLType::I16 => {
                    let mut buf = [0u8; 2];
                    buf.copy_from_slice(chunk);
                    i64::from(i16::from_le_bytes(buf))
                }
                GGMLType::I32 => {
                    let mut buf = [0u8; 4];
                    buf.copy_from_slice(chunk);
                    i64::from(i32::from_le_bytes(buf))
                }
                _ => {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(chunk);
                    i64::from_le_bytes(buf)
                }
            })
            .collect();
        Some(values)
    }
}
