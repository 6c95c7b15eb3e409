//! Tensor element types and their block geometry.
//!
//! Geometry and preview decoders come from a single static table keyed by
//! the on-disk type id. Supporting a new kind means adding a row.

use serde::{Deserialize, Serialize};

use crate::dequant;
use crate::error::Result;

/// Decode one block, appending `block_size` values.
pub type PreviewFn = fn(&[u8], &mut Vec<f32>) -> Result<()>;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum GGMLType {
    F32 = 0,
    F16 = 1,
    Q4_0 = 2,
    Q4_1 = 3,
    Q5_0 = 6,
    Q5_1 = 7,
    Q8_0 = 8,
    Q8_1 = 9,
    Q2_K = 10,
    Q3_K = 11,
    Q4_K = 12,
    Q5_K = 13,
    Q6_K = 14,
    Q8_K = 15,
    IQ2_XXS = 16,
    IQ2_XS = 17,
    IQ3_XXS = 18,
    IQ1_S = 19,
    IQ4_NL = 20,
    IQ3_S = 21,
    IQ2_S = 22,
    IQ4_XS = 23,
    I8 = 24,
    I16 = 25,
    I32 = 26,
    I64 = 27,
    F64 = 28,
    IQ1_M = 29,
    BF16 = 30,
    TQ1_0 = 34,
    TQ2_0 = 35,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeTraits {
    pub ty: GGMLType,
    pub name: &'static str,
    /// Elements per block.
    pub block_size: u64,
    /// Bytes per block.
    pub type_size: u64,
    pub preview: Option<PreviewFn>,
}

impl TypeTraits {
    pub fn is_quantized(&self) -> bool {
        self.block_size > 1
    }

    /// Bytes needed for `elements` values, rounding up to whole blocks.
    pub fn byte_len(&self, elements: u64) -> Option<u64> {
        elements
            .div_ceil(self.block_size)
            .checked_mul(self.type_size)
    }
}

const fn row(
    ty: GGMLType,
    name: &'static str,
    block_size: u64,
    type_size: u64,
    preview: Option<PreviewFn>,
) -> TypeTraits {
    TypeTraits {
        ty,
        name,
        block_size,
        type_size,
        preview,
    }
}

pub static TYPE_TABLE: [TypeTraits; 31] = [
    row(GGMLType::F32, "F32", 1, 4, Some(dequant::f32_block)),
    row(GGMLType::F16, "F16", 1, 2, Some(dequant::f16_block)),
    row(GGMLType::Q4_0, "Q4_0", 32, 18, Some(dequant::q4_0_block)),
    row(GGMLType::Q4_1, "Q4_1", 32, 20, Some(dequant::q4_1_block)),
    row(GGMLType::Q5_0, "Q5_0", 32, 22, Some(dequant::q5_0_block)),
    row(GGMLType::Q5_1, "Q5_1", 32, 24, Some(dequant::q5_1_block)),
    row(GGMLType::Q8_0, "Q8_0", 32, 34, Some(dequant::q8_0_block)),
    row(GGMLType::Q8_1, "Q8_1", 32, 36, Some(dequant::q8_1_block)),
    row(GGMLType::Q2_K, "Q2_K", 256, 84, None),
    row(GGMLType::Q3_K, "Q3_K", 256, 110, None),
    row(GGMLType::Q4_K, "Q4_K", 256, 144, None),
    row(GGMLType::Q5_K, "Q5_K", 256, 176, None),
    row(GGMLType::Q6_K, "Q6_K", 256, 210, None),
    row(GGMLType::Q8_K, "Q8_K", 256, 292, None),
    row(GGMLType::IQ2_XXS, "IQ2_XXS", 256, 66, None),
    row(GGMLType::IQ2_XS, "IQ2_XS", 256, 74, None),
    row(GGMLType::IQ3_XXS, "IQ3_XXS", 256, 98, None),
    row(GGMLType::IQ1_S, "IQ1_S", 256, 50, None),
    row(GGMLType::IQ4_NL, "IQ4_NL", 32, 18, None),
    row(GGMLType::IQ3_S, "IQ3_S", 256, 110, None),
    row(GGMLType::IQ2_S, "IQ2_S", 256, 82, None),
    row(GGMLType::IQ4_XS, "IQ4_XS", 256, 136, None),
    row(GGMLType::I8, "I8", 1, 1, Some(dequant::i8_block)),
    row(GGMLType::I16, "I16", 1, 2, Some(dequant::i16_block)),
    row(GGMLType::I32, "I32", 1, 4, Some(dequant::i32_block)),
    row(GGMLType::I64, "I64", 1, 8, Some(dequant::i64_block)),
    row(GGMLType::F64, "F64", 1, 8, Some(dequant::f64_block)),
    row(GGMLType::IQ1_M, "IQ1_M", 256, 56, None),
    row(GGMLType::BF16, "BF16", 1, 2, Some(dequant::bf16_block)),
    row(GGMLType::TQ1_0, "TQ1_0", 256, 54, None),
    row(GGMLType::TQ2_0, "TQ2_0", 256, 66, Some(dequant::tq2_0_block)),
];

/// Look up the geometry for an on-disk type id.
pub fn type_traits(id: u32) -> Option<&'static TypeTraits> {
    TYPE_TABLE.iter().find(|t| t.ty as u32 == id)
}

impl GGMLType {
    pub fn from_id(id: u32) -> Option<Self> {
        type_traits(id).map(|t| t.ty)
    }

    pub fn traits(self) -> Option<&'static TypeTraits> {
        type_traits(self as u32)
    }

    pub fn name(self) -> &'static str {
        self.traits().map_or("UNKNOWN", |t| t.name)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }
}
