//! Single-pass structural parser: header, metadata, tensor-info table.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{GGUFError, Result};
use crate::ggml::GGMLType;
use crate::model::{GGUFModel, TensorDescriptor};
use crate::reader::{ByteReader, LenWidth};
use crate::types::*;

/// Arrays nested deeper than this are rejected.
const MAX_ARRAY_DEPTH: usize = 8;

/// Smallest possible metadata entry: 4-byte key length, tag, 1-byte value.
const MIN_KV_SIZE: usize = 9;

/// Smallest possible tensor entry: 4-byte name length, rank, type, offset.
const MIN_TENSOR_INFO_SIZE: usize = 20;

/// Field widths that differ between format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFormat {
    pub count: LenWidth,
    pub string_len: LenWidth,
    pub array_len: LenWidth,
    pub dim: LenWidth,
}

const WIRE_V1: WireFormat = WireFormat {
    count: LenWidth::U32,
    string_len: LenWidth::U32,
    array_len: LenWidth::U32,
    dim: LenWidth::U32,
};

const WIRE_V2: WireFormat = WireFormat {
    count: LenWidth::U64,
    string_len: LenWidth::U64,
    array_len: LenWidth::U64,
    dim: LenWidth::U64,
};

const WIRE_FORMATS: [(u32, WireFormat); 3] = [(1, WIRE_V1), (2, WIRE_V2), (3, WIRE_V2)];

impl WireFormat {
    pub fn for_version(version: u32) -> Option<Self> {
        WIRE_FORMATS
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, wire)| *wire)
    }
}

/// Parse a complete GGUF byte source.
pub fn parse(bytes: &[u8]) -> Result<GGUFModel> {
    let mut r = ByteReader::new(bytes);

    //  Magic
    let magic = r.read_u32()?;
    if magic != GGUF_MAGIC {
        return Err(GGUFError::NotGGUF(magic));
    }

    //  Version
    let version = r.read_u32()?;
    let wire = WireFormat::for_version(version).ok_or(GGUFError::UnsupportedVersion(version))?;

    //  Counts
    let tensor_count = r.read_len(wire.count)?;
    let metadata_kv_count = r.read_len(wire.count)?;
    debug!(version, tensor_count, metadata_kv_count, "parsed GGUF header");

    let header = GGUFHeader {
        magic,
        version,
        tensor_count,
        metadata_kv_count,
    };

    //  Metadata KVs
    let mut metadata = Vec::with_capacity(capacity_hint(
        metadata_kv_count,
        r.remaining(),
        MIN_KV_SIZE,
    ));
    let mut seen = HashSet::new();
    for _ in 0..metadata_kv_count {
        let kv = read_kv(&mut r, wire)?;
        if !seen.insert(kv.key.clone()) {
            return Err(GGUFError::Malformed(format!(
                "duplicate metadata key '{}'",
                kv.key
            )));
        }
        metadata.push(kv);
    }

    let alignment = alignment_of(&metadata)?;

    //  Tensor infos
    let mut tensors = Vec::with_capacity(capacity_hint(
        tensor_count,
        r.remaining(),
        MIN_TENSOR_INFO_SIZE,
    ));
    for _ in 0..tensor_count {
        tensors.push(read_tensor_info(&mut r, wire)?);
    }

    //  Data section
    let structural_end = r.position() as u64;
    let data_offset = align_offset(structural_end, alignment)?;
    for t in &mut tensors {
        t.data_offset = data_offset.checked_add(t.offset);
    }
    debug!(
        tensors = tensors.len(),
        alignment, data_offset, "parsed GGUF tensor table"
    );

    Ok(GGUFModel {
        header,
        metadata,
        tensors,
        alignment,
        data_offset,
        structural_end,
        file_size: bytes.len() as u64,
    })
}

/// Round `pos` up to the next multiple of `alignment`.
pub fn align_offset(pos: u64, alignment: u64) -> Result<u64> {
    if alignment == 0 {
        return Err(GGUFError::Malformed("alignment of zero".into()));
    }
    pos.div_ceil(alignment)
        .checked_mul(alignment)
        .ok_or_else(|| GGUFError::Malformed(format!("data offset {pos} overflows when aligned")))
}

fn alignment_of(metadata: &[GGUFMetadataKV]) -> Result<u64> {
    let Some(kv) = metadata.iter().find(|kv| kv.key == "general.alignment") else {
        return Ok(GGUF_DEFAULT_ALIGNMENT);
    };
    match kv.value.as_u64() {
        Some(a) if a.is_power_of_two() => Ok(a),
        Some(a) => Err(GGUFError::Malformed(format!(
            "general.alignment {a} is not a power of two"
        ))),
        // Non-integer alignment is reported by the validator.
        None => Ok(GGUF_DEFAULT_ALIGNMENT),
    }
}

fn capacity_hint(declared: u64, remaining: usize, min_size: usize) -> usize {
    usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(remaining / min_size)
}

fn read_kv(r: &mut ByteReader<'_>, wire: WireFormat) -> Result<GGUFMetadataKV> {
    let key = r.read_text(wire.string_len)?;
    let vtype = GGUFValueType::try_from(r.read_u32()?)?;
    let value = read_value(r, vtype, wire, 0)?;
    Ok(GGUFMetadataKV {
        key,
        value_type: vtype,
        value,
    })
}

fn read_value(
    r: &mut ByteReader<'_>,
    vtype: GGUFValueType,
    wire: WireFormat,
    depth: usize,
) -> Result<GGUFValue> {
    match vtype {
        GGUFValueType::Uint8 => Ok(GGUFValue::Uint8(r.read_u8()?)),
        GGUFValueType::Int8 => Ok(GGUFValue::Int8(r.read_i8()?)),
        GGUFValueType::Uint16 => Ok(GGUFValue::Uint16(r.read_u16()?)),
        GGUFValueType::Int16 => Ok(GGUFValue::Int16(r.read_i16()?)),
        GGUFValueType::Uint32 => Ok(GGUFValue::Uint32(r.read_u32()?)),
        GGUFValueType::Int32 => Ok(GGUFValue::Int32(r.read_i32()?)),
        GGUFValueType::Float32 => Ok(GGUFValue::Float32(r.read_f32()?)),
        GGUFValueType::Bool => Ok(GGUFValue::Bool(r.read_bool()?)),
        GGUFValueType::String => Ok(GGUFValue::String(r.read_text(wire.string_len)?)),
        GGUFValueType::Array => {
            if depth >= MAX_ARRAY_DEPTH {
                return Err(GGUFError::Malformed(format!(
                    "arrays nested deeper than {MAX_ARRAY_DEPTH}"
                )));
            }
            let elem_type = GGUFValueType::try_from(r.read_u32()?)?;
            let declared = r.read_len(wire.array_len)?;
            let count = r.check_len(declared, elem_type.min_wire_size())?;
            let mut arr = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                arr.push(read_value(r, elem_type, wire, depth + 1)?);
            }
            Ok(GGUFValue::Array(arr))
        }
        GGUFValueType::Uint64 => Ok(GGUFValue::Uint64(r.read_u64()?)),
        GGUFValueType::Int64 => Ok(GGUFValue::Int64(r.read_i64()?)),
        GGUFValueType::Float64 => Ok(GGUFValue::Float64(r.read_f64()?)),
    }
}

fn read_tensor_info(r: &mut ByteReader<'_>, wire: WireFormat) -> Result<TensorDescriptor> {
    let name = r.read_text(wire.string_len)?;
    let rank = r.read_u32()?;
    // a rank that outruns the input means the tensor table was cut short
    r.ensure(u64::from(rank), wire.dim.bytes())?;
    let mut dims = Vec::with_capacity(rank as usize);
    for _ in 0..rank {
        dims.push(r.read_len(wire.dim)?);
    }
    let type_id = r.read_u32()?;
    let offset = r.read_u64()?;

    let mut descriptor = TensorDescriptor {
        name,
        dims,
        type_id,
        ggml_type: GGMLType::from_id(type_id),
        offset,
        data_offset: None,
        byte_len: None,
    };
    descriptor.byte_len = descriptor
        .traits()
        .zip(descriptor.element_count())
        .and_then(|(t, n)| t.byte_len(n));
    Ok(descriptor)
}
