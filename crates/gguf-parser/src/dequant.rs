//! Per-block preview decoders.
//!
//! Each decoder takes exactly one block of its element type and appends
//! `block_size` approximate f32 values. Layouts follow ggml.

use half::{bf16, f16};

use crate::error::{GGUFError, Result};

fn block<const N: usize>(bytes: &[u8]) -> Result<&[u8; N]> {
    bytes.try_into().map_err(|_| {
        GGUFError::Malformed(format!("expected {N}-byte block, got {} bytes", bytes.len()))
    })
}

fn half_at(lo: u8, hi: u8) -> f32 {
    f16::from_le_bytes([lo, hi]).to_f32()
}

pub fn f32_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(f32::from_le_bytes(*block::<4>(bytes)?));
    Ok(())
}

pub fn f16_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(f16::from_le_bytes(*block::<2>(bytes)?).to_f32());
    Ok(())
}

pub fn bf16_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(bf16::from_le_bytes(*block::<2>(bytes)?).to_f32());
    Ok(())
}

pub fn f64_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(f64::from_le_bytes(*block::<8>(bytes)?) as f32);
    Ok(())
}

pub fn i8_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(f32::from(i8::from_le_bytes(*block::<1>(bytes)?)));
    Ok(())
}

pub fn i16_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(f32::from(i16::from_le_bytes(*block::<2>(bytes)?)));
    Ok(())
}

pub fn i32_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(i32::from_le_bytes(*block::<4>(bytes)?) as f32);
    Ok(())
}

pub fn i64_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    out.push(i64::from_le_bytes(*block::<8>(bytes)?) as f32);
    Ok(())
}

/// Q4_0: f16 scale, 16 bytes of nibbles. Low nibbles are elements 0..16,
/// high nibbles 16..32; value = (q - 8) * d.
pub fn q4_0_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [d0, d1, qs @ ..] = block::<18>(bytes)?;
    let d = half_at(*d0, *d1);
    out.extend(qs.iter().map(|q| (i32::from(q & 0x0F) - 8) as f32 * d));
    out.extend(qs.iter().map(|q| (i32::from(q >> 4) - 8) as f32 * d));
    Ok(())
}

/// Q4_1: f16 scale and min, 16 bytes of nibbles; value = q * d + m.
pub fn q4_1_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [d0, d1, m0, m1, qs @ ..] = block::<20>(bytes)?;
    let d = half_at(*d0, *d1);
    let m = half_at(*m0, *m1);
    out.extend(qs.iter().map(|q| f32::from(q & 0x0F) * d + m));
    out.extend(qs.iter().map(|q| f32::from(q >> 4) * d + m));
    Ok(())
}

/// Q5_0: f16 scale, 32 high bits, 16 bytes of low nibbles; value = (q - 16) * d.
pub fn q5_0_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [d0, d1, h0, h1, h2, h3, qs @ ..] = block::<22>(bytes)?;
    let d = half_at(*d0, *d1);
    let qh = u32::from_le_bytes([*h0, *h1, *h2, *h3]);
    out.extend(qs.iter().enumerate().map(|(j, q)| {
        let xh = ((qh >> j) << 4) & 0x10;
        ((u32::from(q & 0x0F) | xh) as i32 - 16) as f32 * d
    }));
    out.extend(qs.iter().enumerate().map(|(j, q)| {
        let xh = (qh >> (j + 12)) & 0x10;
        ((u32::from(q >> 4) | xh) as i32 - 16) as f32 * d
    }));
    Ok(())
}

/// Q5_1: f16 scale and min, 32 high bits, 16 bytes of low nibbles; value = q * d + m.
pub fn q5_1_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [d0, d1, m0, m1, h0, h1, h2, h3, qs @ ..] = block::<24>(bytes)?;
    let d = half_at(*d0, *d1);
    let m = half_at(*m0, *m1);
    let qh = u32::from_le_bytes([*h0, *h1, *h2, *h3]);
    out.extend(qs.iter().enumerate().map(|(j, q)| {
        let xh = ((qh >> j) << 4) & 0x10;
        (u32::from(q & 0x0F) | xh) as f32 * d + m
    }));
    out.extend(qs.iter().enumerate().map(|(j, q)| {
        let xh = (qh >> (j + 12)) & 0x10;
        (u32::from(q >> 4) | xh) as f32 * d + m
    }));
    Ok(())
}

/// Q8_0: f16 scale, 32 signed bytes; value = q * d.
pub fn q8_0_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [d0, d1, qs @ ..] = block::<34>(bytes)?;
    let d = half_at(*d0, *d1);
    out.extend(qs.iter().map(|q| f32::from(*q as i8) * d));
    Ok(())
}

/// Q8_1: f16 scale, f16 sum (unused here), 32 signed bytes.
pub fn q8_1_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [d0, d1, _s0, _s1, qs @ ..] = block::<36>(bytes)?;
    let d = half_at(*d0, *d1);
    out.extend(qs.iter().map(|q| f32::from(*q as i8) * d));
    Ok(())
}

/// TQ2_0: 64 bytes of 2-bit trits (stored as 0, 1, 2) then an f16 scale;
/// value = (q - 1) * d.
pub fn tq2_0_block(bytes: &[u8], out: &mut Vec<f32>) -> Result<()> {
    let [qs @ .., d0, d1] = block::<66>(bytes)?;
    let d = half_at(*d0, *d1);
    for chunk in qs.chunks_exact(32) {
        for shift in [0u8, 2, 4, 6] {
            out.extend(
                chunk
                    .iter()
                    .map(|q| (i32::from((q >> shift) & 3) - 1) as f32 * d),
            );
        }
    }
    Ok(())
}
