//! Base-3 checksum over the structural section of a GGUF file.
//!
//! The covered range is `[0, structural_end)`: header, metadata and the
//! tensor-info table. Padding and tensor data are not included. The hash is
//! 64-bit FNV-1a, shown as exactly [`DIGEST_WIDTH`] plain base-3 digits.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::GGUFModel;
use crate::ternary::base3_digits;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Base-3 digits needed for any `u64` (3^41 > 2^64).
pub const DIGEST_WIDTH: usize = 41;

pub fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |h, &b| {
        (h ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Fixed-width sequence of base-3 digits, most significant first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TernaryDigest {
    digits: Vec<u8>,
}

impl TernaryDigest {
    pub fn of(bytes: &[u8]) -> Self {
        Self::from_hash(fnv1a64(bytes))
    }

    fn from_hash(hash: u64) -> Self {
        let significant = base3_digits(hash);
        let mut digits = vec![0u8; DIGEST_WIDTH.saturating_sub(significant.len())];
        digits.extend(significant);
        Self { digits }
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// The hash the digits encode.
    pub fn value(&self) -> u64 {
        self.digits
            .iter()
            .fold(0u64, |acc, &d| acc.wrapping_mul(3).wrapping_add(u64::from(d)))
    }
}

impl fmt::Display for TernaryDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &d in &self.digits {
            write!(f, "{}", char::from(b'0' + d))?;
        }
        Ok(())
    }
}

impl Serialize for TernaryDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The bytes the checksum covers.
pub fn structural_section<'a>(model: &GGUFModel, bytes: &'a [u8]) -> &'a [u8] {
    usize::try_from(model.structural_end)
        .ok()
        .and_then(|end| bytes.get(..end))
        .unwrap_or(bytes)
}

pub fn structural_digest(model: &GGUFModel, bytes: &[u8]) -> TernaryDigest {
    TernaryDigest::of(structural_section(model, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::test_factory::{GGUFBuilder, single_f32_tensor};

    #[test]
    fn golden_values() {
        assert_eq!(
            TernaryDigest::of(b"").to_string(),
            "10121220121102202121121020221010121212112"
        );

        let header = GGUFBuilder::new(3).build();
        assert_eq!(header.len(), 24);
        assert_eq!(fnv1a64(&header), 0x4b39_4265_afd1_f3ef);
        assert_eq!(
            TernaryDigest::of(&header).to_string(),
            "01100010001201020101012002020121022002111"
        );
    }

    #[test]
    fn covers_structural_section_only() {
        let bytes = single_f32_tensor();
        let model = parse(&bytes).unwrap();
        assert_eq!(model.structural_end, 57);
        assert_eq!(
            structural_digest(&model, &bytes).to_string(),
            "01001012120002010012002102001010100222120"
        );

        // tensor data does not move the checksum
        let mut patched = bytes.clone();
        let last = patched.len() - 1;
        patched[last] ^= 0xFF;
        assert_eq!(
            structural_digest(&model, &patched),
            structural_digest(&model, &bytes)
        );
    }

    #[test]
    fn deterministic_and_fixed_width() {
        let a = TernaryDigest::of(b"ternary");
        let b = TernaryDigest::of(b"ternary");
        assert_eq!(a, b);
        assert_eq!(a.digits().len(), DIGEST_WIDTH);
        assert!(a.digits().iter().all(|&d| d < 3));
        assert_eq!(a.value(), fnv1a64(b"ternary"));
        assert_ne!(a, TernaryDigest::of(b"binary"));
    }
}
