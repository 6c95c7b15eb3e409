//! Bounds-checked little-endian cursor over a borrowed byte source.
//!
//! Every read validates the requested range against the remaining input
//! before touching memory; a failed read leaves the cursor where it was.

use crate::error::{GGUFError, Result};

/// Width of a length prefix (strings, arrays, counts) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenWidth {
    U32,
    U64,
}

impl LenWidth {
    pub const fn bytes(self) -> usize {
        match self {
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

/// Sequential reader over `&[u8]`.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the source.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        let len = self.bytes.len() as u64;
        if offset > len {
            return Err(GGUFError::UnexpectedEof {
                offset: len,
                wanted: offset - len,
            });
        }
        // offset <= len, and len came from a usize
        self.pos = offset as usize;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        let out = self.peek_exact(n)?;
        self.pos += n;
        Ok(out)
    }

    /// Borrow the next `n` bytes without advancing.
    pub fn peek_exact(&self, n: usize) -> Result<&'a [u8]> {
        self.pos
            .checked_add(n)
            .and_then(|end| self.bytes.get(self.pos..end))
            .ok_or_else(|| self.eof(n))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_exact(N)?);
        Ok(buf)
    }

    fn eof(&self, wanted: usize) -> GGUFError {
        GGUFError::UnexpectedEof {
            offset: self.pos as u64,
            wanted: wanted.saturating_sub(self.remaining()) as u64,
        }
    }

    pub fn peek_u32(&self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.peek_exact(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read an unsigned length or count of the given wire width.
    pub fn read_len(&mut self, width: LenWidth) -> Result<u64> {
        match width {
            LenWidth::U32 => self.read_u32().map(u64::from),
            LenWidth::U64 => self.read_u64(),
        }
    }

    /// Check that `declared` items of `unit` bytes each can still be read.
    ///
    /// Used before allocating for a length-prefixed value, so a hostile
    /// length never turns into a huge allocation.
    pub fn check_len(&self, declared: u64, unit: usize) -> Result<usize> {
        let count = usize::try_from(declared).map_err(|_| {
            GGUFError::Malformed(format!("declared length {declared} exceeds address space"))
        })?;
        let bytes = count.checked_mul(unit.max(1)).ok_or_else(|| {
            GGUFError::Malformed(format!("declared length {declared} overflows"))
        })?;
        if bytes > self.remaining() {
            return Err(GGUFError::Malformed(format!(
                "declared length {declared} at offset {} exceeds remaining {} bytes",
                self.pos,
                self.remaining()
            )));
        }
        Ok(count)
    }

    /// Fail with `UnexpectedEof` unless `count` items of `unit` bytes each
    /// are still available. For element counts, where running out of input
    /// means the file was cut short.
    pub fn ensure(&self, count: u64, unit: usize) -> Result<()> {
        let remaining = self.remaining() as u64;
        let needed = count.saturating_mul(unit as u64);
        if needed > remaining {
            return Err(GGUFError::UnexpectedEof {
                offset: self.pos as u64,
                wanted: needed - remaining,
            });
        }
        Ok(())
    }

    /// Read a length-prefixed string. No terminator; invalid UTF-8 is replaced.
    pub fn read_text(&mut self, width: LenWidth) -> Result<String> {
        let start = self.pos;
        let declared = self.read_len(width)?;
        let len = match self.check_len(declared, 1) {
            Ok(len) => len,
            Err(e) => {
                self.pos = start;
                return Err(e);
            }
        };
        let raw = self.read_exact(len)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reads_little_endian_scalars() {
        let mut data = Vec::new();
        data.push(0xFFu8);
        data.extend_from_slice(&(-2i16).to_le_bytes());
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        data.extend_from_slice(&(-5i64).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-0.25f64).to_le_bytes());

        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_i8().unwrap(), -1);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_i64().unwrap(), -5);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), -0.25);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_read_is_eof_and_does_not_advance() {
        let data = [1u8, 2, 3];
        let mut r = ByteReader::new(&data);
        r.read_u8().unwrap();
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, GGUFError::UnexpectedEof { offset: 1, wanted: 2 }));
        assert_eq!(r.position(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x0302);
    }

    #[test]
    fn text_with_u32_and_u64_prefix() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"abc");
        data.extend_from_slice(&2u64.to_le_bytes());
        data.extend_from_slice(b"hi");

        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_text(LenWidth::U32).unwrap(), "abc");
        assert_eq!(r.read_text(LenWidth::U64).unwrap(), "hi");
    }

    #[test]
    fn oversized_text_length_is_malformed() {
        let mut data = Vec::new();
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        data.extend_from_slice(b"abc");

        let mut r = ByteReader::new(&data);
        assert!(matches!(r.read_text(LenWidth::U64), Err(GGUFError::Malformed(_))));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn seek_and_peek() {
        let data = 7u32.to_le_bytes();
        let mut r = ByteReader::new(&data);
        assert_eq!(r.peek_u32().unwrap(), 7);
        assert_eq!(r.position(), 0);
        r.seek(4).unwrap();
        assert_eq!(r.remaining(), 0);
        assert!(matches!(
            r.seek(9),
            Err(GGUFError::UnexpectedEof { offset: 4, wanted: 5 })
        ));
    }

    #[test]
    fn ensure_reports_missing_bytes() {
        let data = [0u8; 6];
        let mut r = ByteReader::new(&data);
        r.read_u16().unwrap();
        assert!(r.ensure(1, 4).is_ok());
        assert!(matches!(
            r.ensure(2, 4),
            Err(GGUFError::UnexpectedEof { offset: 2, wanted: 4 })
        ));
        assert!(matches!(
            r.ensure(u64::MAX, 8),
            Err(GGUFError::UnexpectedEof { offset: 2, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_reads_never_pass_the_end(data in proptest::collection::vec(any::<u8>(), 0..64), extra in 1usize..128) {
            let mut r = ByteReader::new(&data);
            let wanted = data.len() + extra;
            let is_eof = matches!(r.read_exact(wanted), Err(GGUFError::UnexpectedEof { .. }));
            prop_assert!(is_eof);
            prop_assert_eq!(r.position(), 0);
            prop_assert_eq!(r.read_exact(data.len()).unwrap(), &data[..]);
        }
    }
}
