//! Header check for the CSV artifact emitted by the external decode benchmark.
//!
//! Only the header is inspected; row ingestion is not supported.

use crate::error::{GGUFError, Result};

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "pattern",
    "faults",
    "decodes",
    "bytes_decoded",
    "bytes_encoded",
    "avg_decode_us",
];

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchColumns {
    pub pattern: usize,
    pub faults: usize,
    pub decodes: usize,
    pub bytes_decoded: usize,
    pub bytes_encoded: usize,
    pub avg_decode_us: usize,
}

impl BenchColumns {
    /// Locate every required column in a CSV header line.
    ///
    /// Fails on the first missing column in [`REQUIRED_COLUMNS`] order.
    pub fn from_header(line: &str) -> Result<Self> {
        let headers: Vec<&str> = line
            .trim_start_matches('\u{feff}')
            .trim_end()
            .split(',')
            .map(|h| h.trim().trim_matches('"'))
            .collect();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| GGUFError::MissingRequiredColumn(name.to_string()))
        };
        Ok(Self {
            pattern: find("pattern")?,
            faults: find("faults")?,
            decodes: find("decodes")?,
            bytes_decoded: find("bytes_decoded")?,
            bytes_encoded: find("bytes_encoded")?,
            avg_decode_us: find("avg_decode_us")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_columns_in_any_order() {
        let cols = BenchColumns::from_header(
            "avg_decode_us,pattern,\"faults\",decodes, bytes_decoded,bytes_encoded,extra\r\n",
        )
        .unwrap();
        assert_eq!(cols.avg_decode_us, 0);
        assert_eq!(cols.pattern, 1);
        assert_eq!(cols.faults, 2);
        assert_eq!(cols.bytes_decoded, 4);
        assert_eq!(cols.bytes_encoded, 5);
    }

    #[test]
    fn missing_column_is_named() {
        let err = BenchColumns::from_header("pattern,faults,decodes,bytes_decoded,avg_decode_us")
            .unwrap_err();
        assert!(matches!(err, GGUFError::MissingRequiredColumn(c) if c == "bytes_encoded"));
    }

    #[test]
    fn every_required_column_is_checked() {
        for missing in REQUIRED_COLUMNS {
            let header = REQUIRED_COLUMNS
                .iter()
                .filter(|c| **c != missing)
                .copied()
                .collect::<Vec<_>>()
                .join(",");
            assert!(matches!(
                BenchColumns::from_header(&header),
                Err(GGUFError::MissingRequiredColumn(c)) if c == missing
            ));
        }
    }
}
