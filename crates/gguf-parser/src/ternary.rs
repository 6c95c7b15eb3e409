//! Balanced-ternary and plain base-3 rendering of integers.
//!
//! Balanced ternary uses the trits −1, 0 and +1, written `-`, `0` and `+`.
//! Plain base 3 (`0`, `1`, `2`) is reserved for checksum display.

use thiserror::Error;

pub const TRIT_NEG: char = '-';
pub const TRIT_ZERO: char = '0';
pub const TRIT_POS: char = '+';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTernaryError {
    #[error("empty balanced-ternary string")]
    Empty,

    #[error("invalid trit '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("balanced-ternary value does not fit in i64")]
    Overflow,
}

fn balanced(mut n: i128) -> String {
    if n == 0 {
        return TRIT_ZERO.to_string();
    }
    let mut trits = Vec::new();
    while n != 0 {
        match n.rem_euclid(3) {
            0 => {
                trits.push(TRIT_ZERO);
                n = n.div_euclid(3);
            }
            1 => {
                trits.push(TRIT_POS);
                n = n.div_euclid(3);
            }
            // 2 ≡ −1 (mod 3): emit −1 and carry one into the next trit
            _ => {
                trits.push(TRIT_NEG);
                n = n.div_euclid(3) + 1;
            }
        }
    }
    trits.iter().rev().collect()
}

/// Render a signed integer in balanced ternary, most significant trit first.
pub fn format_balanced_ternary(n: i64) -> String {
    balanced(i128::from(n))
}

/// Render an unsigned integer in balanced ternary.
pub fn format_balanced_ternary_u64(n: u64) -> String {
    balanced(i128::from(n))
}

/// Parse a balanced-ternary string produced by [`format_balanced_ternary`].
///
/// Leading zero trits are accepted.
pub fn parse_balanced_ternary(s: &str) -> Result<i64, ParseTernaryError> {
    if s.is_empty() {
        return Err(ParseTernaryError::Empty);
    }
    let mut acc: i128 = 0;
    for (position, symbol) in s.chars().enumerate() {
        let trit = match symbol {
            TRIT_NEG => -1,
            TRIT_ZERO => 0,
            TRIT_POS => 1,
            _ => return Err(ParseTernaryError::InvalidSymbol { symbol, position }),
        };
        acc = acc
            .checked_mul(3)
            .and_then(|v| v.checked_add(trit))
            .ok_or(ParseTernaryError::Overflow)?;
    }
    i64::try_from(acc).map_err(|_| ParseTernaryError::Overflow)
}

/// Plain base-3 digits (`0`, `1`, `2`) of `n`, most significant first.
pub fn base3_digits(mut n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push((n % 3) as u8);
        n /= 3;
    }
    digits.reverse();
    digits
}

/// Render `n` in plain base 3.
pub fn format_base3(n: u64) -> String {
    base3_digits(n)
        .into_iter()
        .map(|d| char::from(b'0' + d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_values() {
        assert_eq!(format_balanced_ternary(0), "0");
        assert_eq!(format_balanced_ternary(1), "+");
        assert_eq!(format_balanced_ternary(-1), "-");
        assert_eq!(format_balanced_ternary(2), "+-");
        assert_eq!(format_balanced_ternary(4), "++");
        assert_eq!(format_balanced_ternary(5), "+--");
        assert_eq!(format_balanced_ternary(-4), "--");
        assert_eq!(format_balanced_ternary(13), "+++");
    }

    #[test]
    fn extremes_round_trip() {
        for n in [i64::MIN, i64::MIN + 1, i64::MAX] {
            assert_eq!(parse_balanced_ternary(&format_balanced_ternary(n)).unwrap(), n);
        }
        assert_eq!(
            format_balanced_ternary_u64(u64::MAX),
            "+----00-0+00-00--0++--+++-+--+-++-++0--0-0"
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(parse_balanced_ternary(""), Err(ParseTernaryError::Empty));
        assert_eq!(
            parse_balanced_ternary("+0x"),
            Err(ParseTernaryError::InvalidSymbol { symbol: 'x', position: 2 })
        );
        assert_eq!(
            parse_balanced_ternary(&format_balanced_ternary_u64(u64::MAX)),
            Err(ParseTernaryError::Overflow)
        );
        assert_eq!(parse_balanced_ternary(&"+".repeat(200)), Err(ParseTernaryError::Overflow));
        assert_eq!(parse_balanced_ternary("00++").unwrap(), 4);
    }

    #[test]
    fn plain_base3() {
        assert_eq!(format_base3(0), "0");
        assert_eq!(format_base3(5), "12");
        assert_eq!(format_base3(9), "100");
        assert_eq!(base3_digits(8), vec![2, 2]);
    }

    proptest! {
        #[test]
        fn prop_balanced_round_trip(n in any::<i64>()) {
            prop_assert_eq!(parse_balanced_ternary(&format_balanced_ternary(n)).unwrap(), n);
        }

        #[test]
        fn prop_no_leading_zero_trit(n in any::<i64>().prop_filter("non-zero", |n| *n != 0)) {
            let s = format_balanced_ternary(n);
            prop_assert!(!s.starts_with(TRIT_ZERO));
        }
    }
}
