//! String form parsing for Windows security identifiers (`S-R-I-S1-...-Sn`).
//!
//! Shared by the `win-advapi-security` crate; it is not meant to be used directly.
#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt::{self, Display};
use core::num::ParseIntError;
use core::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Minimum number of sub-authorities of a valid SID.
pub const MIN_SUBAUTHORITY_COUNT: u8 = 1;
/// Maximum number of sub-authorities of a valid SID (`SID_MAX_SUB_AUTHORITIES`).
pub const MAX_SUBAUTHORITY_COUNT: u8 = 15;

/// Largest value that fits in the 6-byte identifier authority.
const MAX_IDENTIFIER_AUTHORITY: u64 = (1 << 48) - 1;

/// Decoded components of a SID string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidComponents {
    /// The SID revision value, generally 1.
    pub revision: u8,
    /// The SID identifier authority value (big-endian).
    pub identifier_authority: [u8; 6],
    /// The SID sub-authority values.
    pub sub_authority: ArrayVec<u32, { MAX_SUBAUTHORITY_COUNT as usize }>,
}

/// Error type returned when parsing a SID string fails due to an invalid format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct InvalidSidFormat;

impl Display for InvalidSidFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid format for Sid")
    }
}

/// Parses a component made only of digits of `radix`.
///
/// `from_str_radix` accepts a leading '+', the Windows parser does not.
fn parse_digits<T>(
    s: &str,
    radix: u32,
    parse: fn(&str, u32) -> Result<T, ParseIntError>,
) -> Result<T, InvalidSidFormat> {
    if !s.chars().all(|c| c.is_digit(radix)) {
        return Err(InvalidSidFormat);
    }
    parse(s, radix).map_err(|_| InvalidSidFormat)
}

fn parse_identifier_authority(s: &str) -> Result<[u8; 6], InvalidSidFormat> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => parse_digits(hex, 16, u64::from_str_radix)?,
        None => parse_digits(s, 10, u64::from_str_radix)?,
    };
    if value > MAX_IDENTIFIER_AUTHORITY {
        return Err(InvalidSidFormat);
    }
    let [_, _, a, b, c, d, e, f] = value.to_be_bytes();
    Ok([a, b, c, d, e, f])
}

impl FromStr for SidComponents {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut s_cmp = s.split('-');
        if !s_cmp
            .next()
            .is_some_and(|head| head.eq_ignore_ascii_case("s"))
        {
            return Err(InvalidSidFormat);
        }
        let revision =
            parse_digits(s_cmp.next().ok_or(InvalidSidFormat)?, 10, u8::from_str_radix)?;

        let identifier_authority =
            parse_identifier_authority(s_cmp.next().ok_or(InvalidSidFormat)?)?;

        let mut sub_authority = ArrayVec::new();
        for item in s_cmp {
            let item = parse_digits(item, 10, u32::from_str_radix)?;
            sub_authority.try_push(item).map_err(|_| InvalidSidFormat)?;
        }
        if sub_authority.len() < MIN_SUBAUTHORITY_COUNT as usize {
            return Err(InvalidSidFormat);
        }

        Ok(Self {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::indexing_slicing, reason = "Not an issue in test")]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_builtin_administrators() {
        let cmp: SidComponents = "S-1-5-32-544".parse().unwrap();
        assert_eq!(cmp.revision, 1);
        assert_eq!(cmp.identifier_authority, [0, 0, 0, 0, 0, 5]);
        assert_eq!(cmp.sub_authority.as_slice(), &[32, 544]);
    }

    #[test]
    fn lower_case_prefix_is_accepted() {
        assert!("s-1-1-0".parse::<SidComponents>().is_ok());
    }

    #[test]
    fn hex_authority() {
        let cmp: SidComponents = "S-1-0x1000000000-7".parse().unwrap();
        assert_eq!(cmp.identifier_authority, [0, 0x10, 0, 0, 0, 0]);
    }

    #[test]
    fn rejects_malformed() {
        for input in [
            "",
            "S",
            "S-1",
            "S-1-5",
            "X-1-5-18",
            "S-1-5-",
            "S-1-5--18",
            "S-1-5-+18",
            "S-+1-5-18",
            "S-1-+5-18",
            "S-1-0x+5-18",
            "S-1-0x-18",
            "S-256-5-18",
            "S-1-281474976710656-1",
            "S-1-5-4294967296",
            "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15-16",
        ] {
            assert_eq!(
                input.parse::<SidComponents>(),
                Err(InvalidSidFormat),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn fifteen_sub_authorities_is_the_limit() {
        let cmp: SidComponents = "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15".parse().unwrap();
        assert_eq!(cmp.sub_authority.len(), MAX_SUBAUTHORITY_COUNT as usize);
    }

    proptest! {
        #[test]
        fn decimal_authority_matches_big_endian(auth in 0u64..=MAX_IDENTIFIER_AUTHORITY, rid in any::<u32>()) {
            let cmp: SidComponents = format!("S-1-{auth}-{rid}").parse().unwrap();
            let mut be = [0u8; 8];
            be[2..].copy_from_slice(&cmp.identifier_authority);
            prop_assert_eq!(u64::from_be_bytes(be), auth);
            prop_assert_eq!(cmp.sub_authority[0], rid);
        }
    }
}
