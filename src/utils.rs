use core::fmt;
use core::mem::offset_of;

use parsing::InvalidSidFormat;

use crate::{
    Sid, SidSizeInfo,
    sid::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT, SidHead},
};

pub const fn sub_authority_size_guard(size: usize) -> bool {
    MIN_SUBAUTHORITY_COUNT as usize <= size && size <= MAX_SUBAUTHORITY_COUNT as usize
}

/// Validates a raw SID blob like `IsValidSid` would, without assuming alignment.
///
/// - revision is [`Sid::REVISION`]
/// - `sub_authority_count` in [1..=15]
/// - total size == 8 + 4 * `sub_authority_count`
/// - identifier authority is 6 bytes (big-endian); any value is accepted
///
/// Everything is read from bytes, no typed reference is created.
pub const fn validate_sid_bytes_unaligned(buf: &[u8]) -> Result<(), InvalidSidFormat> {
    const REVISION_OFFSET: usize = offset_of!(SidHead, revision);
    const COUNT_OFFSET: usize = offset_of!(SidHead, sub_authority_count);
    if buf.len() < SidSizeInfo::MIN.size() {
        return Err(InvalidSidFormat);
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "The revision offset is in bounds (checked by minimum size)"
    )]
    if buf[REVISION_OFFSET] != Sid::REVISION {
        return Err(InvalidSidFormat);
    }
    #[expect(
        clippy::indexing_slicing,
        reason = "The count offset is in bounds (checked by minimum size)"
    )]
    let count = buf[COUNT_OFFSET];

    match SidSizeInfo::from_count(count) {
        Some(info) if info.size() == buf.len() => Ok(()),
        _ => Err(InvalidSidFormat),
    }
}

/// `Name(S-1-...)` debug output shared by the SID containers.
pub fn debug_print<T: fmt::Display + ?Sized>(
    name: &str,
    value: &T,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    write!(f, "{name}({value})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_builtin_administrators() {
        let bytes = [1u8, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0];
        assert_eq!(validate_sid_bytes_unaligned(&bytes), Ok(()));
    }

    #[test]
    fn rejects_bad_blobs() {
        // Wrong revision.
        assert!(validate_sid_bytes_unaligned(&[2, 1, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0]).is_err());
        // Zero sub-authorities.
        assert!(validate_sid_bytes_unaligned(&[1, 0, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0]).is_err());
        // Count does not match the buffer length.
        assert!(validate_sid_bytes_unaligned(&[1, 2, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0]).is_err());
        // Truncated.
        assert!(validate_sid_bytes_unaligned(&[1, 1, 0, 0]).is_err());
    }
}
