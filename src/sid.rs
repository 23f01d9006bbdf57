//! Low-level, zero-copy representation of a Windows Security Identifier (SID).
//!
//! This module exposes a `repr(C)` view (`Sid`) with a dynamically-sized
//! trailing slice of sub-authorities, and a fixed-size header (`SidHead`).
//! It provides read-only accessors and helpers to get the current minimal
//! binary layout required for the instance.
//!
//! **Important:** `Sid` is layout-sensitive and intended to be allocated and
//! owned by higher-level types (e.g., `SecurityIdentifier`). Direct mutation
//! or construction must respect Windows SID invariants.

#[cfg(all(windows, feature = "std"))]
mod windows;

use crate::sid_ptr::from_raw_parts;
use crate::utils::{self, validate_sid_bytes_unaligned};
use crate::{SidIdentifierAuthority, SidSizeInfo};
use parsing::InvalidSidFormat;

pub use parsing::MAX_SUBAUTHORITY_COUNT;
pub use parsing::MIN_SUBAUTHORITY_COUNT;

use core::{
    alloc::Layout,
    fmt::{self, Debug, Display},
    hash::Hash,
    mem::align_of,
    slice,
};

/// C-compatible, dynamically-sized Windows Security Identifier.
///
/// This is a **DST** (`[u32]` tail) representing:
/// - `revision`: SID revision (commonly `1`),
/// - `sub_authority_count`: number of [u32] elements in the trailing slice,
/// - `identifier_authority`: 6-byte identifier authority,
/// - `sub_authority`: trailing slice of [u32] elements (length = `sub_authority_count`).
///
/// # Layout
/// The layout matches the Windows SID memory representation:
/// a fixed header followed by `sub_authority_count` 32-bit values.
///
/// # Invariants
/// - `sub_authority` length equals `sub_authority_count`.
/// - `sub_authority_count` is in `1..=15`.
/// - The allocation size must be consistent with `SidSizeInfo`.
///
/// Instances are created and owned by [`SecurityIdentifier`](crate::SecurityIdentifier),
/// [`ConstSid`](crate::ConstSid) or borrowed from the system (`Sid::from_raw` on Windows).
#[repr(C)]
pub struct Sid {
    /// The SID revision value, generally 1.
    pub revision: u8,
    pub(crate) sub_authority_count: u8,
    /// The SID identifier authority value.
    pub identifier_authority: SidIdentifierAuthority,
    /// The SID sub-authority values.
    pub sub_authority: [u32],
}

/// Fixed-size header of a SID (no trailing sub-authorities).
#[repr(C)]
pub(crate) struct SidHead {
    pub revision: u8,
    pub sub_authority_count: u8,
    pub identifier_authority: SidIdentifierAuthority,
}

pub(crate) const SID_HEAD_SIZE: usize = core::mem::size_of::<SidHead>();

impl Sid {
    /// The only SID revision understood by Windows (`SID_REVISION`).
    pub const REVISION: u8 = 1;

    /// Returns a `&[u8]` view over the binary representation of this SID.
    ///
    /// The slice covers the header and the exact number of sub-authorities
    /// (based on `sub_authority_count`), like the buffer sized by `GetLengthSid`.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{well_known, Sid};
    /// let sid: &Sid = well_known::BUILTIN_ADMINISTRATORS.as_sid();
    /// assert_eq!(sid.as_binary(), [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn as_binary(&self) -> &[u8] {
        let len = self.len_bytes();
        // Safety: `self` is backed by an allocation of at least `len` bytes
        // (invariant of every `Sid` constructor) and the slice borrows `self`.
        unsafe { slice::from_raw_parts(core::ptr::from_ref(self).cast::<u8>(), len) }
    }

    /// Builds a reference from a pointer to a SID whose sub-authority count
    /// has to be read from memory.
    ///
    /// # Safety
    /// `raw` must point to a valid, 4-byte aligned SID living at least for `'a`.
    pub(crate) const unsafe fn from_raw_internal<'a>(raw: *const ()) -> &'a Self {
        // Safety: caller guarantees `raw` points to a SID header.
        let count = unsafe { (*raw.cast::<SidHead>()).sub_authority_count };
        // Safety: the fat pointer covers exactly `count` sub-authorities,
        // which the caller guarantees to be initialized.
        unsafe { &*from_raw_parts(raw, count as usize) }
    }

    /// Returns a `&mut [u8]` view over the binary representation.
    ///
    /// # Safety
    /// Mutating the buffer must preserve SID invariants (e.g., do not desynchronize
    /// `sub_authority_count` and the tail length).
    pub(crate) const unsafe fn as_binary_mut(&mut self) -> &mut [u8] {
        let len = self.len_bytes();
        // Safety: same allocation as `as_binary`, borrowed mutably.
        unsafe { slice::from_raw_parts_mut(core::ptr::from_mut(self).cast::<u8>(), len) }
    }

    /// Returns the slice of sub-authorities (`[u32]`) with length `sub_authority_count`.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{ConstSid, SidIdentifierAuthority};
    /// let const_sid = ConstSid::<1>::new(1, SidIdentifierAuthority::NT_AUTHORITY, [18]);
    /// assert_eq!(const_sid.as_sid().get_sub_authorities(), &[18]);
    /// ```
    #[must_use]
    #[inline]
    pub const fn get_sub_authorities(&self) -> &[u32] {
        &self.sub_authority
    }

    /// Mutable access to the sub-authorities. The count itself cannot change.
    #[inline]
    pub const fn get_sub_authorities_mut(&mut self) -> &mut [u32] {
        &mut self.sub_authority
    }

    /// Number of sub-authorities (`GetSidSubAuthorityCount`).
    #[inline]
    #[must_use]
    pub const fn sub_authority_count(&self) -> u8 {
        self.sub_authority_count
    }

    /// The relative identifier, i.e. the last sub-authority.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::well_known;
    /// assert_eq!(well_known::BUILTIN_USERS.as_sid().rid(), 545);
    /// ```
    #[inline]
    #[must_use]
    pub const fn rid(&self) -> u32 {
        match self.sub_authority.last() {
            Some(rid) => *rid,
            None => 0,
        }
    }

    /// Computes the minimal `Layout` (size + align) needed for **this** instance
    /// given its current `sub_authority_count`.
    #[must_use]
    #[inline]
    pub const fn get_current_min_layout(&self) -> Layout {
        match SidSizeInfo::from_count(self.sub_authority_count) {
            Some(info) => info.get_layout(),
            None => unreachable!(),
        }
    }

    /// Length in bytes of the SID, the value `GetLengthSid` reports.
    #[inline]
    #[must_use]
    pub const fn len_bytes(&self) -> usize {
        self.get_current_min_layout().size()
    }

    /// Structural validity, following the rules of `IsValidSid`:
    /// the revision is [`Sid::REVISION`] and there are 1 to 15 sub-authorities.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.revision == Self::REVISION
            && utils::sub_authority_size_guard(self.sub_authority_count as usize)
    }

    /// Returns `true` when `self` is an account of `domain`: same authority,
    /// `domain`'s sub-authorities as prefix and exactly one extra RID.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{well_known, SecurityIdentifier};
    /// let builtin: SecurityIdentifier = "S-1-5-32".parse().unwrap();
    /// assert!(well_known::BUILTIN_ADMINISTRATORS.as_sid().is_in_domain(&builtin));
    /// assert!(!well_known::LOCAL_SYSTEM.as_sid().is_in_domain(&builtin));
    /// ```
    #[inline]
    #[must_use]
    pub fn is_in_domain(&self, domain: &Self) -> bool {
        self.revision == domain.revision
            && self.identifier_authority == domain.identifier_authority
            && self.sub_authority.len() == domain.sub_authority.len() + 1
            && self.sub_authority.starts_with(&domain.sub_authority)
    }

    /// Attempts to view a byte slice as a `&Sid`.
    ///
    /// # Errors
    /// [`InvalidSidFormat`] if the buffer is not a valid SID or is not
    /// aligned for `u32` (copy it into a
    /// [`SecurityIdentifier`](crate::SecurityIdentifier) in that case).
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{well_known, Sid, SidIdentifierAuthority};
    /// let bytes = well_known::LOCAL_SYSTEM.as_sid().as_binary();
    /// let sid = Sid::from_bytes(bytes).expect("valid SID bytes");
    /// assert_eq!(sid.identifier_authority, SidIdentifierAuthority::NT_AUTHORITY);
    /// assert_eq!(sid.get_sub_authorities(), [18u32]);
    /// ```
    #[inline]
    pub fn from_bytes(value: &[u8]) -> Result<&Self, InvalidSidFormat> {
        validate_sid_bytes_unaligned(value)?;
        if value.as_ptr().align_offset(align_of::<u32>()) != 0 {
            return Err(InvalidSidFormat);
        }
        // Safety: the buffer holds a validated, aligned SID of exactly the right size.
        Ok(unsafe { Self::from_raw_internal(value.as_ptr().cast()) })
    }
}

impl Display for Sid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.revision)?;

        // Identifier authority: decimal when it fits in u32, hexadecimal otherwise.
        let id_auth_value = self.identifier_authority.as_u64();
        if id_auth_value <= 0xFFFF_FFFF {
            write!(f, "-{id_auth_value}")?;
        } else {
            write!(f, "-0x{id_auth_value:X}")?;
        }

        for &sub_auth in self.get_sub_authorities() {
            write!(f, "-{sub_auth}")?;
        }
        Ok(())
    }
}

impl Debug for Sid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::debug_print(stringify!(Sid), self, f)
    }
}

impl AsRef<Self> for Sid {
    #[inline]
    fn as_ref(&self) -> &Self {
        self
    }
}

impl PartialEq for Sid {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_binary() == other.as_binary()
    }
}

impl Eq for Sid {}

impl Hash for Sid {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_binary().hash(state);
    }
}

#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::well_known;
    #[cfg(feature = "alloc")]
    use crate::{SecurityIdentifier, arb_security_identifier};
    use proptest::prelude::*;

    #[cfg(feature = "std")]
    proptest! {
        #[test]
        fn sid_display_round_trip(sid in arb_security_identifier()) {
            let display = sid.as_sid().to_string();
            prop_assert!(display.starts_with("S-1-"), "Display does not start with S-1-: {}", display);

            let dash_count = display.matches('-').count();
            let expected = usize::from(sid.sub_authority_count()) + 2;
            prop_assert_eq!(dash_count, expected);
            let hex = sid.identifier_authority.as_u64() > u64::from(u32::MAX);
            prop_assert_eq!(display.starts_with("S-1-0x"), hex);
            prop_assert_eq!(display.parse::<SecurityIdentifier>().unwrap(), sid);
        }

        #[test]
        fn sid_hash_and_eq(sid1 in arb_security_identifier()) {
            use core::hash::Hasher;
            use std::collections::hash_map::DefaultHasher;
            let sid2 = sid1.clone();
            prop_assert_eq!(&sid1, &sid2);
            let mut hasher1 = DefaultHasher::new();
            sid1.as_sid().hash(&mut hasher1);
            let mut hasher2 = DefaultHasher::new();
            sid2.as_sid().hash(&mut hasher2);
            prop_assert_eq!(hasher1.finish(), hasher2.finish());
        }

        #[test]
        fn len_bytes_matches_binary(sid in arb_security_identifier()) {
            prop_assert_eq!(sid.len_bytes(), 8 + 4 * sid.get_sub_authorities().len());
            prop_assert_eq!(sid.as_binary().len(), sid.len_bytes());
            prop_assert!(sid.is_valid());
        }
    }

    #[test]
    fn display_uses_hex_for_large_authorities() {
        let sid = crate::ConstSid::<1>::new(
            1,
            SidIdentifierAuthority::new([0, 1, 0, 0, 0, 0]),
            [7],
        );
        assert_eq!(sid.to_string(), "S-1-0x100000000-7");
    }

    #[test]
    fn from_bytes_rejects_misaligned() {
        #[repr(C, align(4))]
        struct Aligned([u8; 13]);
        let mut buffer = Aligned([0; 13]);
        buffer.0[1..].copy_from_slice(well_known::LOCAL_SYSTEM.as_sid().as_binary());
        assert!(Sid::from_bytes(&buffer.0[1..]).is_err());
        let mut aligned = Aligned([0; 13]);
        aligned.0[..12].copy_from_slice(well_known::LOCAL_SYSTEM.as_sid().as_binary());
        assert_eq!(
            Sid::from_bytes(&aligned.0[..12]).unwrap(),
            well_known::LOCAL_SYSTEM.as_sid()
        );
    }

    #[test]
    fn rid_and_count() {
        let sid = well_known::BUILTIN_ADMINISTRATORS;
        assert_eq!(sid.as_sid().rid(), 544);
        assert_eq!(sid.as_sid().sub_authority_count(), 2);
    }

    #[test]
    fn revision_breaks_validity() {
        let mut sid = well_known::WORLD;
        sid.revision = 2;
        assert!(!sid.as_sid().is_valid());
    }

    #[test]
    fn debug_output() {
        assert_eq!(
            format!("{:?}", well_known::WORLD.as_sid()),
            "Sid(S-1-1-0)"
        );
    }
}
