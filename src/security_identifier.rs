#[cfg(all(windows, feature = "std"))]
mod windows;

use crate::Sid;
use crate::SidIdentifierAuthority;
use crate::SidSizeInfo;
use crate::utils;
use crate::utils::sub_authority_size_guard;
use crate::utils::validate_sid_bytes_unaligned;
use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use core::alloc::Layout;
use core::borrow::{Borrow, BorrowMut};
use core::fmt::{self, Debug, Display};
use core::hash::{Hash, Hasher};
use core::mem::offset_of;
use core::ops::{Deref, DerefMut};
use core::ptr;
use core::str::FromStr;
use delegate::delegate;
mod maybe_uninit;
use maybe_uninit::MaybeUninitSecurityIdentifier;
use parsing::{InvalidSidFormat, SidComponents};

/// Owned, heap-allocated Windows **Security Identifier** (SID).
///
/// This type owns the underlying SID memory and guarantees:
/// - Proper allocation according to the number of sub-authorities.
/// - Proper deallocation via `Drop`.
/// - Safe read/write access through `Deref`/`DerefMut` to the inner [Sid].
///
/// It can be constructed from raw parts, parsed from text, cloned,
/// read from an access token or resolved from an account name (Windows-only).
///
/// # Examples
/// ```rust
/// # use win_advapi_security::{SecurityIdentifier, SidIdentifierAuthority};
/// let sid = SecurityIdentifier::try_new(SidIdentifierAuthority::NT_AUTHORITY, [32u32, 544u32])
///     .expect("valid SID parts");
/// assert_eq!(sid.to_string(), "S-1-5-32-544");
/// ```
pub struct SecurityIdentifier {
    inner: Box<Sid>,
}

impl Debug for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::debug_print(stringify!(SecurityIdentifier), self, f)
    }
}

impl SecurityIdentifier {
    /// Creates a new `SecurityIdentifier` from parts, validating input.
    ///
    /// Returns `None` if `sub_authority` length is out of bounds (not in 1..=15).
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{SecurityIdentifier, SidIdentifierAuthority};
    /// let sid = SecurityIdentifier::try_new(
    ///     SidIdentifierAuthority::NT_AUTHORITY,
    ///     [32u32, 544u32]
    /// ).unwrap();
    /// assert_eq!(sid.revision, 1);
    /// assert_eq!(sid.identifier_authority, SidIdentifierAuthority::NT_AUTHORITY);
    /// assert_eq!(sid.get_sub_authorities(), [32u32, 544u32]);
    /// assert!(SecurityIdentifier::try_new(SidIdentifierAuthority::NT_AUTHORITY, []).is_none());
    /// ```
    #[must_use]
    #[inline]
    pub fn try_new<I: Into<SidIdentifierAuthority>, S: AsRef<[u32]>>(
        identifier_authority: I,
        sub_authority: S,
    ) -> Option<Self> {
        let sub_authority = sub_authority.as_ref();
        sub_authority_size_guard(sub_authority.len()).then(|| {
            // SAFETY: the sub-authority count has just been validated.
            unsafe { Self::new_unchecked(identifier_authority, sub_authority) }
        })
    }

    /// Creates a new `SecurityIdentifier` from parts **without validation**.
    ///
    /// # Safety
    /// Caller must ensure `sub_authority` length is in `1..=15`.
    #[must_use]
    #[inline]
    pub unsafe fn new_unchecked<I: Into<SidIdentifierAuthority>, S: AsRef<[u32]>>(
        identifier_authority: I,
        sub_authority: S,
    ) -> Self {
        let sub_authority = sub_authority.as_ref();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Precondition of the function."
        )]
        let sub_authority_count = sub_authority.len() as u8;
        // SAFETY: sub_authority_count is a precondition of the function.
        let size_info = unsafe { SidSizeInfo::from_count(sub_authority_count).unwrap_unchecked() };
        let mut uninit = MaybeUninitSecurityIdentifier::alloc(size_info);
        let sid_ptr = uninit.as_mut_ptr();
        #[expect(
            clippy::multiple_unsafe_ops_per_block,
            reason = "Same kind of operations"
        )]
        // SAFETY: the pointer is valid for writes of a `Sid` with this count.
        unsafe {
            (*sid_ptr).revision = Sid::REVISION;
            (*sid_ptr).sub_authority_count = sub_authority_count;
            (*sid_ptr).identifier_authority = identifier_authority.into();
            ptr::copy_nonoverlapping(
                sub_authority.as_ptr(),
                (&raw mut (*sid_ptr).sub_authority).cast::<u32>(),
                sub_authority.len(),
            );
        }
        // SAFETY: every field is written.
        unsafe { uninit.assume_init() }
    }

    /// Creates a `SecurityIdentifier` from the binary form of a SID.
    ///
    /// Unlike [`Sid::from_bytes`] the buffer does not need to be aligned.
    ///
    /// # Errors
    /// [`InvalidSidFormat`] if the byte slice is not a valid SID.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::SecurityIdentifier;
    /// let bytes: [u8; 16] = [
    ///     1,    // Revision
    ///     2,    // SubAuthorityCount
    ///     0, 0, 0, 0, 0, 5, // IdentifierAuthority = NT AUTHORITY
    ///     32, 0, 0, 0,      // SubAuthority[0] = 32
    ///     32, 2, 0, 0       // SubAuthority[1] = 544 (0x220 little endian)
    /// ];
    /// let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();
    /// assert_eq!(sid.to_string(), "S-1-5-32-544");
    /// ```
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidSidFormat> {
        validate_sid_bytes_unaligned(bytes)?;
        // SAFETY: the buffer has just been validated.
        Ok(unsafe { Self::from_bytes_unchecked(bytes) })
    }

    /// Builds a `SecurityIdentifier` from raw bytes without validation.
    ///
    /// # Safety
    /// `bytes` must encode a valid SID whose length matches the embedded
    /// `sub_authority_count`.
    unsafe fn from_bytes_unchecked(bytes: &[u8]) -> Self {
        #[expect(
            clippy::indexing_slicing,
            reason = "Precondition of the function."
        )]
        let count = bytes[offset_of!(crate::sid::SidHead, sub_authority_count)];
        // SAFETY: precondition of the function.
        let size_info = unsafe { SidSizeInfo::from_count(count).unwrap_unchecked() };
        let mut uninit = MaybeUninitSecurityIdentifier::alloc(size_info);
        // SAFETY: both regions are `size_info.size()` bytes long and distinct.
        unsafe {
            ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                uninit.as_mut_ptr().cast::<u8>(),
                size_info.size(),
            );
        }
        // SAFETY: every byte has been copied from a valid SID.
        unsafe { uninit.assume_init() }
    }

    /// Returns a new SID made of `self` followed by `rid`, e.g. an account
    /// SID from its domain SID.
    ///
    /// Returns `None` when `self` already has 15 sub-authorities.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::SecurityIdentifier;
    /// let domain: SecurityIdentifier = "S-1-5-21-1-2-3".parse().unwrap();
    /// let admin = domain.with_rid(500).unwrap();
    /// assert_eq!(admin.to_string(), "S-1-5-21-1-2-3-500");
    /// assert!(admin.is_in_domain(&domain));
    /// ```
    #[inline]
    #[must_use]
    pub fn with_rid(&self, rid: u32) -> Option<Self> {
        let subs = self.get_sub_authorities();
        let count = subs.len() + 1;
        if !sub_authority_size_guard(count) {
            return None;
        }
        let mut buffer = [0u32; crate::sid::MAX_SUBAUTHORITY_COUNT as usize];
        let target = buffer.get_mut(..count)?;
        let (head, last) = target.split_at_mut(subs.len());
        head.copy_from_slice(subs);
        *last.first_mut()? = rid;
        let mut sid = Self::try_new(self.identifier_authority, target)?;
        sid.revision = self.revision;
        Some(sid)
    }

    /// Returns a reference to this `SecurityIdentifier` as a dynamically-sized [`Sid`].
    #[inline]
    #[must_use]
    pub fn as_sid(&self) -> &Sid {
        &self.inner
    }

    /// Returns a mut reference to this `SecurityIdentifier` as a dynamically-sized [`Sid`].
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{SecurityIdentifier, Sid, SidIdentifierAuthority};
    /// let mut owned = SecurityIdentifier::try_new(
    ///     SidIdentifierAuthority::NT_AUTHORITY,
    ///     &[21u32, 100u32, 0u32],
    /// ).unwrap();
    /// let sid_mut: &mut Sid = owned.as_sid_mut();
    /// sid_mut.identifier_authority = SidIdentifierAuthority::NULL_AUTHORITY;
    /// assert_eq!(sid_mut.to_string(), "S-1-0-21-100-0");
    /// ```
    #[inline]
    pub fn as_sid_mut(&mut self) -> &mut Sid {
        &mut self.inner
    }
}

impl TryFrom<&[u8]> for SecurityIdentifier {
    type Error = InvalidSidFormat;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl From<&Sid> for SecurityIdentifier {
    #[inline]
    fn from(value: &Sid) -> Self {
        // Safety: `value` is a valid SID, so is its binary form.
        unsafe { Self::from_bytes_unchecked(value.as_binary()) }
    }
}

impl FromStr for SecurityIdentifier {
    type Err = InvalidSidFormat;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = SidComponents::from_str(s)?;
        if components.revision != Sid::REVISION {
            return Err(InvalidSidFormat);
        }
        // SAFETY: `SidComponents::from_str` validated the sub-authority count.
        Ok(unsafe {
            Self::new_unchecked(
                components.identifier_authority,
                components.sub_authority.as_slice(),
            )
        })
    }
}

impl ToOwned for Sid {
    type Owned = SecurityIdentifier;
    #[inline]
    fn to_owned(&self) -> Self::Owned {
        self.into()
    }
}

impl Borrow<Sid> for SecurityIdentifier {
    #[inline]
    fn borrow(&self) -> &Sid {
        self.as_sid()
    }
}

impl BorrowMut<Sid> for SecurityIdentifier {
    #[inline]
    fn borrow_mut(&mut self) -> &mut Sid {
        self.as_sid_mut()
    }
}

impl Deref for SecurityIdentifier {
    type Target = Sid;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SecurityIdentifier {
    delegate!(
        to self.inner {
            #[inline]
            fn deref_mut(&mut self) -> &mut Sid;
        }
    );
}

impl AsRef<Sid> for SecurityIdentifier {
    delegate! {
        to self.inner {
            #[inline]
            fn as_ref(&self) -> &Sid;
        }
    }
}

impl AsMut<Sid> for SecurityIdentifier {
    delegate! {
        to self.inner {
            #[inline]
            fn as_mut(&mut self) -> &mut Sid;
        }
    }
}

impl Clone for SecurityIdentifier {
    #[inline]
    fn clone(&self) -> Self {
        self.as_sid().into()
    }

    #[inline]
    fn clone_from(&mut self, source: &Self) {
        if Layout::for_value(self.as_sid()) == Layout::for_value(source.as_sid()) {
            // Safety: same layout, the copy keeps every invariant of `source`.
            unsafe {
                self.as_binary_mut().copy_from_slice(source.as_binary());
            }
        } else {
            *self = source.clone();
        }
    }
}

impl Display for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}

impl Hash for SecurityIdentifier {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_sid().hash(state);
    }
}

impl Eq for SecurityIdentifier {}

impl PartialEq for SecurityIdentifier {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_sid() == other.as_sid()
    }
}

impl PartialEq<Sid> for SecurityIdentifier {
    #[inline]
    fn eq(&self, other: &Sid) -> bool {
        self.as_sid() == other
    }
}

impl PartialEq<SecurityIdentifier> for Sid {
    #[inline]
    fn eq(&self, other: &SecurityIdentifier) -> bool {
        self == other.as_sid()
    }
}

impl From<Box<Sid>> for SecurityIdentifier {
    #[inline]
    fn from(value: Box<Sid>) -> Self {
        Self { inner: value }
    }
}

impl From<SecurityIdentifier> for Box<Sid> {
    #[inline]
    fn from(value: SecurityIdentifier) -> Self {
        value.inner
    }
}

impl From<&Sid> for Box<Sid> {
    #[inline]
    fn from(value: &Sid) -> Self {
        SecurityIdentifier::from(value).inner
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::expect_used, reason = "Expect is not an issue in test")]
pub(crate) mod test {
    use super::SecurityIdentifier;
    use crate::Sid;
    use crate::sid_identifier_authority::test::arb_identifier_authority;
    use crate::sid_ptr::metadata;
    use crate::well_known;
    use proptest::prelude::*;

    pub fn arb_security_identifier() -> impl Strategy<Value = SecurityIdentifier> {
        (
            arb_identifier_authority(),
            proptest::collection::vec(any::<u32>(), 1..=15),
        )
            .prop_map(|(identifier_authority, sub_authorities)| {
                SecurityIdentifier::try_new(identifier_authority, sub_authorities)
                    .expect("Failed to generate SecurityIdentifier")
            })
    }

    proptest! {
        #[test]
        fn test_sid_to_owned_eq(security_identifier in arb_security_identifier()) {
            use alloc::borrow::ToOwned;
            let sid: &Sid = security_identifier.as_ref();
            let owned_sid = sid.to_owned();
            prop_assert_eq!(sid, owned_sid.as_sid());
        }

        #[test]
        fn test_ptr_metadata(security_identifier in arb_security_identifier()) {
            let sid: &Sid = &security_identifier;
            prop_assert_eq!(usize::from(sid.sub_authority_count()), sid.get_sub_authorities().len());
            prop_assert_eq!(usize::from(sid.sub_authority_count()), metadata(sid));
        }

        #[test]
        fn test_from_bytes_copy(sid in arb_security_identifier()) {
            let copy = SecurityIdentifier::from_bytes(sid.as_binary()).unwrap();
            prop_assert_eq!(copy, sid);
        }

        #[test]
        fn test_security_identifier_clone_from(mut sid in arb_security_identifier(), sid_source in arb_security_identifier()) {
            sid.clone_from(&sid_source);
            prop_assert_eq!(sid, sid_source);
        }
    }

    #[test]
    fn test_debug() {
        assert_eq!(
            format!("{:?}", SecurityIdentifier::from(well_known::NULL)),
            "SecurityIdentifier(S-1-0-0)",
        );
    }

    #[test]
    fn test_parse_rejects_other_revisions() {
        assert!("S-2-5-18".parse::<SecurityIdentifier>().is_err());
        assert!("S-1-5-18".parse::<SecurityIdentifier>().is_ok());
    }

    #[test]
    fn test_with_rid_limit() {
        let full: SecurityIdentifier = "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15".parse().unwrap();
        assert!(full.with_rid(16).is_none());
        let builtin: SecurityIdentifier = "S-1-5-32".parse().unwrap();
        assert_eq!(builtin.with_rid(544).unwrap(), well_known::BUILTIN_ADMINISTRATORS);
    }

    #[test]
    fn test_from_unaligned_bytes() {
        let mut buffer = [0u8; 17];
        buffer[1..].copy_from_slice(well_known::BUILTIN_USERS.as_sid().as_binary());
        let sid = SecurityIdentifier::from_bytes(&buffer[1..]).unwrap();
        assert_eq!(sid, well_known::BUILTIN_USERS);
    }
}
