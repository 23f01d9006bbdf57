#[cfg(feature = "alloc")]
use crate::SecurityIdentifier;
use crate::sid::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT};
use crate::sid_ptr::from_raw_parts;
use crate::{Sid, SidIdentifierAuthority};
use core::{
    array::TryFromSliceError,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

/// Fixed-size, compile-time Security Identifier (SID).
///
/// `ConstSid<N>` stores the SID header plus exactly `N` sub-authorities as a
/// fixed-size array, making it usable in `const` contexts and suitable for
/// static embeddings. It can be viewed as a dynamically-sized `Sid` via
/// [`ConstSid::as_sid`], converted to an owning `SecurityIdentifier`, or created from
/// an existing `Sid` when the sub-authority count matches `N`.
///
/// # Invariants
/// - `sub_authority_count == N` at all times.
/// - `N` is within `1..=15`; other values fail to compile.
///
/// # Examples
/// ```rust
/// # use win_advapi_security::{ConstSid, SidIdentifierAuthority, SecurityIdentifier};
/// const ADMIN_ALIAS: ConstSid<2> = ConstSid::new(
///     1,
///     SidIdentifierAuthority::NT_AUTHORITY,
///     [32, 544],
/// );
/// assert_eq!(ADMIN_ALIAS.to_string(), "S-1-5-32-544");
/// let owned: SecurityIdentifier = ADMIN_ALIAS.into();
/// assert_eq!(owned, ADMIN_ALIAS);
/// assert_eq!(ConstSid::<2>::try_from(owned.as_sid()).unwrap(), ADMIN_ALIAS);
/// assert!(ConstSid::<3>::try_from(owned.as_sid()).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ConstSid<const N: usize> {
    /// SID revision (commonly `1`).
    pub revision: u8,
    // Always equals N; kept private to preserve invariant.
    sub_authority_count: u8,
    /// 6-byte identifier authority.
    pub identifier_authority: SidIdentifierAuthority,
    /// Fixed-size list of sub-authorities.
    pub sub_authority: [u32; N],
}

impl<const N: usize> ConstSid<N> {
    /// Creates a new `ConstSid<N>`.
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::{ConstSid, SidIdentifierAuthority};
    /// let s = ConstSid::<2>::new(1, SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);
    /// assert_eq!(s.as_sid().rid(), 544);
    /// ```
    #[must_use]
    #[inline]
    pub const fn new(
        revision: u8,
        identifier_authority: SidIdentifierAuthority,
        sub_authority: [u32; N],
    ) -> Self {
        const {
            assert!(
                N >= MIN_SUBAUTHORITY_COUNT as usize && N <= MAX_SUBAUTHORITY_COUNT as usize,
                "a SID has between 1 and 15 sub-authorities"
            );
        }
        #[expect(clippy::cast_possible_truncation, reason = "N <= 15, asserted above")]
        let sub_authority_count = N as u8;
        Self {
            revision,
            sub_authority_count,
            identifier_authority,
            sub_authority,
        }
    }

    /// Views this constant as a dynamically-sized [`Sid`].
    #[inline]
    #[must_use]
    pub const fn as_sid(&self) -> &Sid {
        // SAFETY: We construct a fat pointer to `Sid` with metadata `N` that
        // matches `sub_authority.len()`. The header layout is compatible
        // (`repr(C)`), and the trailing slice length equals N.
        unsafe { &*from_raw_parts(core::ptr::from_ref(self).cast::<()>(), N) }
    }
}

impl<const N: usize> AsRef<Sid> for ConstSid<N> {
    #[inline]
    fn as_ref(&self) -> &Sid {
        self.as_sid()
    }
}

impl<const N: usize> Hash for ConstSid<N> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_sid().hash(state);
    }
}

impl<const N: usize> PartialEq<Sid> for ConstSid<N> {
    #[inline]
    fn eq(&self, other: &Sid) -> bool {
        self.as_sid().eq(other)
    }
}

impl<const N: usize> PartialEq<ConstSid<N>> for Sid {
    #[inline]
    fn eq(&self, other: &ConstSid<N>) -> bool {
        self.eq(other.as_sid())
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> PartialEq<SecurityIdentifier> for ConstSid<N> {
    #[inline]
    fn eq(&self, other: &SecurityIdentifier) -> bool {
        self.as_sid().eq(other.as_sid())
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> PartialEq<ConstSid<N>> for SecurityIdentifier {
    #[inline]
    fn eq(&self, other: &ConstSid<N>) -> bool {
        self.as_sid().eq(other.as_sid())
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> From<ConstSid<N>> for SecurityIdentifier {
    #[inline]
    fn from(value: ConstSid<N>) -> Self {
        value.as_sid().into()
    }
}

impl<const N: usize> TryFrom<&Sid> for ConstSid<N> {
    type Error = TryFromSliceError;

    #[inline]
    fn try_from(value: &Sid) -> Result<Self, Self::Error> {
        let sub_authority: [u32; N] = value.get_sub_authorities().try_into()?;
        Ok(Self::new(
            value.revision,
            value.identifier_authority,
            sub_authority,
        ))
    }
}

impl<const N: usize> Display for ConstSid<N> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self.as_sid(), f)
    }
}
