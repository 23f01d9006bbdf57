use core::ffi::c_void;
use core::mem::size_of;
use core::ptr;
use std::os::windows::io::AsRawHandle;

use windows_sys::Win32::Foundation::{ERROR_BAD_LENGTH, ERROR_INSUFFICIENT_BUFFER};
use windows_sys::Win32::Security::{
    GetTokenInformation, PSID, SID_AND_ATTRIBUTES, TOKEN_ELEVATION, TOKEN_GROUPS,
    TOKEN_MANDATORY_LABEL, TOKEN_OWNER, TOKEN_PRIMARY_GROUP, TOKEN_USER,
};

use super::{GroupAttributes, ImpersonationLevel, Token, TokenError, TokenInformationClass, TokenType};
use crate::sid_lookup::MAX_FILL_ATTEMPTS;
use crate::sid_size_info::SidSizeInfo;
use crate::{SecurityIdentifier, Sid, Win32Error};

/// Buffer filled by `GetTokenInformation`.
///
/// The structures it holds point into the buffer itself (the SIDs of
/// `TOKEN_USER`, `TOKEN_GROUPS`...), so they are only valid as long as
/// the buffer lives. The storage is 8-byte aligned.
pub struct TokenInformation {
    class: TokenInformationClass,
    words: Vec<u64>,
    len: usize,
}

impl TokenInformation {
    /// The information class this buffer was queried for.
    #[inline]
    #[must_use]
    pub const fn class(&self) -> TokenInformationClass {
        self.class
    }

    /// The bytes written by the system.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `len` never exceeds the byte size of `words`.
        unsafe { core::slice::from_raw_parts(self.words.as_ptr().cast::<u8>(), self.len) }
    }

    /// Number of bytes written by the query.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the query returned no data.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    const fn malformed(&self) -> TokenError {
        TokenError::MalformedInformation {
            class: self.class,
            len: self.len,
        }
    }

    /// Views the start of the buffer as the fixed part of the class structure.
    ///
    /// # Safety
    /// `T` must be the structure returned for `self.class`, with an
    /// alignment of at most 8.
    unsafe fn header<T>(&self) -> Result<&T, TokenError> {
        if self.len < size_of::<T>() {
            return Err(self.malformed());
        }
        // SAFETY: the buffer is large enough and aligned, the caller
        // guarantees the structure type.
        Ok(unsafe { &*self.words.as_ptr().cast::<T>() })
    }

    /// Resolves a SID pointer of a returned structure, which must point
    /// inside the buffer.
    fn embedded_sid(&self, sid: PSID) -> Result<&Sid, TokenError> {
        let bytes = self.as_bytes();
        sid.addr()
            .checked_sub(bytes.as_ptr().addr())
            .and_then(|offset| bytes.get(offset..))
            .and_then(|tail| {
                let size = SidSizeInfo::from_count(*tail.get(1)?)?.size();
                Sid::from_bytes(tail.get(..size)?).ok()
            })
            .ok_or_else(|| self.malformed())
    }

    /// `SID_AND_ATTRIBUTES` entries of a `TOKEN_GROUPS` structure.
    fn groups(&self) -> Result<&[SID_AND_ATTRIBUTES], TokenError> {
        // SAFETY: only called for classes returning `TOKEN_GROUPS`.
        let header = unsafe { self.header::<TOKEN_GROUPS>() }?;
        let count = header.GroupCount as usize;
        let end = count
            .checked_mul(size_of::<SID_AND_ATTRIBUTES>())
            .and_then(|size| size.checked_add(core::mem::offset_of!(TOKEN_GROUPS, Groups)));
        if end.is_none_or(|end| end > self.len) {
            return Err(self.malformed());
        }
        // SAFETY: the entries are contiguous and inside the buffer (checked above).
        Ok(unsafe {
            let first = self
                .words
                .as_ptr()
                .byte_add(core::mem::offset_of!(TOKEN_GROUPS, Groups))
                .cast::<SID_AND_ATTRIBUTES>();
            core::slice::from_raw_parts(first, count)
        })
    }

    fn dword(&self) -> Result<u32, TokenError> {
        // SAFETY: any 4 bytes are a valid `u32`.
        unsafe { self.header::<u32>() }.copied()
    }
}

impl core::fmt::Debug for TokenInformation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenInformation")
            .field("class", &self.class)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// A group of a token with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenGroup {
    /// The group SID.
    pub sid: SecurityIdentifier,
    /// `SE_GROUP_*` attributes of the group in this token.
    pub attributes: GroupAttributes,
}

impl TokenGroup {
    /// Whether the group is used for access checks (enabled and not deny-only).
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.attributes.is_enabled()
    }
}

const fn is_size_error(error: Win32Error) -> bool {
    matches!(error.code(), ERROR_INSUFFICIENT_BUFFER | ERROR_BAD_LENGTH)
}

impl Token {
    /// Queries one information class (`GetTokenInformation`).
    ///
    /// Requires [`TokenAccess::QUERY`](crate::TokenAccess::QUERY)
    /// ([`TokenAccess::QUERY_SOURCE`](crate::TokenAccess::QUERY_SOURCE) for
    /// [`TokenInformationClass::Source`]).
    ///
    /// # Errors
    /// [`TokenError::GetTokenSizeFailed`] when the size query succeeds,
    /// [`TokenError::GetTokenInfoFailed`] for any other failure.
    #[inline]
    pub fn information_raw(&self, class: TokenInformationClass) -> Result<TokenInformation, TokenError> {
        let handle = self.as_raw_handle();
        let mut len = 0u32;
        // SAFETY: size query, no buffer is written.
        let ok = unsafe { GetTokenInformation(handle, class.into(), ptr::null_mut(), 0, &raw mut len) };
        if ok != 0 {
            return Err(TokenError::GetTokenSizeFailed(class));
        }
        let error = Win32Error::last("GetTokenInformation");
        if !is_size_error(error) {
            return Err(TokenError::GetTokenInfoFailed(error));
        }

        for _ in 0..MAX_FILL_ATTEMPTS {
            let mut words = vec![0u64; (len as usize).div_ceil(size_of::<u64>())];
            let capacity = len;
            // SAFETY: `words` holds at least `capacity` writable bytes.
            let ok = unsafe {
                GetTokenInformation(
                    handle,
                    class.into(),
                    words.as_mut_ptr().cast::<c_void>(),
                    capacity,
                    &raw mut len,
                )
            };
            if ok != 0 {
                return Ok(TokenInformation {
                    class,
                    words,
                    len: len.min(capacity) as usize,
                });
            }
            let error = Win32Error::last("GetTokenInformation");
            if !is_size_error(error) {
                return Err(TokenError::GetTokenInfoFailed(error));
            }
            log::trace!("{class} grew to {len} bytes");
        }
        Err(TokenError::GetTokenInfoFailed(Win32Error::from_code(
            "GetTokenInformation",
            ERROR_INSUFFICIENT_BUFFER,
        )))
    }

    /// Calls `f` with the user SID of the token, without copying it.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn with_user<R>(&self, f: impl FnOnce(&Sid) -> R) -> Result<R, TokenError> {
        let information = self.information_raw(TokenInformationClass::User)?;
        // SAFETY: `TokenUser` returns a `TOKEN_USER`.
        let user = unsafe { information.header::<TOKEN_USER>() }?;
        information.embedded_sid(user.User.Sid).map(f)
    }

    /// The user SID of the token.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn user(&self) -> Result<SecurityIdentifier, TokenError> {
        self.with_user(|sid| sid.into())
    }

    /// The groups of the token with their attributes.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn groups(&self) -> Result<Vec<TokenGroup>, TokenError> {
        let information = self.information_raw(TokenInformationClass::Groups)?;
        information
            .groups()?
            .iter()
            .map(|group| -> Result<TokenGroup, TokenError> {
                Ok(TokenGroup {
                    sid: information.embedded_sid(group.Sid)?.into(),
                    attributes: GroupAttributes::from_bits_retain(group.Attributes),
                })
            })
            .collect()
    }

    /// Whether `sid` is an enabled group of the token.
    ///
    /// This only reads the token, unlike `CheckTokenMembership` it does not
    /// perform an access check.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn has_group(&self, sid: &Sid) -> Result<bool, TokenError> {
        let information = self.information_raw(TokenInformationClass::Groups)?;
        for group in information.groups()? {
            if GroupAttributes::from_bits_retain(group.Attributes).is_enabled()
                && information.embedded_sid(group.Sid)? == sid
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Default owner of the objects created with this token.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn owner(&self) -> Result<SecurityIdentifier, TokenError> {
        let information = self.information_raw(TokenInformationClass::Owner)?;
        // SAFETY: `TokenOwner` returns a `TOKEN_OWNER`.
        let owner = unsafe { information.header::<TOKEN_OWNER>() }?;
        information.embedded_sid(owner.Owner).map(SecurityIdentifier::from)
    }

    /// Default primary group of the objects created with this token.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn primary_group(&self) -> Result<SecurityIdentifier, TokenError> {
        let information = self.information_raw(TokenInformationClass::PrimaryGroup)?;
        // SAFETY: `TokenPrimaryGroup` returns a `TOKEN_PRIMARY_GROUP`.
        let group = unsafe { information.header::<TOKEN_PRIMARY_GROUP>() }?;
        information
            .embedded_sid(group.PrimaryGroup)
            .map(SecurityIdentifier::from)
    }

    /// Mandatory integrity label of the token, e.g.
    /// [`MEDIUM_MANDATORY_LEVEL`](crate::well_known::MEDIUM_MANDATORY_LEVEL).
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn integrity_level(&self) -> Result<SecurityIdentifier, TokenError> {
        let information = self.information_raw(TokenInformationClass::IntegrityLevel)?;
        // SAFETY: `TokenIntegrityLevel` returns a `TOKEN_MANDATORY_LABEL`.
        let label = unsafe { information.header::<TOKEN_MANDATORY_LABEL>() }?;
        information
            .embedded_sid(label.Label.Sid)
            .map(SecurityIdentifier::from)
    }

    /// Primary or impersonation token.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn token_type(&self) -> Result<TokenType, TokenError> {
        let information = self.information_raw(TokenInformationClass::Type)?;
        let raw = information.dword()?;
        i32::try_from(raw)
            .ok()
            .and_then(|raw| TokenType::try_from(raw).ok())
            .ok_or_else(|| information.malformed())
    }

    /// Impersonation level of an impersonation token.
    ///
    /// # Errors
    /// Fails for primary tokens, see [`Token::information_raw`].
    #[inline]
    pub fn impersonation_level(&self) -> Result<ImpersonationLevel, TokenError> {
        let information = self.information_raw(TokenInformationClass::ImpersonationLevel)?;
        let raw = information.dword()?;
        i32::try_from(raw)
            .ok()
            .and_then(|raw| ImpersonationLevel::try_from(raw).ok())
            .ok_or_else(|| information.malformed())
    }

    /// Whether the token is elevated (UAC).
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn is_elevated(&self) -> Result<bool, TokenError> {
        let information = self.information_raw(TokenInformationClass::Elevation)?;
        // SAFETY: `TokenElevation` returns a `TOKEN_ELEVATION`.
        let elevation = unsafe { information.header::<TOKEN_ELEVATION>() }?;
        Ok(elevation.TokenIsElevated != 0)
    }

    /// Terminal Services session of the token.
    ///
    /// # Errors
    /// See [`Token::information_raw`].
    #[inline]
    pub fn session_id(&self) -> Result<u32, TokenError> {
        self.information_raw(TokenInformationClass::SessionId)?.dword()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::{TokenAccess, well_known};

    fn process_token() -> Token {
        Token::current_process(TokenAccess::QUERY).unwrap()
    }

    #[test]
    fn user_is_valid() {
        let token = process_token();
        let user = token.user().unwrap();
        assert!(user.is_valid());
        assert_eq!(token.with_user(|sid| sid.len_bytes()).unwrap(), user.len_bytes());
    }

    #[test]
    fn groups_contain_everyone() {
        let token = process_token();
        let groups = token.groups().unwrap();
        let world = groups
            .iter()
            .find(|group| group.sid == well_known::WORLD)
            .unwrap();
        assert!(world.is_enabled());
        assert!(token.has_group(well_known::WORLD.as_sid()).unwrap());
        assert!(!token.has_group(well_known::ANONYMOUS.as_sid()).unwrap());
    }

    #[test]
    fn owner_and_primary_group() {
        let token = process_token();
        assert!(token.owner().unwrap().is_valid());
        assert!(token.primary_group().unwrap().is_valid());
    }

    #[test]
    fn integrity_level_is_a_mandatory_label() {
        let level = process_token().integrity_level().unwrap();
        assert_eq!(
            level.identifier_authority,
            crate::SidIdentifierAuthority::MANDATORY_LABEL_AUTHORITY
        );
    }

    #[test]
    fn fixed_size_classes() {
        let token = process_token();
        assert_eq!(token.token_type().unwrap(), TokenType::Primary);
        let _ = token.is_elevated().unwrap();
        let _ = token.session_id().unwrap();
    }

    #[test]
    fn primary_token_has_no_impersonation_level() {
        let error = process_token().impersonation_level().unwrap_err();
        assert!(matches!(error, TokenError::GetTokenInfoFailed(_)));
    }

    #[test]
    fn raw_buffer() {
        let information = process_token()
            .information_raw(TokenInformationClass::User)
            .unwrap();
        assert_eq!(information.class(), TokenInformationClass::User);
        assert!(information.len() >= size_of::<TOKEN_USER>());
        assert_eq!(information.as_bytes().len(), information.len());
    }

    #[test]
    fn query_needs_access() {
        let token = Token::current_process(TokenAccess::DUPLICATE).unwrap();
        let error = token.user().unwrap_err();
        assert_eq!(error.win32().map(|e| e.code()), Some(5));
    }
}
