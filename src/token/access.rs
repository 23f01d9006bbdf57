use bitflags::bitflags;

bitflags! {
    /// Access rights requested when opening or creating a token
    /// (`TOKEN_ACCESS_MASK`).
    ///
    /// # Examples
    /// ```rust
    /// # use win_advapi_security::TokenAccess;
    /// let access = TokenAccess::QUERY | TokenAccess::DUPLICATE;
    /// assert_eq!(access.bits(), 0x000A);
    /// assert!(TokenAccess::ALL_ACCESS.contains(access));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenAccess: u32 {
        /// `TOKEN_ASSIGN_PRIMARY`
        const ASSIGN_PRIMARY = 0x0001;
        /// `TOKEN_DUPLICATE`
        const DUPLICATE = 0x0002;
        /// `TOKEN_IMPERSONATE`
        const IMPERSONATE = 0x0004;
        /// `TOKEN_QUERY`
        const QUERY = 0x0008;
        /// `TOKEN_QUERY_SOURCE`
        const QUERY_SOURCE = 0x0010;
        /// `TOKEN_ADJUST_PRIVILEGES`
        const ADJUST_PRIVILEGES = 0x0020;
        /// `TOKEN_ADJUST_GROUPS`
        const ADJUST_GROUPS = 0x0040;
        /// `TOKEN_ADJUST_DEFAULT`
        const ADJUST_DEFAULT = 0x0080;
        /// `TOKEN_ADJUST_SESSIONID`
        const ADJUST_SESSIONID = 0x0100;

        /// `DELETE`
        const DELETE = 0x0001_0000;
        /// `READ_CONTROL`
        const READ_CONTROL = 0x0002_0000;
        /// `WRITE_DAC`
        const WRITE_DAC = 0x0004_0000;
        /// `WRITE_OWNER`
        const WRITE_OWNER = 0x0008_0000;

        /// `TOKEN_READ`
        const READ = Self::READ_CONTROL.bits() | Self::QUERY.bits();
        /// `TOKEN_WRITE`
        const WRITE = Self::READ_CONTROL.bits()
            | Self::ADJUST_PRIVILEGES.bits()
            | Self::ADJUST_GROUPS.bits()
            | Self::ADJUST_DEFAULT.bits();
        /// `TOKEN_EXECUTE`
        const EXECUTE = Self::READ_CONTROL.bits();
        /// `TOKEN_ALL_ACCESS`
        const ALL_ACCESS = 0x000F_01FF;
    }
}

bitflags! {
    /// Attributes of a group in a token (`SE_GROUP_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GroupAttributes: u32 {
        /// `SE_GROUP_MANDATORY`
        const MANDATORY = 0x0000_0001;
        /// `SE_GROUP_ENABLED_BY_DEFAULT`
        const ENABLED_BY_DEFAULT = 0x0000_0002;
        /// `SE_GROUP_ENABLED`
        const ENABLED = 0x0000_0004;
        /// `SE_GROUP_OWNER`
        const OWNER = 0x0000_0008;
        /// `SE_GROUP_USE_FOR_DENY_ONLY`
        const USE_FOR_DENY_ONLY = 0x0000_0010;
        /// `SE_GROUP_INTEGRITY`
        const INTEGRITY = 0x0000_0020;
        /// `SE_GROUP_INTEGRITY_ENABLED`
        const INTEGRITY_ENABLED = 0x0000_0040;
        /// `SE_GROUP_RESOURCE`
        const RESOURCE = 0x2000_0000;
        /// `SE_GROUP_LOGON_ID`
        const LOGON_ID = 0xC000_0000;

        const _ = !0;
    }
}

impl GroupAttributes {
    /// Whether a group with these attributes is used for access checks
    /// (enabled and not deny-only).
    #[inline]
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.contains(Self::ENABLED) && !self.contains(Self::USE_FOR_DENY_ONLY)
    }
}
