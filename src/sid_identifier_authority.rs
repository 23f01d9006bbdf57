/// The 6-byte, big-endian identifier authority of a SID
/// (`SID_IDENTIFIER_AUTHORITY`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SidIdentifierAuthority {
    /// Raw big-endian value.
    pub value: [u8; 6],
}

impl SidIdentifierAuthority {
    /// `SECURITY_NULL_SID_AUTHORITY` (0).
    pub const NULL_AUTHORITY: Self = Self::from_u8(0);
    /// `SECURITY_WORLD_SID_AUTHORITY` (1).
    pub const SECURITY_WORLD_AUTHORITY: Self = Self::from_u8(1);
    /// `SECURITY_LOCAL_SID_AUTHORITY` (2).
    pub const SECURITY_LOCAL_AUTHORITY: Self = Self::from_u8(2);
    /// `SECURITY_CREATOR_SID_AUTHORITY` (3).
    pub const SECURITY_CREATOR_AUTHORITY: Self = Self::from_u8(3);
    /// `SECURITY_NON_UNIQUE_AUTHORITY` (4).
    pub const SECURITY_NON_UNIQUE_AUTHORITY: Self = Self::from_u8(4);
    /// `SECURITY_NT_AUTHORITY` (5).
    pub const NT_AUTHORITY: Self = Self::from_u8(5);
    /// `SECURITY_APP_PACKAGE_AUTHORITY` (15).
    pub const APP_PACKAGE_AUTHORITY: Self = Self::from_u8(15);
    /// `SECURITY_MANDATORY_LABEL_AUTHORITY` (16).
    pub const MANDATORY_LABEL_AUTHORITY: Self = Self::from_u8(16);

    /// Wraps a raw big-endian value.
    #[inline]
    #[must_use]
    pub const fn new(value: [u8; 6]) -> Self {
        Self { value }
    }

    const fn from_u8(low: u8) -> Self {
        Self::new([0, 0, 0, 0, 0, low])
    }

    /// Numeric value of the authority (at most 48 bits).
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        let [a, b, c, d, e, f] = self.value;
        u64::from_be_bytes([0, 0, a, b, c, d, e, f])
    }
}

impl From<[u8; 6]> for SidIdentifierAuthority {
    #[inline]
    fn from(value: [u8; 6]) -> Self {
        Self { value }
    }
}

impl From<SidIdentifierAuthority> for [u8; 6] {
    #[inline]
    fn from(value: SidIdentifierAuthority) -> Self {
        value.value
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use proptest::prelude::*;

    /// Named authorities, plus arbitrary 48-bit values that display in hex.
    pub fn arb_identifier_authority() -> impl Strategy<Value = SidIdentifierAuthority> {
        prop_oneof![
            prop_oneof![0u8..=5, Just(15u8), Just(16u8)]
                .prop_map(|val| SidIdentifierAuthority::from([0, 0, 0, 0, 0, val])),
            any::<[u8; 6]>().prop_map(SidIdentifierAuthority::from),
            ((1u64 << 32)..(1u64 << 48)).prop_map(|val| {
                let [_, _, a, b, c, d, e, f] = val.to_be_bytes();
                SidIdentifierAuthority::from([a, b, c, d, e, f])
            }),
        ]
    }

    #[test]
    fn numeric_value() {
        assert_eq!(SidIdentifierAuthority::NT_AUTHORITY.as_u64(), 5);
        assert_eq!(
            SidIdentifierAuthority::new([0, 0x10, 0, 0, 0, 1]).as_u64(),
            0x0010_0000_0001
        );
    }
}
