#[cfg(not(feature = "alloc"))]
use arrayvec::ArrayString;
use cfg_if::cfg_if;
use core::fmt;
#[cfg(not(feature = "alloc"))]
use core::fmt::Write;
#[cfg(feature = "alloc")]
use core::marker::PhantomData;
#[cfg(feature = "alloc")]
use core::str::FromStr;
use serde::{Deserialize, Deserializer, de};
use serde::{Serialize, Serializer, ser};

#[cfg(feature = "std")]
use crate::DomainAndName;
#[cfg(feature = "alloc")]
use crate::SecurityIdentifier;
use crate::{ConstSid, Sid};

/// Longest SID string: `S-1-0xFFFFFFFFFFFF` followed by 15 `-4294967295`.
#[cfg(not(feature = "alloc"))]
const MAX_SID_STRING_LEN: usize = 18 + 15 * 11;

impl Serialize for Sid {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            cfg_if! {
                if #[cfg(feature = "alloc")] {
                    serializer.collect_str(self)
                } else {
                    let mut output = ArrayString::<MAX_SID_STRING_LEN>::new();
                    write!(&mut output, "{self}")
                        .map_err(|_| ser::Error::custom("SID string too long"))?;
                    serializer.serialize_str(output.as_str())
                }
            }
        } else {
            serializer.serialize_bytes(self.as_binary())
        }
    }
}

impl<'de> Deserialize<'de> for &'de Sid {
    /// Borrows the SID from binary input, it must be aligned for `u32`.
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SidVisitor;

        impl<'de> de::Visitor<'de> for SidVisitor {
            type Value = &'de Sid;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a Windows SID as aligned raw binary")
            }

            fn visit_borrowed_bytes<E>(self, v: &'de [u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Sid::from_bytes(v).map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))
            }
        }
        deserializer.deserialize_bytes(SidVisitor)
    }
}

#[cfg(feature = "alloc")]
impl Serialize for SecurityIdentifier {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_sid().serialize(serializer)
    }
}

/// Deserializes types parsed from the string form and read from the binary form.
#[cfg(feature = "alloc")]
fn deserialize_sid_like<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    for<'a> T: FromStr + TryFrom<&'a [u8]>,
{
    struct Visitor<T> {
        _marker: PhantomData<T>,
    }

    impl<T> de::Visitor<'_> for Visitor<T>
    where
        for<'a> T: FromStr + TryFrom<&'a [u8]>,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a Windows SID as a string (e.g., \"S-1-...\") or as raw binary")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::from_str(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))
        }
    }

    let visitor = Visitor::<T> {
        _marker: PhantomData,
    };
    if deserializer.is_human_readable() {
        deserializer.deserialize_str(visitor)
    } else {
        deserializer.deserialize_bytes(visitor)
    }
}

#[cfg(feature = "alloc")]
impl<'de> Deserialize<'de> for SecurityIdentifier {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_sid_like(deserializer)
    }
}

impl<const N: usize> Serialize for ConstSid<N> {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_sid().serialize(serializer)
    }
}

#[cfg(feature = "alloc")]
impl<'de, const N: usize> Deserialize<'de> for ConstSid<N> {
    /// Accepts only SIDs with exactly `N` sub-authorities.
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sid = SecurityIdentifier::deserialize(deserializer)?;
        Self::try_from(sid.as_sid()).map_err(|_| {
            de::Error::invalid_length(sid.get_sub_authorities().len(), &"N sub-authorities")
        })
    }
}

#[cfg(feature = "std")]
impl<'de> Deserialize<'de> for DomainAndName {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DomainAndNameVisitor;

        impl de::Visitor<'_> for DomainAndNameVisitor {
            type Value = DomainAndName;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a domain and name in the format 'DOMAIN\\NAME'")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DomainAndNameVisitor)
    }
}

#[cfg(feature = "std")]
impl Serialize for DomainAndName {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
