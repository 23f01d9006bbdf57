use crate::sid::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT, SID_HEAD_SIZE};
use crate::utils::sub_authority_size_guard;
use core::alloc::Layout;
use core::mem::{align_of, size_of};

/// Validated sub-authority count, used to size SID allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SidSizeInfo {
    sub_authority_count: u8,
}

impl SidSizeInfo {
    pub const MIN: Self = Self {
        sub_authority_count: MIN_SUBAUTHORITY_COUNT,
    };
    pub const MAX: Self = Self {
        sub_authority_count: MAX_SUBAUTHORITY_COUNT,
    };

    pub const fn from_count(sub_authority_count: u8) -> Option<Self> {
        if sub_authority_size_guard(sub_authority_count as usize) {
            Some(Self {
                sub_authority_count,
            })
        } else {
            None
        }
    }

    #[inline]
    pub const fn get_sub_authority_count(self) -> u8 {
        self.sub_authority_count
    }

    /// Size in bytes of the SID (`GetSidLengthRequired`).
    #[inline]
    pub const fn size(self) -> usize {
        SID_HEAD_SIZE + self.sub_authority_count as usize * size_of::<u32>()
    }

    pub const fn get_layout(self) -> Layout {
        match Layout::from_size_align(self.size(), align_of::<u32>()) {
            Ok(layout) => layout,
            Err(_) => unreachable!(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod test {
    use super::*;
    use crate::sid::Sid;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_layout_properties(sub_authority_count in 1u8..=15) {
            let info = SidSizeInfo::from_count(sub_authority_count).unwrap();
            let layout = info.get_layout();
            prop_assert_eq!(layout.size(), SID_HEAD_SIZE + usize::from(sub_authority_count) * size_of::<u32>());
            prop_assert_eq!(layout.align(), align_of::<u32>());
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(SidSizeInfo::from_count(0).is_none());
        assert!(SidSizeInfo::from_count(16).is_none());
    }

    #[test]
    fn layout_matches_the_dst() {
        let sid = crate::well_known::BUILTIN_ADMINISTRATORS;
        let sid: &Sid = sid.as_sid();
        assert_eq!(
            Layout::for_value(sid),
            SidSizeInfo::from_count(2).unwrap().get_layout()
        );
    }

    #[cfg(all(windows, feature = "std"))]
    mod windows {
        use super::super::*;
        use proptest::prelude::*;
        use windows_sys::Win32::Security::GetSidLengthRequired;

        proptest! {
            #[test]
            fn test_prop_full_size_compare_windows(sub_authority_count in 1u8..=15) {
                let info = SidSizeInfo::from_count(sub_authority_count).ok_or(TestCaseError::fail("count"))?;
                // SAFETY: GetSidLengthRequired has no preconditions.
                let winsize = unsafe { GetSidLengthRequired(sub_authority_count) } as usize;
                prop_assert_eq!(info.size(), winsize);
            }
        }
    }
}
