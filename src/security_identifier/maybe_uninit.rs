use crate::sid_ptr::from_raw_parts_mut;
use crate::{SecurityIdentifier, Sid, SidSizeInfo};
use alloc::alloc::{alloc, dealloc, handle_alloc_error};
use alloc::boxed::Box;
use core::{alloc::Layout, mem::ManuallyDrop, ptr::NonNull};

/// Owns uninitialized memory for a `Sid` of a given size.
///
/// The value is not considered initialized until `assume_init` is called;
/// dropping the helper before that releases the memory without reading it.
pub(super) struct MaybeUninitSecurityIdentifier {
    ptr: NonNull<Sid>,
    layout: Layout,
}

impl MaybeUninitSecurityIdentifier {
    /// Allocates storage and builds the fat pointer, nothing is initialized.
    pub fn alloc(size_info: SidSizeInfo) -> Self {
        let layout = size_info.get_layout();

        // SAFETY: `layout` has a non-zero size (at least one sub-authority).
        let mem_ptr = unsafe { alloc(layout) };
        let Some(base) = NonNull::new(mem_ptr) else {
            handle_alloc_error(layout)
        };

        let sid_ptr = from_raw_parts_mut(
            base.as_ptr().cast::<()>(),
            usize::from(size_info.get_sub_authority_count()),
        );
        // SAFETY: `sid_ptr` has the same address as `base`, which is non-null.
        let ptr = unsafe { NonNull::new_unchecked(sid_ptr) };

        Self { ptr, layout }
    }

    /// Raw pointer to the uninitialized `Sid`; only write through it until
    /// every field is set.
    pub const fn as_mut_ptr(&mut self) -> *mut Sid {
        self.ptr.as_ptr()
    }

    /// Hands the allocation over to a `SecurityIdentifier`.
    ///
    /// # Safety
    /// Every byte of the `Sid` must have been initialized with a valid value.
    pub unsafe fn assume_init(self) -> SecurityIdentifier {
        let this = ManuallyDrop::new(self);
        // SAFETY: the pointer comes from the global allocator with the layout
        // of a `Sid` of this count, ownership moves to the `Box` and `Drop`
        // of `self` is suppressed by `ManuallyDrop`.
        let inner = unsafe { Box::from_raw(this.ptr.as_ptr()) };
        SecurityIdentifier { inner }
    }
}

impl Drop for MaybeUninitSecurityIdentifier {
    fn drop(&mut self) {
        // SAFETY: allocated in `alloc` with `self.layout` and not handed over.
        unsafe {
            dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout);
        }
    }
}
