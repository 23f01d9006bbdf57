use core::ffi::c_void;
use core::ptr::NonNull;

use windows_sys::Win32::Foundation::LocalFree;

/// Memory handed out by the system with `LocalAlloc`, released with
/// `LocalFree` on drop.
///
/// Used for the pointer-to-pointer outputs of `ConvertSidToStringSidW` and
/// `ConvertStringSidToSidW`.
pub(crate) struct LocalBox<T> {
    ptr: NonNull<T>,
}

impl<T> LocalBox<T> {
    /// Takes ownership of a `LocalAlloc` allocation, `None` when `ptr` is null.
    ///
    /// # Safety
    /// `ptr` must be null or come from `LocalAlloc` and not be freed elsewhere.
    pub unsafe fn from_raw(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    pub const fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for LocalBox<T> {
    fn drop(&mut self) {
        // SAFETY: the pointer comes from `LocalAlloc` and is owned by `self`.
        let leaked = unsafe { LocalFree(self.ptr.as_ptr().cast::<c_void>()) };
        if !leaked.is_null() {
            log::debug!("LocalFree failed, allocation at {:p} leaked", self.ptr);
        }
    }
}
