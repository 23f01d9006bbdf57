//! Fat-pointer helpers for the [`Sid`] DST on stable Rust.
//!
//! `Sid` ends with a `[u32]` tail, so its pointer metadata is the slice length.
//! Casting a `*const [()]` of length `n` to `*const Sid` yields a pointer whose
//! tail covers exactly `n` sub-authorities.

use crate::sid::Sid;

pub(crate) const fn from_raw_parts(src: *const (), sub_authority_count: usize) -> *const Sid {
    core::ptr::slice_from_raw_parts(src, sub_authority_count) as *const Sid
}

pub(crate) const fn from_raw_parts_mut(src: *mut (), sub_authority_count: usize) -> *mut Sid {
    core::ptr::slice_from_raw_parts_mut(src, sub_authority_count) as *mut Sid
}

#[cfg(test)]
pub(crate) const fn metadata(sid: *const Sid) -> usize {
    let slice = sid as *const [()];
    slice.len()
}
