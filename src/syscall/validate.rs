//! System Call Input Validation
//!
//! Provides secure validation and copying for user pointers.
//!
//! # Security Principles
//! - Validate ALL inputs before use
//! - Fail-secure: deny by default
//! - Prevent common vulnerabilities:
//!   - Buffer overflows (bounds checking)
//!   - TOCTOU races (copy to kernel space before inspecting)
//!   - Null pointer dereference (explicit checks)
//!   - Unterminated strings (bounded copy)

use crate::mm::{UserFault, UserMemory, VirtAddr};

/// User-space memory regions
///
/// In a real system, these would be per-process and managed by the VMM.
/// For now, we define a simple user space region.
pub mod regions {
    /// Start of user-accessible memory
    pub const USER_START: usize = 0x4000_0000;
    /// End of user-accessible memory (before kernel)
    pub const USER_END: usize = 0x4008_0000;
}

/// A validated user-space address range
///
/// This type guarantees that:
/// - The range is within user-space bounds
/// - The end address doesn't overflow
///
/// It does not guarantee the range is mapped; reads can still fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRange {
    start: VirtAddr,
    len: usize,
}

impl UserRange {
    /// Split the range at page boundaries.
    ///
    /// Yields `(address, length)` pairs; no pair crosses a page.
    pub fn page_chunks(&self) -> PageChunks {
        PageChunks {
            next: self.start.as_usize(),
            remaining: self.len,
        }
    }
}

/// Iterator returned by [`UserRange::page_chunks`].
#[derive(Debug, Clone)]
pub struct PageChunks {
    next: usize,
    remaining: usize,
}

impl Iterator for PageChunks {
    type Item = (VirtAddr, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let addr = VirtAddr::new(self.next);
        let len = addr.bytes_to_page_end().min(self.remaining);
        self.next += len;
        self.remaining -= len;
        Some((addr, len))
    }
}

/// Validate a user-space read range
///
/// # Returns
/// * `Ok(UserRange)` - Validated range
/// * `Err(UserFault)` - Validation failed at the reported address
///
/// # Security Checks
/// 1. Pointer is not null
/// 2. Pointer is within user space
/// 3. Pointer + length doesn't overflow
/// 4. End address is within user space
pub fn validate_user_read(addr: VirtAddr, len: usize) -> Result<UserRange, UserFault> {
    // Zero-length ranges are valid
    if len == 0 {
        return Ok(UserRange { start: addr, len: 0 });
    }

    if addr.is_null() {
        return Err(UserFault::new(addr));
    }

    let start = addr.as_usize();
    if !(regions::USER_START..regions::USER_END).contains(&start) {
        return Err(UserFault::new(addr));
    }

    let end = start.checked_add(len).ok_or(UserFault::new(addr))?;
    if end > regions::USER_END {
        return Err(UserFault::new(VirtAddr::new(regions::USER_END)));
    }

    Ok(UserRange { start: addr, len })
}

/// Copy a NUL-terminated string from user space.
///
/// Copies at most `dst.len()` bytes from `src`, stopping after the first
/// NUL. Returns the string length (terminator excluded). A return value
/// equal to `dst.len()` means no terminator was found within `dst.len()`
/// bytes.
///
/// The copy proceeds a page at a time, so a string that ends just before
/// an unmapped page is copied without touching that page.
///
/// # Errors
/// Fails with the faulting address if `src` is not a user address, if a
/// page holding part of the string is not readable, or if the string runs
/// into the end of user space before its terminator.
///
/// Bytes of `dst` past the returned length are unspecified.
pub fn strncpy_from_user<M>(mem: &M, src: VirtAddr, dst: &mut [u8]) -> Result<usize, UserFault>
where
    M: UserMemory + ?Sized,
{
    if dst.is_empty() {
        return Ok(0);
    }

    validate_user_read(src, 1)?;
    let room = regions::USER_END - src.as_usize();
    let range = validate_user_read(src, dst.len().min(room))?;

    let mut copied = 0;
    for (addr, len) in range.page_chunks() {
        let window = &mut dst[copied..copied + len];
        mem.read(addr, window)?;
        if let Some(nul) = window.iter().position(|&b| b == 0) {
            return Ok(copied + nul);
        }
        copied += len;
    }

    if copied < dst.len() {
        // Ran off the end of user space with no terminator.
        return Err(UserFault::new(VirtAddr::new(regions::USER_END)));
    }
    Ok(copied)
}
