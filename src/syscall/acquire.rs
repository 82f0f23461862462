//! Bounded Input Acquisition
//!
//! Brings an untrusted, NUL-terminated user string into a fixed-size
//! kernel buffer. Nothing downstream ever looks at user memory again: the
//! matcher only sees the [`LocalBuffer`].
//!
//! # Security Properties
//! - Worst-case copy is bounded by the buffer capacity
//! - Unreadable or unterminated input is rejected before any inspection
//! - The buffer is wiped when dropped

use thiserror::Error;

use crate::mm::{UserFault, UserMemory, VirtAddr};
use crate::security::Zeroize;

use super::validate::strncpy_from_user;

/// Capacity of the kernel copy, terminator included.
pub const INPUT_CAPACITY: usize = 256;

/// Why a user string could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquireError {
    /// The string could not be read safely.
    #[error("input not readable: {0}")]
    AccessFault(#[from] UserFault),
    /// No terminator within the first `capacity` bytes.
    #[error("input has no terminator within {capacity} bytes")]
    TooLong { capacity: usize },
}

/// Kernel-owned, NUL-terminated copy of a user string.
///
/// Invariants:
/// - `len < N`, and `bytes[len..]` is all zero
/// - contents never change after acquisition
pub struct LocalBuffer<const N: usize = INPUT_CAPACITY> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> LocalBuffer<N> {
    /// Copy the string at `src` out of `mem`.
    pub fn copy_from_user<M>(mem: &M, src: VirtAddr) -> Result<Self, AcquireError>
    where
        M: UserMemory + ?Sized,
    {
        let mut buf = Self {
            bytes: [0; N],
            len: 0,
        };
        let copied = strncpy_from_user(mem, src, &mut buf.bytes)?;
        buf.seal(copied)?;
        Ok(buf)
    }

    /// Copy a kernel-resident string, stopping at its first NUL if any.
    ///
    /// Applies the same capacity rule as [`copy_from_user`](Self::copy_from_user).
    pub fn from_bytes(src: &[u8]) -> Result<Self, AcquireError> {
        let len = src.iter().position(|&b| b == 0).unwrap_or(src.len());
        let mut buf = Self {
            bytes: [0; N],
            len: 0,
        };
        if len >= N {
            return Err(AcquireError::TooLong { capacity: N });
        }
        buf.bytes[..len].copy_from_slice(&src[..len]);
        buf.seal(len)?;
        Ok(buf)
    }

    fn seal(&mut self, copied: usize) -> Result<(), AcquireError> {
        if copied >= N {
            return Err(AcquireError::TooLong { capacity: N });
        }
        // Drop whatever followed the terminator in the last copied page.
        self.bytes[copied..].fill(0);
        self.len = copied;
        Ok(())
    }

    /// The string contents, terminator excluded.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// String length, terminator excluded.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }
}

impl<const N: usize> Drop for LocalBuffer<N> {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl<const N: usize> core::fmt::Debug for LocalBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Contents are user data; only the shape is printed.
        f.debug_struct("LocalBuffer")
            .field("len", &self.len)
            .field("capacity", &N)
            .finish()
    }
}
