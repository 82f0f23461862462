//! Virtual Address Type
//!
//! Type-safe wrapper for the user addresses that cross the call gate.
//!
//! # Security Properties
//! - Addresses are plain numbers; they cannot be dereferenced directly
//! - Arithmetic is checked so a hostile pointer cannot wrap around
//! - Canonical form is enforced on construction

use core::fmt;

/// Page size (4 KiB)
pub const PAGE_SIZE: usize = 4096;
/// Page size mask
pub const PAGE_MASK: usize = PAGE_SIZE - 1;

/// Kernel virtual address base (higher-half)
pub const KERNEL_VIRT_BASE: usize = 0xFFFF_0000_0000_0000;

/// A virtual memory address.
///
/// This is a newtype wrapper that enforces the ARM64 canonical
/// address format (sign-extended from bit 47).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtAddr(usize);

impl VirtAddr {
    /// The null address.
    pub const NULL: Self = Self(0);

    /// Create a new virtual address in canonical form.
    ///
    /// ARM64 requires that bits [63:48] are all copies of bit 47.
    #[inline]
    pub const fn new(addr: usize) -> Self {
        Self(Self::make_canonical(addr))
    }

    #[inline]
    const fn make_canonical(addr: usize) -> usize {
        let bit47 = (addr >> 47) & 1;
        if bit47 == 1 {
            addr | 0xFFFF_0000_0000_0000
        } else {
            addr & 0x0000_FFFF_FFFF_FFFF
        }
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Get the raw address as u64 (for register values).
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Check if the address is page-aligned.
    #[inline]
    pub const fn is_aligned(self) -> bool {
        self.0 & PAGE_MASK == 0
    }

    /// Get the page offset (lowest 12 bits).
    #[inline]
    pub const fn page_offset(self) -> usize {
        self.0 & PAGE_MASK
    }

    /// Bytes from this address to the end of its page.
    #[inline]
    pub const fn bytes_to_page_end(self) -> usize {
        PAGE_SIZE - self.page_offset()
    }

    /// Add an offset, returning `None` if the result would wrap.
    #[inline]
    pub const fn checked_add(self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self::new(addr)),
            None => None,
        }
    }
}

impl From<u64> for VirtAddr {
    fn from(raw: u64) -> Self {
        Self::new(raw as usize)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#018x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_address() {
        let user = VirtAddr::new(0x0000_0001_0000_0000);
        assert_eq!(user.as_usize(), 0x0000_0001_0000_0000);

        let kernel = VirtAddr::new(0x0000_8000_4008_0000);
        assert_eq!(kernel.as_usize(), 0xFFFF_8000_4008_0000);
        assert!(kernel.as_usize() >= KERNEL_VIRT_BASE);
    }

    #[test]
    fn test_page_helpers() {
        let addr = VirtAddr::new(0x4000_1ff0);
        assert!(!addr.is_aligned());
        assert_eq!(addr.page_offset(), 0xff0);
        assert_eq!(addr.bytes_to_page_end(), 0x10);
    }

    #[test]
    fn test_checked_add_wraps_to_none() {
        assert!(VirtAddr::new(usize::MAX).checked_add(1).is_none());
        assert_eq!(
            VirtAddr::new(0x4000_0000).checked_add(0x10),
            Some(VirtAddr::new(0x4000_0010))
        );
    }
}
