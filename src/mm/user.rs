//! User Memory Access
//!
//! The kernel never dereferences a user pointer directly. Every access to
//! caller-owned memory goes through [`UserMemory`], which either copies the
//! requested bytes or reports the faulting address.
//!
//! [`AddressSpace`] is a fixed-slot, page-granular model of a process
//! address space. It needs no heap, so it works the same in the kernel and
//! in hosted tools.
//!
//! # Security Properties
//! - Reads require both `READ` and `USER` permission on the mapping
//! - A read that leaves its mapping faults instead of truncating
//! - Mappings never overlap and never reach into the kernel half

use bitflags::bitflags;
use thiserror::Error;

use super::address::{VirtAddr, KERNEL_VIRT_BASE, PAGE_SIZE};

/// Maximum number of mappings in an [`AddressSpace`] by default.
pub const MAX_MAPPINGS: usize = 8;

/// A user access that could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("user access fault at {addr}")]
pub struct UserFault {
    /// First address that could not be read.
    pub addr: VirtAddr,
}

impl UserFault {
    #[inline]
    pub const fn new(addr: VirtAddr) -> Self {
        Self { addr }
    }
}

/// Source of caller-owned bytes.
///
/// Callers split their reads at page boundaries, so an implementation only
/// has to answer for one page at a time.
pub trait UserMemory {
    /// Copy `dst.len()` bytes starting at `addr` into `dst`.
    ///
    /// On error the contents of `dst` are unspecified.
    fn read(&self, addr: VirtAddr, dst: &mut [u8]) -> Result<(), UserFault>;
}

bitflags! {
    /// Access permissions of a user mapping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MapFlags: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        /// Accessible on behalf of EL0.
        const USER = 1 << 2;

        const USER_RO = Self::READ.bits() | Self::USER.bits();
        const USER_RW = Self::READ.bits() | Self::WRITE.bits() | Self::USER.bits();
    }
}

/// Errors from building an [`AddressSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("mapping at {0} is empty")]
    Empty(VirtAddr),
    #[error("mapping base {0} is not page aligned")]
    Misaligned(VirtAddr),
    #[error("mapping at {0} leaves user space")]
    NotUser(VirtAddr),
    #[error("mapping at {0} overlaps an existing mapping")]
    Overlap(VirtAddr),
    #[error("no free mapping slot for {0}")]
    Full(VirtAddr),
}

/// One mapped region.
///
/// The region spans whole pages; bytes past `data` up to the page end
/// read as zero.
#[derive(Debug, Clone, Copy)]
struct Mapping<'a> {
    base: VirtAddr,
    data: &'a [u8],
    flags: MapFlags,
}

impl Mapping<'_> {
    /// Mapped length in bytes, rounded up to whole pages.
    #[inline]
    const fn span(&self) -> usize {
        self.data.len().div_ceil(PAGE_SIZE) * PAGE_SIZE
    }

    fn end(&self) -> usize {
        self.base.as_usize() + self.span()
    }

    fn contains(&self, addr: VirtAddr) -> bool {
        addr >= self.base && addr.as_usize() < self.end()
    }
}

/// A process address space built from borrowed byte regions.
#[derive(Debug, Clone)]
pub struct AddressSpace<'a, const N: usize = MAX_MAPPINGS> {
    slots: [Option<Mapping<'a>>; N],
}

impl<'a, const N: usize> AddressSpace<'a, N> {
    /// An address space with nothing mapped.
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Map `data` at `base` with the given permissions.
    pub fn map(&mut self, base: VirtAddr, data: &'a [u8], flags: MapFlags) -> Result<(), MapError> {
        if data.is_empty() {
            return Err(MapError::Empty(base));
        }
        if !base.is_aligned() {
            return Err(MapError::Misaligned(base));
        }

        let candidate = Mapping { base, data, flags };
        let end = base
            .as_usize()
            .checked_add(candidate.span())
            .ok_or(MapError::NotUser(base))?;
        if base.is_null() || end > KERNEL_VIRT_BASE {
            return Err(MapError::NotUser(base));
        }

        let overlaps = self
            .mappings()
            .any(|m| base.as_usize() < m.end() && m.base.as_usize() < end);
        if overlaps {
            return Err(MapError::Overlap(base));
        }

        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(MapError::Full(base))?;
        *slot = Some(candidate);
        log::trace!("mapped {} bytes at {} ({:?})", data.len(), base, flags);
        Ok(())
    }

    fn mappings(&self) -> impl Iterator<Item = &Mapping<'a>> {
        self.slots.iter().flatten()
    }

    fn find(&self, addr: VirtAddr) -> Option<&Mapping<'a>> {
        self.mappings().find(|m| m.contains(addr))
    }
}

impl<const N: usize> Default for AddressSpace<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> UserMemory for AddressSpace<'_, N> {
    fn read(&self, addr: VirtAddr, dst: &mut [u8]) -> Result<(), UserFault> {
        if dst.is_empty() {
            return Ok(());
        }

        let mapping = self.find(addr).ok_or(UserFault::new(addr))?;
        if !mapping.flags.contains(MapFlags::READ | MapFlags::USER) {
            return Err(UserFault::new(addr));
        }

        // `find` guarantees addr >= base.
        let offset = addr.as_usize() - mapping.base.as_usize();
        if offset + dst.len() > mapping.span() {
            return Err(UserFault::new(VirtAddr::new(mapping.end())));
        }

        let backed = mapping.data.get(offset..).unwrap_or(&[]);
        let n = backed.len().min(dst.len());
        dst[..n].copy_from_slice(&backed[..n]);
        dst[n..].fill(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: VirtAddr = VirtAddr::new(0x4000_0000);

    #[test]
    fn test_read_mapped_bytes() {
        let data = *b"hello\0";
        let mut space: AddressSpace<'_> = AddressSpace::new();
        space.map(BASE, &data, MapFlags::USER_RO).unwrap();

        let mut out = [0xAAu8; 6];
        space.read(BASE, &mut out).unwrap();
        assert_eq!(&out, b"hello\0");
    }

    #[test]
    fn test_tail_of_page_reads_as_zero() {
        let data = *b"ab";
        let mut space: AddressSpace<'_> = AddressSpace::new();
        space.map(BASE, &data, MapFlags::USER_RO).unwrap();

        let mut out = [0xAAu8; 4];
        space.read(BASE.checked_add(1).unwrap(), &mut out).unwrap();
        assert_eq!(out, [b'b', 0, 0, 0]);
    }

    #[test]
    fn test_unmapped_address_faults() {
        let space: AddressSpace<'_> = AddressSpace::new();
        let mut out = [0u8; 1];
        assert_eq!(space.read(BASE, &mut out), Err(UserFault::new(BASE)));
    }

    #[test]
    fn test_read_past_mapping_faults() {
        let data = [1u8; 16];
        let mut space: AddressSpace<'_> = AddressSpace::new();
        space.map(BASE, &data, MapFlags::USER_RO).unwrap();

        let last = BASE.checked_add(PAGE_SIZE - 1).unwrap();
        let mut out = [0u8; 2];
        let fault = space.read(last, &mut out).unwrap_err();
        assert_eq!(fault.addr, BASE.checked_add(PAGE_SIZE).unwrap());
    }

    #[test]
    fn test_kernel_only_mapping_faults() {
        let data = [1u8; 16];
        let mut space: AddressSpace<'_> = AddressSpace::new();
        space.map(BASE, &data, MapFlags::READ).unwrap();

        let mut out = [0u8; 1];
        assert!(space.read(BASE, &mut out).is_err());
    }

    #[test]
    fn test_map_rejects_bad_regions() {
        let data = [1u8; 16];
        let mut space: AddressSpace<'_, 1> = AddressSpace::new();

        assert_eq!(
            space.map(BASE, &[], MapFlags::USER_RO),
            Err(MapError::Empty(BASE))
        );
        let odd = VirtAddr::new(0x4000_0010);
        assert_eq!(
            space.map(odd, &data, MapFlags::USER_RO),
            Err(MapError::Misaligned(odd))
        );
        let kernel = VirtAddr::new(KERNEL_VIRT_BASE);
        assert_eq!(
            space.map(kernel, &data, MapFlags::USER_RO),
            Err(MapError::NotUser(kernel))
        );

        space.map(BASE, &data, MapFlags::USER_RO).unwrap();
        assert_eq!(
            space.map(BASE, &data, MapFlags::USER_RO),
            Err(MapError::Overlap(BASE))
        );
        let next = BASE.checked_add(PAGE_SIZE).unwrap();
        assert_eq!(
            space.map(next, &data, MapFlags::USER_RO),
            Err(MapError::Full(next))
        );
    }
}
