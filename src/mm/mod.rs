//! Memory management module
//!
//! Provides:
//! - Canonical virtual address type
//! - The `UserMemory` seam through which all user bytes are read
//! - A page-granular simulated user address space
//!
//! # Security Principles
//! - User pointers are numbers until a `UserMemory` read succeeds
//! - Every user access can fail, and failure is a value, not a panic

mod address;
mod user;

pub use address::{VirtAddr, KERNEL_VIRT_BASE, PAGE_MASK, PAGE_SIZE};
pub use user::{AddressSpace, MapError, MapFlags, UserFault, UserMemory, MAX_MAPPINGS};
