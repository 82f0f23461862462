//! bracket-gate - Bracket Balance Check Behind a Hardened Call Gate
//!
//! Kernel-side implementation of the `is_balanced` system call: a user
//! process passes the address of a NUL-terminated string and gets back
//! whether its `()` and `[]` pairs are matched and properly nested.
//!
//! # Security Features
//! - User memory is only read through the `UserMemory` seam
//! - Bounded copy into a fixed kernel buffer before any inspection
//! - Matcher stack is bounded; both underflow and overflow are checked
//! - Kernel copies of user strings are wiped after use
//!
//! # Layout
//! - `syscall`: acquisition, matcher, handler and dispatcher
//! - `exception`: SVC trap decoding
//! - `mm`: addresses and user address spaces
//! - `drivers`: console and `log` backend
//! - `security`: zeroization
//!
//! The library is `no_std` and never allocates.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod drivers;
pub mod exception;
pub mod mm;
pub mod security;
pub mod syscall;

pub use exception::{handle_sync_exception_lower_el, ExceptionClass, ExceptionContext};
pub use syscall::{is_balanced, AcquireError, SyscallError, Verdict};
