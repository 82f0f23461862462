//! System Call Interface
//!
//! Provides the bracket-balance check as a system call.
//!
//! # Security Model
//! - Whitelist approach: only explicitly implemented syscalls are allowed
//! - User strings are copied into a bounded kernel buffer before use
//! - Invalid inputs return errors, never panic
//!
//! # Current Syscalls
//! - 441: is_balanced(msg) - 1 if `()`/`[]` are matched, 0 if not

mod acquire;
mod balance;
mod handler;
pub mod validate;

pub use acquire::{AcquireError, LocalBuffer, INPUT_CAPACITY};
pub use balance::{check, scan, Bracket, MatchStack, StackFull, Token, Verdict, Violation, MAX_DEPTH};
pub use handler::{dispatch, encode, is_balanced, is_balanced_bytes, numbers, SyscallError};
pub use validate::{strncpy_from_user, validate_user_read, UserRange};
