//! System Call Handler
//!
//! Dispatches system calls and implements individual syscall handlers.
//!
//! # Security Considerations
//! - All syscall numbers are validated against the whitelist
//! - Unknown syscalls return ENOSYS
//! - Parameters are validated before use

use thiserror::Error;

use crate::exception::ExceptionContext;
use crate::mm::{UserFault, UserMemory, VirtAddr};

use super::acquire::{AcquireError, LocalBuffer};
use super::balance::{self, Verdict};

/// System call numbers
pub mod numbers {
    pub const SYS_IS_BALANCED: usize = 441;
}

/// System call error codes
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyscallError {
    /// Value too large; the matcher stack would overflow
    #[error("nesting too deep")]
    Eoverflow = -75,
    /// Invalid system call number
    #[error("function not implemented")]
    Enosys = -38,
    /// String argument has no terminator within bounds
    #[error("string too long")]
    Enametoolong = -36,
    /// Bad address (invalid pointer)
    #[error("bad address")]
    Efault = -14,
}

impl From<UserFault> for SyscallError {
    fn from(_: UserFault) -> Self {
        SyscallError::Efault
    }
}

impl From<AcquireError> for SyscallError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::AccessFault(fault) => fault.into(),
            AcquireError::TooLong { .. } => SyscallError::Enametoolong,
        }
    }
}

/// Encode a call result as the value placed in x0.
///
/// `Balanced` is 1, `Unbalanced` is 0, everything else is a negative
/// errno.
pub fn encode(result: Result<Verdict, AcquireError>) -> i64 {
    match result {
        Ok(Verdict::Balanced) => 1,
        Ok(Verdict::Unbalanced) => 0,
        Ok(Verdict::TooDeep) => SyscallError::Eoverflow as i64,
        Err(err) => SyscallError::from(err) as i64,
    }
}

/// Dispatch a system call
///
/// # Arguments
/// * `syscall_num` - System call number (from x8)
/// * `ctx` - Exception context with arguments (x0-x5)
/// * `mem` - Address space of the calling process
///
/// # Returns
/// Result value to be placed in x0
///
/// # Security
/// - Unknown syscall numbers are rejected with ENOSYS
/// - Each handler validates its own arguments
pub fn dispatch<M>(syscall_num: usize, ctx: &ExceptionContext, mem: &M) -> i64
where
    M: UserMemory + ?Sized,
{
    match syscall_num {
        numbers::SYS_IS_BALANCED => sys_is_balanced(mem, VirtAddr::from(ctx.gpr[0])),
        _ => {
            log::warn!("unknown syscall {}", syscall_num);
            SyscallError::Enosys as i64
        }
    }
}

/// Check whether a user string has matched `()` and `[]` pairs.
///
/// The string is copied into a kernel buffer first; the matcher never
/// runs on user memory or on a truncated copy.
///
/// # Errors
/// `AccessFault` if the string cannot be read, `TooLong` if it has no
/// terminator within the buffer capacity.
pub fn is_balanced<M>(mem: &M, msg: VirtAddr) -> Result<Verdict, AcquireError>
where
    M: UserMemory + ?Sized,
{
    let buf: LocalBuffer = LocalBuffer::copy_from_user(mem, msg)?;
    log::trace!("acquired {} bytes from {}", buf.len(), msg);
    Ok(balance::check(buf.as_bytes()))
}

/// Same check for a string already in kernel memory.
pub fn is_balanced_bytes(msg: &[u8]) -> Result<Verdict, AcquireError> {
    let buf: LocalBuffer = LocalBuffer::from_bytes(msg)?;
    Ok(balance::check(buf.as_bytes()))
}

/// is_balanced system call
///
/// # Arguments
/// * `msg` - User-space address of a NUL-terminated string
///
/// # Returns
/// 1 if balanced, 0 if not, negative error code on failure
///
/// # Security
/// - The string is copied once, bounded by the buffer capacity
/// - Matcher stack depth is bounded; overflow fails closed
fn sys_is_balanced<M>(mem: &M, msg: VirtAddr) -> i64
where
    M: UserMemory + ?Sized,
{
    let result = is_balanced(mem, msg);
    match &result {
        Ok(verdict) => log::debug!("is_balanced({}) = {:?}", msg, verdict),
        Err(err) => log::warn!("is_balanced({}) rejected: {}", msg, err),
    }
    encode(result)
}
