//! ARM64 Synchronous Exception Handling
//!
//! Decodes traps taken from user mode and routes system calls to the
//! dispatcher.
//!
//! # Exception Levels
//! - EL0: User applications
//! - EL1: Kernel (where the handler runs)
//!
//! # Security Considerations
//! - Only SVC traps reach the syscall dispatcher
//! - The call number comes from x8 and the result goes back in x0
//! - Anything else from user mode is reported, never silently resumed

use crate::kprintln;
use crate::mm::UserMemory;
use crate::syscall;

/// Exception context saved on the stack
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionContext {
    /// General purpose registers x0-x30
    pub gpr: [u64; 31],
    /// Exception Link Register (return address)
    pub elr: u64,
    /// Saved Program Status Register
    pub spsr: u64,
    /// Exception Syndrome Register
    pub esr: u64,
    /// Fault Address Register
    pub far: u64,
}

impl ExceptionContext {
    /// A context as left by `svc #0` with call number `num` and first argument `arg0`.
    pub fn svc(num: usize, arg0: u64) -> Self {
        let mut ctx = Self {
            esr: (ExceptionClass::SvcAarch64 as u64) << 26,
            ..Self::default()
        };
        ctx.gpr[8] = num as u64;
        ctx.gpr[0] = arg0;
        ctx
    }

    /// Value returned to user mode in x0.
    #[inline]
    pub fn return_value(&self) -> i64 {
        self.gpr[0] as i64
    }
}

/// Exception class extracted from ESR_EL1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExceptionClass {
    Unknown = 0x00,
    SvcAarch64 = 0x15,
    InstructionAbortLowerEl = 0x20,
    InstructionAbortSameEl = 0x21,
    DataAbortLowerEl = 0x24,
    DataAbortSameEl = 0x25,
    Other = 0xFF,
}

impl From<u64> for ExceptionClass {
    fn from(esr: u64) -> Self {
        let ec = ((esr >> 26) & 0x3F) as u8;
        match ec {
            0x00 => ExceptionClass::Unknown,
            0x15 => ExceptionClass::SvcAarch64,
            0x20 => ExceptionClass::InstructionAbortLowerEl,
            0x21 => ExceptionClass::InstructionAbortSameEl,
            0x24 => ExceptionClass::DataAbortLowerEl,
            0x25 => ExceptionClass::DataAbortSameEl,
            _ => ExceptionClass::Other,
        }
    }
}

/// Handle a synchronous exception from lower EL (user mode)
///
/// System calls are dispatched against `mem`, the caller's address space,
/// and the result is written to x0.
///
/// # Errors
/// Returns the exception class for any trap that is not a system call;
/// the context is left untouched and the caller decides the process's fate.
pub fn handle_sync_exception_lower_el<M>(
    ctx: &mut ExceptionContext,
    mem: &M,
) -> Result<(), ExceptionClass>
where
    M: UserMemory + ?Sized,
{
    let ec = ExceptionClass::from(ctx.esr);

    match ec {
        ExceptionClass::SvcAarch64 => {
            let syscall_num = ctx.gpr[8] as usize; // x8 = syscall number
            let result = syscall::dispatch(syscall_num, ctx, mem);
            ctx.gpr[0] = result as u64; // Return value in x0
            Ok(())
        }
        ExceptionClass::DataAbortLowerEl | ExceptionClass::InstructionAbortLowerEl => {
            kprintln!("[EXCEPTION] User mode abort at 0x{:016x}", ctx.far);
            kprintln!("[EXCEPTION] ESR: 0x{:016x}", ctx.esr);
            Err(ec)
        }
        _ => {
            kprintln!("[EXCEPTION] Unhandled exception from user mode");
            kprintln!("[EXCEPTION] EC: {:?}, ESR: 0x{:016x}", ec, ctx.esr);
            Err(ec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::{AddressSpace, MapFlags, VirtAddr};
    use crate::syscall::numbers::SYS_IS_BALANCED;
    use crate::syscall::validate::regions;

    #[test]
    fn test_exception_class_decode() {
        assert_eq!(ExceptionClass::from(0x15u64 << 26), ExceptionClass::SvcAarch64);
        assert_eq!(
            ExceptionClass::from((0x24u64 << 26) | 0x1234),
            ExceptionClass::DataAbortLowerEl
        );
        assert_eq!(ExceptionClass::from(0x3Fu64 << 26), ExceptionClass::Other);
    }

    #[test]
    fn test_svc_round_trip_through_x0() {
        let data = *b"[()]\0";
        let base = VirtAddr::new(regions::USER_START);
        let mut space: AddressSpace<'_> = AddressSpace::new();
        space.map(base, &data, MapFlags::USER_RO).unwrap();

        let mut ctx = ExceptionContext::svc(SYS_IS_BALANCED, base.as_u64());
        handle_sync_exception_lower_el(&mut ctx, &space).unwrap();
        assert_eq!(ctx.return_value(), 1);
    }

    #[test]
    fn test_non_svc_trap_is_not_dispatched() {
        let space: AddressSpace<'_> = AddressSpace::new();
        let mut ctx = ExceptionContext {
            esr: 0x24 << 26,
            far: 0xdead_0000,
            ..ExceptionContext::default()
        };
        ctx.gpr[0] = 7;

        assert_eq!(
            handle_sync_exception_lower_el(&mut ctx, &space),
            Err(ExceptionClass::DataAbortLowerEl)
        );
        assert_eq!(ctx.gpr[0], 7);
    }
}
