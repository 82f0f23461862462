//! Secure Memory Zeroization
//!
//! Kernel-side copies of user strings are wiped before their stack slot is
//! reused, so one caller's input never lingers where a later call (or a
//! memory disclosure bug) could see it.
//!
//! # Design
//! - `Zeroize` trait for buffers that can be securely cleared
//! - Volatile writes prevent compiler optimization of zeroing

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};

/// Trait for buffers that can be securely zeroed.
///
/// Implementations must ensure that all data is overwritten
/// with zeros in a way that cannot be optimized away.
pub trait Zeroize {
    /// Overwrite this value with zeros.
    fn zeroize(&mut self);
}

impl Zeroize for [u8] {
    fn zeroize(&mut self) {
        for byte in self.iter_mut() {
            // SAFETY: `byte` is a valid, aligned, exclusive reference
            unsafe {
                ptr::write_volatile(byte, 0);
            }
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl<const N: usize> Zeroize for [u8; N] {
    fn zeroize(&mut self) {
        self.as_mut_slice().zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroize_slice() {
        let mut data = [0x42u8; 16];
        data[4..].zeroize();
        assert!(data[..4].iter().all(|&b| b == 0x42));
        assert!(data[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zeroize_array() {
        let mut data = [0x42u8; 256];
        data.zeroize();
        assert!(data.iter().all(|&b| b == 0));
    }
}
