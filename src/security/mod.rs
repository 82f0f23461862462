//! Security Primitives Module
//!
//! - Zeroization of kernel copies of user data
//!
//! # Security Properties
//! - Buffers holding user input are cleared when no longer needed
//! - Memory is cleared using volatile writes to prevent optimization

pub mod zeroize;

pub use zeroize::Zeroize;
