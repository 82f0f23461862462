//! Device drivers
//!
//! All drivers follow these security principles:
//! - No unsafe code unless the device requires it
//! - No panics on invalid input (return errors)

pub mod console;

pub use console::{init_logging, Console, ConsoleLogger, Sink, CONSOLE};
