//! Kernel Console
//!
//! Serial-style text output for diagnostics. The console writes through a
//! sink function supplied at boot: a UART transmit routine on hardware, or
//! stderr when the kernel code runs hosted. Until a sink is attached all
//! output is dropped.
//!
//! The `log` facade is routed here by [`ConsoleLogger`].
//!
//! # Security Considerations
//! - Output never feeds back into syscall results
//! - Uses spinlock for thread-safe access

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Destination for console text.
pub type Sink = fn(&str);

/// Console driver
pub struct Console {
    sink: Option<Sink>,
}

impl Console {
    /// Create a console with no sink attached.
    pub const fn new() -> Self {
        Self { sink: None }
    }

    /// Route output to `sink`.
    pub fn attach(&mut self, sink: Sink) {
        self.sink = Some(sink);
    }

    /// Write a string to the console
    pub fn write_str(&self, s: &str) {
        if let Some(sink) = self.sink {
            sink(s);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Console::write_str(self, s);
        Ok(())
    }
}

/// Global console instance protected by spinlock
pub static CONSOLE: Mutex<Console> = Mutex::new(Console::new());

/// Print macro for kernel output
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let mut console = $crate::drivers::console::CONSOLE.lock();
        let _ = write!(console, $($arg)*);
    }};
}

/// Println macro for kernel output
#[macro_export]
macro_rules! kprintln {
    () => {
        $crate::kprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::kprint!($($arg)*);
        $crate::kprint!("\n");
    }};
}

/// `log` backend that prints through the console.
///
/// Lines look like `[WARN] bracket_gate::syscall::handler: ...`.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // One lock for the whole line so concurrent records do not interleave.
        let mut console = CONSOLE.lock();
        let _ = writeln!(
            console,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Attach `sink` to the console and install [`ConsoleLogger`].
///
/// # Errors
/// Fails if a logger was already installed; the sink is attached anyway.
pub fn init_logging(sink: Sink, level: LevelFilter) -> Result<(), SetLoggerError> {
    CONSOLE.lock().attach(sink);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
