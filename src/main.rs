//! Command-line harness for the is_balanced system call.
//!
//! Maps the argument into a fresh user address space, traps into the
//! handler exactly as `svc #0` would, and reports what came back in x0.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;
use std::process;

use bracket_gate::drivers::init_logging;
use bracket_gate::mm::{AddressSpace, MapFlags, VirtAddr};
use bracket_gate::syscall::numbers::SYS_IS_BALANCED;
use bracket_gate::syscall::validate::regions;
use bracket_gate::{handle_sync_exception_lower_el, ExceptionContext};
use clap::{ArgAction, Parser};
use log::LevelFilter;

/// Make the is_balanced system call with a string.
#[derive(Debug, Parser)]
#[command(name = "is-balanced")]
#[command(about = "Check a string for matched () and [] pairs via the is_balanced system call")]
struct Cli {
    /// String to give to the system call. Passed as raw bytes.
    input: Option<OsString>,
    /// Pass this raw user address (hex) instead of the mapped string.
    ///
    /// The input string is optional with this flag; when given it is
    /// still mapped at the start of user space.
    #[arg(long, value_parser = parse_addr)]
    addr: Option<u64>,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|err| format!("invalid address {s:?}: {err}"))
}

fn stderr_sink(s: &str) {
    eprint!("{s}");
}

/// Trap into the handler once and return the value left in x0, or -1 if
/// the call could not be made.
fn run(cli: &Cli) -> i64 {
    let mut arg = Vec::new();
    match (&cli.input, cli.addr) {
        (Some(input), _) => {
            println!("Making system call with \"{}\".", input.to_string_lossy());
            arg.extend_from_slice(input.as_bytes());
            arg.push(0);
        }
        (None, Some(addr)) => println!("Making system call with address {addr:#x}."),
        (None, None) => {
            println!("Must provide a string to give to system call.");
            return -1;
        }
    }

    let base = VirtAddr::new(regions::USER_START);
    let mut space: AddressSpace<'_> = AddressSpace::new();
    if !arg.is_empty() {
        if let Err(err) = space.map(base, &arg, MapFlags::USER_RO) {
            eprintln!("cannot map argument: {err}");
            return -1;
        }
    }

    let arg0 = cli.addr.unwrap_or(base.as_u64());
    let mut ctx = ExceptionContext::svc(SYS_IS_BALANCED, arg0);
    if let Err(ec) = handle_sync_exception_lower_el(&mut ctx, &space) {
        eprintln!("trap not handled: {ec:?}");
        return -1;
    }

    let res = ctx.return_value();
    println!("System call returned {res}.");
    res
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = init_logging(stderr_sink, level) {
        eprintln!("logger unavailable: {err}");
    }

    process::exit(run(&cli) as i32);
}
