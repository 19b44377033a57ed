#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for improved allocation throughput.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[path = "cli.rs"]
mod cli;

use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
    let mut stderr = io::stderr().lock();
    cli::run(env::args_os(), &mut stderr)
}
