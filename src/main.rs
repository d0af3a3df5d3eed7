//! zmq-send pushes a single message to a ZeroMQ PAIR endpoint and reports whether it went out.
//!
//! It is meant for poking a running daemon with a one-off configuration string, such as a new
//! center frequency, from a shell or a script.
//!
//! # Command-Line Usage
//!
//! * `zmq-send`: Sends `freq=100000000` to `tcp://127.0.0.1:9091`.
//! * `zmq-send -I 10.0.0.5 -P 9100`: Sends to another address and port. Ports below 1024 fall back to 9091.
//! * `zmq-send -m "gain=10"`: Sends another message.
//! * `zmq-send -t 5`: Waits up to 5 seconds for the message to go out (default 2).
//!
//! # Output
//!
//! Everything goes to standard error, ending with `Good Bye!`. The exit code is 0 whatever the outcome.

mod client;
mod common;
mod arg_parser;

use anyhow::{Result, anyhow};
use clap::Parser;
use flexi_logger::{DeferredNow, Logger, LoggerHandle, WriteMode, Record};
use log::Level;
use std::io::Write;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use crate::arg_parser::*;
use crate::common::errors::SendError;


fn logger_init(level: &LogLevelOption) -> Result<LoggerHandle> {
    let log_formatter = |w: &mut dyn Write, now: &mut DeferredNow, record: &Record| -> Result<(), std::io::Error> {
        match record.level() {
            Level::Debug | Level::Trace => write!(w,
                "[{}] {}: {}",
                now.now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            ),
            _ => write!(w, "{}", record.args()),
        }
    };

    Logger::try_with_str(level.to_string())
        .map_err(|e| anyhow!("{e}"))?
        .log_to_stderr()
        .write_mode(WriteMode::Direct)
        .format_for_stderr(log_formatter)
        .start()
        .map_err(|e| anyhow!("{e}"))
}

fn outcome_line(result: &Result<(), SendError>, endpoint: &str) -> String {
    use common::strings::*;

    match result {
        Ok(()) => format!("{MESSAGE_SENT} {endpoint}"),
        Err(SendError::NotDone) => format!("{MESSAGE_NOT_SENT} {endpoint}"),
        Err(SendError::Interrupted) => INTERRUPTED.to_string(),
        Err(SendError::Input(msg)) => msg.clone(),
        Err(SendError::Transport { action, source }) => format!("Failed to {action} {endpoint}: {source}"),
    }
}

fn report(result: &Result<(), SendError>, endpoint: &str) {
    let line = outcome_line(result, endpoint);
    match result {
        Err(SendError::Transport { .. }) => log::error!("{line}"),
        _ => log::info!("{line}"),
    }
}

#[cfg(unix)]
fn interrupt_listener() -> Result<tokio::signal::unix::Signal> {
    Ok(tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?)
}

#[cfg(windows)]
fn interrupt_listener() -> Result<tokio::signal::windows::CtrlC> {
    Ok(tokio::signal::windows::ctrl_c()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let _logger = logger_init(&args.log_level)?;
    // registered up front so Ctrl-C never kills the process once the channel exists
    let mut interrupts = interrupt_listener()?;

    let request = args.into_request();
    let endpoint = request.endpoint();
    let cancel = Arc::new(AtomicBool::new(false));

    let mut task = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || client::send(&request, &cancel)
    });

    // the channel is released inside the task, so it is always awaited to completion
    let joined = tokio::select! {
        joined = &mut task => joined,
        Some(()) = interrupts.recv() => {
            log::debug!("Ctrl-C received");
            cancel.store(true, Ordering::SeqCst);
            task.await
        }
    };

    match joined {
        Ok(result) => report(&result, &endpoint),
        Err(e) => log::error!("Send task failed: {e}"),
    }

    log::info!("{}", common::strings::GOOD_BYE);
    Ok(())
}
