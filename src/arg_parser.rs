use clap::{Parser, ValueEnum};
use std::fmt;

use crate::common::{self, request::SendRequest};



// report lines are logged at info, so there is no quieter level than that
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevelOption {
    Info,
    Debug,
}

impl fmt::Display for LogLevelOption {
 fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
        Self::Info => write!(f, "info"),
        Self::Debug => write!(f, "debug"),
    }
 }
}

/// Sends one message to a ZeroMQ PAIR endpoint and waits for it to go out.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// IP address of the ZMQ server
    #[arg(short = 'I', long = "ip-address", value_name = "ADDRESS")]
    pub address: Option<String>,
    /// TCP port of the ZMQ server (ports below 1024 fall back to 9091)
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,
    /// Message to send to the ZMQ server
    #[arg(short, long, value_name = "STRING")]
    pub message: Option<String>,
    /// Send timeout in seconds (default 2)
    #[arg(short, long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
    #[arg(long, value_enum, default_value_t = LogLevelOption::Info, hide = true)]
    pub log_level: LogLevelOption,
}

impl Cli {
    pub fn into_request(self) -> SendRequest {
        SendRequest {
            address: self.address.unwrap_or_else(|| common::strings::DEFAULT_ADDRESS.to_string()),
            port: effective_port(self.port),
            message: self.message.unwrap_or_else(|| common::strings::DEFAULT_MESSAGE.to_string()),
            timeout_secs: self.timeout.unwrap_or(common::consts::DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub fn effective_port(port: Option<u16>) -> u16 {
    match port {
        Some(port) if port >= common::consts::MINIMAL_PORT => port,
        _ => common::consts::DEFAULT_PORT,
    }
}
