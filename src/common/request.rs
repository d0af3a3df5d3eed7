use std::fmt;
use std::time::Duration;

use crate::common;


/// A single message to deliver, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
	pub address: String,
	pub port: u16,
	pub message: String,
	pub timeout_secs: u64,
}

impl Default for SendRequest {
	fn default() -> Self {
		SendRequest {
			address: common::strings::DEFAULT_ADDRESS.to_string(),
			port: common::consts::DEFAULT_PORT,
			message: common::strings::DEFAULT_MESSAGE.to_string(),
			timeout_secs: common::consts::DEFAULT_TIMEOUT_SECS,
		}
	}
}

impl SendRequest {
	pub fn endpoint(&self) -> String {
		format!("tcp://{}:{}", self.address, self.port)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

impl fmt::Display for SendRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?} to {} (wait up to {})",
			self.message,
			self.endpoint(),
			humantime::format_duration(self.timeout()))
	}
}
