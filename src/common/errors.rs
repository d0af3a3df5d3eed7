use std::fmt;


/// Ways a send can end short of delivery.
#[derive(Debug)]
pub enum SendError {
	/// Rejected request options. No option check raises it yet.
	#[allow(dead_code)]
	Input(String),
	/// Delivery was not confirmed within the wait window.
	NotDone,
	/// The user interrupted the operation.
	Interrupted,
	/// The transport refused an operation, e.g. a malformed endpoint.
	Transport {
		action: &'static str,
		source: zmq::Error,
	},
}

impl SendError {
	pub fn transport(action: &'static str) -> impl FnOnce(zmq::Error) -> Self {
		move |source| SendError::Transport { action, source }
	}
}

impl fmt::Display for SendError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Input(msg) => write!(f, "{msg}"),
			Self::NotDone => write!(f, "not done"),
			Self::Interrupted => write!(f, "interrupted"),
			Self::Transport { action, source } => write!(f, "failed to {action}: {source}"),
		}
	}
}

impl std::error::Error for SendError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Transport { source, .. } => Some(source),
			_ => None,
		}
	}
}
