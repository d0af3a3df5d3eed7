use std::time::Duration;

pub const DEFAULT_PORT: u16 = 9091;
// ports below this one are reserved and replaced by DEFAULT_PORT
pub const MINIMAL_PORT: u16 = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;
pub const WAIT_POLL_SLICE: Duration = Duration::from_millis(50);
