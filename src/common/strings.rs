// request defaults
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_MESSAGE: &str = "freq=100000000";

// report
pub const MESSAGE_SENT: &str = "Message sent to";
pub const MESSAGE_NOT_SENT: &str = "Message not sent to";
pub const INTERRUPTED: &str = "Interrupted";
pub const GOOD_BYE: &str = "Good Bye!";
