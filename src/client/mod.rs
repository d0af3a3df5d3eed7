use std::sync::atomic::AtomicBool;

use crate::common::{errors::SendError, request::SendRequest};

mod tracker;
pub use tracker::Tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Connected,
    SentPending,
    Acked,
    TimedOut,
    Disconnected,
    Closed,
}

/// One PAIR channel and the context it lives in.
///
/// Both are optional because opening can fail halfway; `close` only
/// releases what was actually created.
pub struct Sender {
    context: Option<zmq::Context>,
    socket: Option<zmq::Socket>,
    endpoint: Option<String>,
    state: State,
}

impl Sender {
    pub fn open() -> Result<Self, SendError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PAIR);

        let mut sender = Sender {
            context: Some(context),
            socket: None,
            endpoint: None,
            state: State::Idle,
        };

        let socket = socket.map_err(SendError::transport("create socket"))?;
        // drop whatever is still queued on close
        socket.set_linger(0).map_err(SendError::transport("set linger"))?;
        socket.set_immediate(true).map_err(SendError::transport("set immediate"))?;
        sender.socket = Some(socket);

        Ok(sender)
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn socket(&self) -> Result<&zmq::Socket, SendError> {
        self.socket.as_ref().ok_or_else(missing_socket)
    }

    fn transition(&mut self, state: State) {
        log::debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn connect(&mut self, endpoint: &str) -> Result<(), SendError> {
        self.socket()?.connect(endpoint).map_err(SendError::transport("connect to"))?;
        self.endpoint = Some(endpoint.to_string());
        self.transition(State::Connected);
        Ok(())
    }

    pub fn send_tracked(&mut self, payload: &[u8]) -> Result<Tracker<'_>, SendError> {
        let socket = self.socket.as_ref().ok_or_else(missing_socket)?;
        log::debug!("{:?} -> {:?}", self.state, State::SentPending);
        self.state = State::SentPending;
        Ok(Tracker::new(socket, payload))
    }

    /// Records how the wait ended.
    pub fn settle(&mut self, result: &Result<(), SendError>) {
        match result {
            Ok(()) => self.transition(State::Acked),
            Err(SendError::NotDone) => self.transition(State::TimedOut),
            Err(_) => {}
        }
    }

    pub fn disconnect(&mut self) -> Result<(), SendError> {
        if let Some(endpoint) = self.endpoint.take() {
            self.socket()?.disconnect(&endpoint).map_err(SendError::transport("disconnect from"))?;
            self.transition(State::Disconnected);
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if self.state() == State::Closed {
            return;
        }

        if let Some(socket) = self.socket.take() {
            drop(socket);
            log::debug!("Channel closed");
        }

        // terminating the context waits for its sockets, so it goes last
        if let Some(context) = self.context.take() {
            drop(context);
            log::debug!("Context destroyed");
        }

        self.transition(State::Closed);
    }
}

fn missing_socket() -> SendError {
    SendError::transport("use socket")(zmq::Error::ENOTSOCK)
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.close();
    }
}

/// Connects, sends `request.message`, waits for it to go out and tears the
/// channel down again.
///
/// The channel is closed before this returns, whatever the outcome.
pub fn send(request: &SendRequest, cancel: &AtomicBool) -> Result<(), SendError> {
    log::debug!("Sending {request}");

    let mut sender = Sender::open()?;
    sender.connect(&request.endpoint())?;

    let result = sender
        .send_tracked(request.message.as_bytes())
        .and_then(|mut tracker| tracker.wait(request.timeout(), cancel));
    sender.settle(&result);

    if matches!(result, Ok(()) | Err(SendError::NotDone)) {
        if let Err(e) = sender.disconnect() {
            log::warn!("{e}");
        }
    }

    sender.close();
    result
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::{Duration, Instant};

    // PAIR listener bound on an ephemeral loopback port
    fn listener() -> (zmq::Context, zmq::Socket, u16) {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PAIR).unwrap();
        socket.set_linger(0).unwrap();
        socket.bind("tcp://127.0.0.1:*").unwrap();
        let endpoint = socket.get_last_endpoint().unwrap().unwrap();
        let port = endpoint.rsplit(':').next().unwrap().parse().unwrap();
        (context, socket, port)
    }

    fn unused_port() -> u16 {
        TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
    }

    fn request(port: u16, timeout_secs: u64) -> SendRequest {
        SendRequest { port, timeout_secs, ..Default::default() }
    }

    #[test]
    fn test_send_to_listener() {
        let (_context, socket, port) = listener();
        let cancel = AtomicBool::new(false);

        assert!(send(&request(port, 2), &cancel).is_ok());

        socket.set_rcvtimeo(2000).unwrap();
        assert_eq!(socket.recv_bytes(0).unwrap(), b"freq=100000000");
    }

    #[test]
    fn test_state_progression_with_listener() {
        let (_context, _socket, port) = listener();
        let cancel = AtomicBool::new(false);

        let mut sender = Sender::open().unwrap();
        assert_eq!(sender.state(), State::Idle);

        sender.connect(&format!("tcp://127.0.0.1:{port}")).unwrap();
        assert_eq!(sender.state(), State::Connected);

        let result = {
            let mut tracker = sender.send_tracked(b"freq=100000000").unwrap();
            assert!(!tracker.done());
            let result = tracker.wait(Duration::from_secs(2), &cancel);
            assert!(tracker.done());
            result
        };
        assert_eq!(sender.state(), State::SentPending);

        sender.settle(&result);
        assert_eq!(sender.state(), State::Acked);

        sender.disconnect().unwrap();
        assert_eq!(sender.state(), State::Disconnected);

        sender.close();
        assert_eq!(sender.state(), State::Closed);
    }

    #[test]
    fn test_no_listener_times_out() {
        let cancel = AtomicBool::new(false);
        let start = Instant::now();

        let result = send(&request(unused_port(), 1), &cancel);

        assert!(matches!(result, Err(SendError::NotDone)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1800), "took {elapsed:?}");
    }

    #[test]
    fn test_zero_timeout_without_listener() {
        let cancel = AtomicBool::new(false);
        let result = send(&request(unused_port(), 0), &cancel);
        assert!(matches!(result, Err(SendError::NotDone)));
    }

    #[test]
    fn test_cancel_before_the_wait() {
        let cancel = AtomicBool::new(false);
        cancel.store(true, Ordering::SeqCst);
        let start = Instant::now();

        let result = send(&request(unused_port(), 5), &cancel);

        assert!(matches!(result, Err(SendError::Interrupted)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_cancel_during_the_wait() {
        let cancel = AtomicBool::new(false);
        let start = Instant::now();

        let result = thread::scope(|scope| {
            scope.spawn(|| {
                thread::sleep(Duration::from_millis(200));
                cancel.store(true, Ordering::SeqCst);
            });
            send(&request(unused_port(), 5), &cancel)
        });

        assert!(matches!(result, Err(SendError::Interrupted)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_unbounded_timeout_does_not_overflow() {
        let cancel = AtomicBool::new(true);
        let result = send(&request(unused_port(), u64::MAX), &cancel);
        assert!(matches!(result, Err(SendError::Interrupted)));
    }

    #[test]
    fn test_interrupt_skips_disconnect() {
        let cancel = AtomicBool::new(true);
        let mut sender = Sender::open().unwrap();
        sender.connect(&format!("tcp://127.0.0.1:{}", unused_port())).unwrap();

        let result = sender
            .send_tracked(b"x")
            .and_then(|mut tracker| tracker.wait(Duration::from_secs(5), &cancel));
        sender.settle(&result);

        assert!(matches!(result, Err(SendError::Interrupted)));
        assert_eq!(sender.state(), State::SentPending);
    }

    #[test]
    fn test_malformed_address_fails_at_connect() {
        let cancel = AtomicBool::new(false);
        let request = SendRequest { address: "not an address".to_string(), ..Default::default() };

        let result = send(&request, &cancel);

        assert!(matches!(result, Err(SendError::Transport { action: "connect to", .. })));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut sender = Sender::open().unwrap();
        sender.close();
        sender.close();
        assert_eq!(sender.state(), State::Closed);
        assert!(sender.socket.is_none());
        assert!(sender.context.is_none());
    }

    #[test]
    fn test_close_skips_missing_socket() {
        let mut sender = Sender {
            context: Some(zmq::Context::new()),
            socket: None,
            endpoint: None,
            state: State::Idle,
        };
        sender.close();
        assert_eq!(sender.state(), State::Closed);
        assert!(sender.connect("tcp://127.0.0.1:9091").is_err());
    }
}
