use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::common::{self, errors::SendError};


/// In-flight state of one frame handed to a [`super::Sender`].
///
/// The socket runs with `ZMQ_IMMEDIATE`, so it only reports itself writable
/// once a peer has completed the connection handshake. The frame is handed
/// over at that point, which is what marks the tracker as done.
pub struct Tracker<'a> {
    socket: &'a zmq::Socket,
    payload: Vec<u8>,
    done: bool,
}

impl<'a> Tracker<'a> {
    pub(super) fn new(socket: &'a zmq::Socket, payload: &[u8]) -> Self {
        Tracker { socket, payload: payload.to_vec(), done: false }
    }

    pub fn done(&self) -> bool {
        self.done
    }

    /// Blocks for at most `timeout`, checking `cancel` between poll slices.
    ///
    /// A timeout too large to be represented as an instant never expires.
    pub fn wait(&mut self, timeout: Duration, cancel: &AtomicBool) -> Result<(), SendError> {
        let deadline = Instant::now().checked_add(timeout);

        while !self.done() {
            if cancel.load(Ordering::SeqCst) {
                return Err(SendError::Interrupted);
            }

            let slice = deadline
                .map_or(common::consts::WAIT_POLL_SLICE, |deadline| {
                    deadline
                        .saturating_duration_since(Instant::now())
                        .min(common::consts::WAIT_POLL_SLICE)
                });

            match self.socket.poll(zmq::POLLOUT, slice.as_millis() as i64) {
                Ok(0) => {}
                Ok(_) => self.try_hand_over()?,
                Err(zmq::Error::EINTR) => return Err(SendError::Interrupted),
                Err(e) => return Err(SendError::transport("poll")(e)),
            }

            if !self.done && deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(SendError::NotDone);
            }
        }

        Ok(())
    }

    fn try_hand_over(&mut self) -> Result<(), SendError> {
        match self.socket.send(self.payload.as_slice(), zmq::DONTWAIT) {
            Ok(()) => {
                self.done = true;
                Ok(())
            }
            // the peer went away between the poll and the send
            Err(zmq::Error::EAGAIN) => Ok(()),
            Err(zmq::Error::EINTR) => Err(SendError::Interrupted),
            Err(e) => Err(SendError::transport("send")(e)),
        }
    }
}
