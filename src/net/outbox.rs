use heapless::{Deque, String};

use crate::error::Error;

/// Outbound side of the message transport.
pub trait Transport {
    /// Best-effort publish. Failures are reported, never retried.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Error>;
}

/// One queued publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Publish {
    pub topic: String<64>,
    pub payload: String<32>,
}

/// Bounded publish queue drained by the firmware loop after each dispatch.
pub struct Outbox<const N: usize> {
    queue: Deque<Publish, N>,
    connected: bool,
}

impl<const N: usize> Outbox<N> {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            connected: false,
        }
    }

    /// Link state as seen by the modem task.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            // No offline queueing: anything not yet sent is dropped.
            self.queue.clear();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn pop(&mut self) -> Option<Publish> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<const N: usize> Default for Outbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Transport for Outbox<N> {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Error> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        let mut item = Publish {
            topic: String::new(),
            payload: String::new(),
        };
        item.topic
            .push_str(topic)
            .map_err(|_| Error::BufferOverflow)?;
        item.payload
            .push_str(payload)
            .map_err(|_| Error::BufferOverflow)?;
        self.queue.push_back(item).map_err(|_| Error::QueueFull)
    }
}
