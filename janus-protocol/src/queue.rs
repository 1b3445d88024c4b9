//! Inbound message queue
//!
//! Decoded payloads wait here until the control loop picks them up. The
//! queue is bounded and never blocks: when full, the oldest payload is
//! dropped to make room. A registered callback sees every payload at the
//! moment it is queued.

use heapless::Deque;

use crate::frame::Payload;

/// Default queue depth required by the door operator link
pub const DEFAULT_QUEUE_DEPTH: usize = 4;

/// Callback invoked synchronously with each newly queued payload
pub type MessageCallback = fn(&[u8]);

/// Bounded FIFO of decoded payloads
pub struct MessageQueue<const N: usize = DEFAULT_QUEUE_DEPTH> {
    messages: Deque<Payload, N>,
    callback: Option<MessageCallback>,
}

impl<const N: usize> Default for MessageQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for MessageQueue<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("len", &self.messages.len())
            .field("capacity", &N)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl<const N: usize> MessageQueue<N> {
    /// Create an empty queue with no callback
    pub const fn new() -> Self {
        Self {
            messages: Deque::new(),
            callback: None,
        }
    }

    /// Register (or clear) the new-message callback
    pub fn set_callback(&mut self, callback: Option<MessageCallback>) {
        self.callback = callback;
    }

    /// Queue a payload
    ///
    /// Returns the payload that was dropped to make room, if any.
    pub fn push(&mut self, payload: Payload) -> Option<Payload> {
        let dropped = if self.messages.is_full() {
            self.messages.pop_front()
        } else {
            None
        };

        // Cannot fail: a slot was freed above when the queue was full
        let _ = self.messages.push_back(payload);

        if let (Some(callback), Some(newest)) = (self.callback, self.messages.back()) {
            callback(newest);
        }

        dropped
    }

    /// Take the oldest queued payload
    pub fn pop(&mut self) -> Option<Payload> {
        self.messages.pop_front()
    }

    /// Number of queued payloads
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if no payloads are queued
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
