//! The common channel.
//!
//! `SEND` and `RECV` let organisms exchange single bytes with whatever the
//! host wires up: another simulation, a file, a pipe, nothing at all. The
//! engine only sees two optional functors. Both directions are non-blocking
//! by contract; the engine never suspends waiting on the channel, and a
//! detached or empty channel simply yields nothing.

/// Host functor consuming one outbound byte.
pub type Sender = Box<dyn FnMut(u8) + Send>;

/// Host functor producing one inbound byte, or `None` when nothing waits.
pub type Receiver = Box<dyn FnMut() -> Option<u8> + Send>;

/// The engine side of the common channel.
#[derive(Default)]
pub struct Channel {
    sender: Option<Sender>,
    receiver: Option<Receiver>,
}

impl Channel {
    /// Creates a detached channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the outbound functor, replacing any previous one.
    pub fn set_sender(&mut self, sender: Sender) {
        self.sender = Some(sender);
    }

    /// Attaches the inbound functor, replacing any previous one.
    pub fn set_receiver(&mut self, receiver: Receiver) {
        self.receiver = Some(receiver);
    }

    /// Detaches the outbound functor.
    pub fn clear_sender(&mut self) {
        self.sender = None;
    }

    /// Detaches the inbound functor.
    pub fn clear_receiver(&mut self) {
        self.receiver = None;
    }

    /// Emits one byte; dropped silently when no sender is attached.
    pub(crate) fn send(&mut self, byte: u8) {
        if let Some(sender) = self.sender.as_mut() {
            sender(byte);
        }
    }

    /// Fetches one byte; `None` when detached or nothing is available.
    pub(crate) fn receive(&mut self) -> Option<u8> {
        self.receiver.as_mut().and_then(|receiver| receiver())
    }
}

impl std::fmt::Debug for Channel {
    /// Formats attachment state; the functors themselves are opaque.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("sender", &self.sender.is_some())
            .field("receiver", &self.receiver.is_some())
            .finish()
    }
}
