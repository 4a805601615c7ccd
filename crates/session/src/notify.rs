//! Coarse change notification for session observers.
//!
//! One message per applied mutation; observers re-read session state on
//! receipt rather than diffing granular events.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// A subscription to session change notifications.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Best-effort fan-out to subscribers.
///
/// Dead subscribers (dropped receivers) are removed while publishing.
#[derive(Debug)]
pub struct Notifier<M> {
    subscribers: Vec<mpsc::Sender<M>>,
}

impl<M> Default for Notifier<M> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<M: Clone> Notifier<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription::new(rx)
    }

    pub fn publish(&mut self, message: M) {
        self.subscribers
            .retain(|tx| tx.send(message.clone()).is_ok());
    }
}
