//! One-shot side-effect channel between a state container and its UI.
//!
//! Side effects are transient instructions (show a snackbar, navigate) that
//! are not part of state. Delivery policy:
//!
//! - **Single consumer**: [`SideEffectSender::subscribe`] attaches a new
//!   receiver and detaches the previous one.
//! - **At most once**: each emission reaches the current receiver once, or not
//!   at all.
//! - **Never blocks the producer**: with no receiver attached the emission is
//!   dropped; with a receiver whose buffer is full the emission is dropped.
//!
//! # Example
//!
//! ```
//! use tasklist_runtime::side_effect::{Emission, SideEffectSender};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sender = SideEffectSender::<String>::new(8);
//! assert_eq!(sender.emit("lost".to_string()), Emission::NoSubscriber);
//!
//! let mut receiver = sender.subscribe();
//! assert_eq!(sender.emit("shown".to_string()), Emission::Delivered);
//! assert_eq!(receiver.recv().await.as_deref(), Some("shown"));
//! # }
//! ```

use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Default number of undelivered side effects buffered for a slow receiver
pub const DEFAULT_CAPACITY: usize = 16;

/// Outcome of a single [`SideEffectSender::emit`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Queued for the attached receiver
    Delivered,
    /// Dropped: no receiver attached (or it was dropped)
    NoSubscriber,
    /// Dropped: the receiver's buffer is full
    Overflow,
}

/// Producer half of the side-effect channel
///
/// Cheap to clone; all clones feed the same receiver slot.
pub struct SideEffectSender<T> {
    slot: Arc<Mutex<Option<mpsc::Sender<T>>>>,
    capacity: usize,
}

impl<T> SideEffectSender<T> {
    /// Create a sender with no receiver attached
    ///
    /// `capacity` bounds how many side effects wait for a slow receiver
    /// (minimum one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            capacity: capacity.max(1),
        }
    }

    /// Attach a receiver, detaching any previous one
    ///
    /// A detached receiver still yields what was already queued for it, then ends.
    #[must_use]
    pub fn subscribe(&self) -> SideEffectReceiver<T> {
        let (tx, rx) = mpsc::channel(self.capacity);
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        SideEffectReceiver { rx }
    }

    /// Whether a live receiver is attached
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Emit a side effect without waiting
    pub fn emit(&self, value: T) -> Emission {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = slot.as_ref() else {
            tracing::trace!("Side effect dropped: no subscriber");
            return Emission::NoSubscriber;
        };

        match tx.try_send(value) {
            Ok(()) => Emission::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(capacity = self.capacity, "Side effect dropped: subscriber buffer full");
                Emission::Overflow
            },
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::trace!("Side effect dropped: subscriber went away");
                *slot = None;
                Emission::NoSubscriber
            },
        }
    }
}

impl<T> Default for SideEffectSender<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> Clone for SideEffectSender<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            capacity: self.capacity,
        }
    }
}

impl<T> std::fmt::Debug for SideEffectSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SideEffectSender")
            .field("capacity", &self.capacity)
            .field("has_subscriber", &self.has_subscriber())
            .finish()
    }
}

/// Consumer half of the side-effect channel
#[derive(Debug)]
pub struct SideEffectReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> SideEffectReceiver<T> {
    /// Wait for the next side effect
    ///
    /// Returns `None` once this receiver has been detached and drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take the next side effect if one is already queued
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Stream for SideEffectReceiver<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_emit_without_subscriber_is_dropped() {
        let sender = SideEffectSender::<u32>::default();
        assert!(!sender.has_subscriber());
        assert_eq!(sender.emit(1), Emission::NoSubscriber);
    }

    #[tokio::test]
    async fn test_each_emission_delivered_once() {
        let sender = SideEffectSender::<u32>::default();
        let mut receiver = sender.subscribe();

        assert_eq!(sender.emit(1), Emission::Delivered);
        assert_eq!(sender.emit(2), Emission::Delivered);

        assert_eq!(receiver.recv().await, Some(1));
        assert_eq!(receiver.recv().await, Some(2));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_full_buffer_drops_without_blocking() {
        let sender = SideEffectSender::<u32>::new(1);
        let mut receiver = sender.subscribe();

        assert_eq!(sender.emit(1), Emission::Delivered);
        assert_eq!(sender.emit(2), Emission::Overflow);
        assert_eq!(receiver.try_recv(), Some(1));
        assert_eq!(receiver.try_recv(), None);
    }

    #[tokio::test]
    async fn test_new_subscriber_replaces_old() {
        let sender = SideEffectSender::<u32>::default();
        let mut first = sender.subscribe();
        sender.emit(1);

        let mut second = sender.subscribe();
        sender.emit(2);

        assert_eq!(first.recv().await, Some(1));
        assert_eq!(first.recv().await, None);
        assert_eq!(second.recv().await, Some(2));
    }

    #[test]
    fn test_dropped_receiver_detaches() {
        let sender = SideEffectSender::<u32>::default();
        let receiver = sender.subscribe();
        assert!(sender.has_subscriber());

        drop(receiver);
        assert!(!sender.has_subscriber());
        assert_eq!(sender.emit(1), Emission::NoSubscriber);
    }

    #[tokio::test]
    async fn test_receiver_is_a_stream() {
        let sender = SideEffectSender::<u32>::default();
        let receiver = sender.subscribe();
        sender.emit(7);
        sender.emit(8);
        drop(sender);

        let collected: Vec<u32> = receiver.collect().await;
        assert_eq!(collected, vec![7, 8]);
    }
}
