//! The bounded FIFO queue between the reactor and the worker pool.
//!
//! A thin wrapper over `crossbeam_channel::bounded`. The reactor is the
//! sole producer; worker threads hold cloned consumers. `Sender::send`
//! blocking when the channel is full is the system's entire back-pressure
//! mechanism — there is no separate "not_full" condvar to manage, and no
//! explicit shutdown flag either: the reactor owns the `Sender` by value,
//! so dropping it when the reactor loop exits disconnects the channel,
//! and each worker's `Receiver::iter()` drains whatever is left queued
//! before observing the disconnect and returning.

use std::net::TcpStream;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

/// One unit of work submitted by the reactor: the connection a command
/// line was read from, paired with the raw (not yet parsed) line.
pub struct Task {
    pub client: Arc<TcpStream>,
    pub command_line: String,
}

/// Creates a bounded task queue with the given capacity. Returns the
/// producer half (owned by the reactor) and the consumer half (cloned
/// once per worker).
pub fn channel(capacity: usize) -> (Sender<Task>, Receiver<Task>) {
    bounded(capacity)
}
