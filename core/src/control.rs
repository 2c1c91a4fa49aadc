//! Shared runtime flags mutated by the Protocol layer itself.
//!
//! `MODE_SINGLE`, `MODE_MULTI`, and `SHUTDOWN` are wire commands, which means
//! whatever holds the flags they flip has to be reachable from
//! `protocol::execute`, not just from the server's `main`. `ServerControl` is
//! that shared state: constructed once in `main`, wrapped in an `Arc`, and
//! handed to every worker and to the reactor alike.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Runtime-mutable server state, safe to share across the reactor and every
/// worker thread via `Arc<ServerControl>`.
pub struct ServerControl {
    running: AtomicBool,
    single_threaded: AtomicBool,
    /// Held by a worker around `protocol::execute` for the duration of a
    /// single command, but only while `single_threaded` is true. Acts as the
    /// global execution mutex `MODE_SINGLE` asks for.
    exec_mutex: Mutex<()>,
}

impl ServerControl {
    /// Starts running, in multi-threaded mode.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            single_threaded: AtomicBool::new(false),
            exec_mutex: Mutex::new(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signals every loop polling `is_running` to wind down. Idempotent.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_single_threaded(&self) -> bool {
        self.single_threaded.load(Ordering::SeqCst)
    }

    pub fn set_single_threaded(&self, value: bool) {
        self.single_threaded.store(value, Ordering::SeqCst);
    }

    /// Execution mutex guarding command dispatch in single-threaded mode.
    /// Callers acquire this themselves around `protocol::execute` when
    /// `is_single_threaded()` is true; it is not acquired implicitly so that
    /// multi-threaded mode pays zero locking cost.
    pub fn exec_mutex(&self) -> &Mutex<()> {
        &self.exec_mutex
    }
}

impl Default for ServerControl {
    fn default() -> Self {
        Self::new()
    }
}
