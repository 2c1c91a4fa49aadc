//! # Ledger & Protocol Constants
//!
//! Every magic number that the `Ledger` and wire `Protocol` depend on lives
//! here. If you're hardcoding a constant somewhere else, you're doing it
//! wrong. The server binary exposes CLI flags (`bank-server/src/cli.rs`)
//! that default to these values — treat this module as the floor, not the
//! ceiling.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Maximum number of accounts a single `Ledger` can hold. Account ids are
/// dense and assigned `0..MAX_ACCOUNTS`; the (N+1)-th `CREATE` fails with
/// `LedgerError::Full`.
pub const MAX_ACCOUNTS: usize = 1000;

// ---------------------------------------------------------------------------
// Server / reactor
// ---------------------------------------------------------------------------

/// Default number of worker threads draining the task queue.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Default capacity of the bounded task queue shared between the reactor
/// and the worker pool. Once full, the reactor's enqueue blocks — this is
/// the system's only back-pressure mechanism.
pub const DEFAULT_TASK_QUEUE_CAPACITY: usize = 1000;

/// Maximum size, in bytes, of a single raw read from a client socket. A
/// command line is expected to fit in one read; this server does not
/// buffer partial lines across reads.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Maximum size, in bytes, of the command payload inside a single line
/// (excluding the terminating `\n`).
pub const MAX_COMMAND_LINE_BYTES: usize = 255;

/// Default TCP bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Default TCP listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// `listen()` backlog.
pub const LISTEN_BACKLOG: u32 = 128;

/// Reactor poll timeout. Bounds shutdown latency: after `running` flips to
/// false, the reactor notices within this window even with no socket
/// activity.
pub const REACTOR_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Maximum number of readiness events drained from the reactor per wake.
pub const MAX_POLL_EVENTS: usize = 1024;

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Default simulated per-command processing delay. Exists purely to make
/// thread-pool concurrency observable; set to `Duration::ZERO` in tests.
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(100);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_does_not_exceed_queue_capacity() {
        // Nothing in the spec ties these together, but a queue smaller
        // than the worker pool would be a surprising default.
        assert!(DEFAULT_TASK_QUEUE_CAPACITY >= DEFAULT_WORKER_COUNT);
    }

    #[test]
    fn command_line_fits_in_read_buffer() {
        assert!(MAX_COMMAND_LINE_BYTES < READ_BUFFER_SIZE);
    }

    #[test]
    fn max_accounts_is_positive() {
        assert!(MAX_ACCOUNTS > 0);
    }
}
