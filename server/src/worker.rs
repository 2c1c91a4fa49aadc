//! The fixed worker pool that drains the task queue.
//!
//! Each worker loops: dequeue a task, invoke the Protocol, write the reply
//! back to the originating socket. Workers share the `Ledger` and
//! `ServerControl`; all correctness beyond that comes from the Ledger's
//! own locking discipline, not from anything in this module.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bank_core::control::ServerControl;
use bank_core::ledger::Ledger;
use bank_core::protocol;
use crossbeam_channel::Receiver;

use crate::metrics::SharedMetrics;
use crate::task_queue::Task;

/// Spawns `count` named worker threads sharing `ledger`, `control`, and a
/// clone of `receiver` each. Returns once every thread has been spawned;
/// each thread runs until `receiver.iter()` observes the queue disconnected
/// and drained, which happens once the reactor drops its `Sender`.
pub fn spawn(
    count: usize,
    ledger: Arc<Ledger>,
    control: Arc<ServerControl>,
    receiver: Receiver<Task>,
    simulated_delay: Duration,
    metrics: SharedMetrics,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|index| {
            let ledger = Arc::clone(&ledger);
            let control = Arc::clone(&control);
            let receiver = receiver.clone();
            let metrics = Arc::clone(&metrics);
            thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(move || worker_loop(&ledger, &control, &receiver, simulated_delay, &metrics))
                .expect("failed to spawn worker thread")
        })
        .collect()
}

fn worker_loop(
    ledger: &Ledger,
    control: &ServerControl,
    receiver: &Receiver<Task>,
    simulated_delay: Duration,
    metrics: &SharedMetrics,
) {
    for task in receiver.iter() {
        metrics.queue_depth.dec();
        metrics.workers_busy.inc();
        let started = Instant::now();

        let reply = if control.is_single_threaded() {
            let _guard = control.exec_mutex().lock();
            protocol::execute(&task.command_line, ledger, control, simulated_delay)
        } else {
            protocol::execute(&task.command_line, ledger, control, simulated_delay)
        };

        metrics
            .command_latency_seconds
            .observe(started.elapsed().as_secs_f64());
        if reply.starts_with("SUCCESS") {
            metrics.commands_succeeded_total.inc();
        } else {
            metrics.commands_failed_total.inc();
        }

        write_full_reply(&task.client, reply.as_bytes());
        metrics.workers_busy.dec();
    }
}

/// Writes `bytes` to `client`, retrying partial writes until the full
/// reply has been sent or a write fails. A failure is logged and the task
/// is dropped; the reactor will reap the dead socket on its next read
/// attempt.
fn write_full_reply(client: &std::net::TcpStream, bytes: &[u8]) {
    let mut client = client;
    let mut remaining = bytes;
    while !remaining.is_empty() {
        match (&mut client).write(remaining) {
            Ok(0) => {
                tracing::warn!("client write returned 0, dropping reply");
                return;
            }
            Ok(written) => remaining = &remaining[written..],
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("failed to write reply to client: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ServerMetrics;
    use crate::task_queue;
    use std::io::Read;
    use std::net::{TcpListener, TcpStream};

    fn connected_pair() -> (Arc<TcpStream>, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client_side = TcpStream::connect(addr).unwrap();
        let (server_side, _) = listener.accept().unwrap();
        (Arc::new(server_side), client_side)
    }

    #[test]
    fn worker_executes_command_and_writes_reply() {
        let ledger = Arc::new(Ledger::new());
        let control = Arc::new(ServerControl::new());
        let (tx, rx) = task_queue::channel(4);
        let metrics = Arc::new(ServerMetrics::new());

        let handles = spawn(1, ledger, control, rx, Duration::ZERO, metrics);

        let (server_side, mut client_side) = connected_pair();
        tx.send(Task {
            client: server_side,
            command_line: "CREATE".to_string(),
        })
        .unwrap();
        drop(tx);

        let mut buf = [0u8; 64];
        let n = client_side.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"SUCCESS CREATE 0\n");

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn single_threaded_mode_serializes_without_deadlocking() {
        let ledger = Arc::new(Ledger::new());
        let control = Arc::new(ServerControl::new());
        control.set_single_threaded(true);
        let (tx, rx) = task_queue::channel(8);
        let metrics = Arc::new(ServerMetrics::new());

        let handles = spawn(4, ledger, control, rx, Duration::ZERO, metrics);

        let mut clients = Vec::new();
        for _ in 0..4 {
            let (server_side, client_side) = connected_pair();
            tx.send(Task {
                client: server_side,
                command_line: "CREATE".to_string(),
            })
            .unwrap();
            clients.push(client_side);
        }
        drop(tx);

        for mut client in clients {
            let mut buf = [0u8; 64];
            let n = client.read(&mut buf).unwrap();
            assert!(String::from_utf8_lossy(&buf[..n]).starts_with("SUCCESS CREATE"));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
