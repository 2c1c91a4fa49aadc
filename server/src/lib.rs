// Copyright (c) 2026 Bank Ledger Contributors. MIT License.
// See LICENSE for details.

//! # Bank Ledger — Server
//!
//! The socket-shaped half of the system: CLI parsing, logging, the
//! reactor, the bounded task queue, the worker pool, and Prometheus-style
//! metrics. `bankd` (`src/main.rs`) is a thin binary wrapper over
//! [`run`].
//!
//! ## Architecture
//!
//! ```text
//! socket -> reactor -> task queue -> worker -> bank_core::protocol -> Ledger
//!                                        |
//!                                        v
//!                                 reply -> socket
//! ```

pub mod cli;
pub mod logging;
pub mod metrics;
pub mod reactor;
pub mod task_queue;
pub mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use bank_core::control::ServerControl;
use bank_core::ledger::Ledger;

use cli::Cli;
use metrics::ServerMetrics;

/// Runs the server to completion: binds the listener and the metrics
/// endpoint, installs the SIGINT handler, starts the worker pool, then
/// blocks running the reactor until shutdown is requested (by `SIGINT` or
/// a `SHUTDOWN` command) and every worker has drained the queue.
pub fn run(cli: Cli) -> Result<()> {
    logging::init_logging(&cli.log_level, cli.log_format());

    let ledger = Arc::new(Ledger::with_capacity(cli.max_accounts));
    let control = Arc::new(ServerControl::new());
    let server_metrics = Arc::new(ServerMetrics::new());

    install_signal_handler(Arc::clone(&control))?;

    let (_metrics_handle, metrics_addr) = metrics::serve(&cli.metrics_addr, Arc::clone(&server_metrics))
        .with_context(|| format!("failed to bind metrics listener on {}", cli.metrics_addr))?;
    tracing::info!(%metrics_addr, "metrics endpoint ready");

    let (sender, receiver) = task_queue::channel(cli.queue_capacity);

    let worker_handles = worker::spawn(
        cli.workers,
        Arc::clone(&ledger),
        Arc::clone(&control),
        receiver,
        cli.simulated_delay(),
        Arc::clone(&server_metrics),
    );

    let bind_addr = format!("{}:{}", cli.bind_addr, cli.port);
    let reactor = reactor::Reactor::bind(&bind_addr, Arc::clone(&control), sender, server_metrics)
        .with_context(|| format!("failed to bind listener on {bind_addr}"))?;
    let bound_addr = reactor.local_addr().context("failed to read bound address")?;
    tracing::info!(addr = %bound_addr, workers = cli.workers, "bankd listening");

    reactor
        .run()
        .context("reactor loop exited with an error")?;

    tracing::info!("reactor stopped, waiting for workers to drain the queue");
    for handle in worker_handles {
        let _ = handle.join();
    }
    tracing::info!("bankd stopped");
    Ok(())
}

/// Installs a `ctrlc` handler that requests shutdown exactly once. Safe to
/// call at most once per process; `ctrlc::set_handler` itself enforces
/// that.
fn install_signal_handler(control: Arc<ServerControl>) -> Result<()> {
    let installed = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler(move || {
        if !installed.swap(true, Ordering::SeqCst) {
            tracing::info!("SIGINT received, requesting shutdown");
        }
        control.request_shutdown();
    })
    .context("failed to install SIGINT handler")
}
