//! # Prometheus Metrics
//!
//! Exposes operational metrics for the server. Scraped by Prometheus at
//! `GET /metrics` on the configured metrics address.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so
//! they do not collide with any default global registry consumers. Unlike
//! the rest of the teacher's metrics story, there is no async runtime here
//! to host an axum server, so `/metrics` is served by a tiny blocking
//! `std::net` responder thread instead.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// Holds all Prometheus metric handles for the server.
pub struct ServerMetrics {
    registry: Registry,
    /// Total TCP connections accepted by the reactor.
    pub connections_accepted_total: IntCounter,
    /// Total commands that completed with `SUCCESS`.
    pub commands_succeeded_total: IntCounter,
    /// Total commands that completed with `FAILURE`.
    pub commands_failed_total: IntCounter,
    /// Current number of tasks sitting in the bounded queue.
    pub queue_depth: IntGauge,
    /// Current number of workers executing a command right now.
    pub workers_busy: IntGauge,
    /// Histogram of end-to-end command execution latency in seconds.
    pub command_latency_seconds: Histogram,
}

impl ServerMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("bankd".into()), None)
            .expect("failed to create prometheus registry");

        let connections_accepted_total = IntCounter::new(
            "connections_accepted_total",
            "Total number of TCP connections accepted",
        )
        .expect("metric creation");
        registry
            .register(Box::new(connections_accepted_total.clone()))
            .expect("metric registration");

        let commands_succeeded_total = IntCounter::new(
            "commands_succeeded_total",
            "Total number of commands that completed with SUCCESS",
        )
        .expect("metric creation");
        registry
            .register(Box::new(commands_succeeded_total.clone()))
            .expect("metric registration");

        let commands_failed_total = IntCounter::new(
            "commands_failed_total",
            "Total number of commands that completed with FAILURE",
        )
        .expect("metric creation");
        registry
            .register(Box::new(commands_failed_total.clone()))
            .expect("metric registration");

        let queue_depth = IntGauge::new(
            "queue_depth",
            "Current number of tasks waiting in the bounded task queue",
        )
        .expect("metric creation");
        registry
            .register(Box::new(queue_depth.clone()))
            .expect("metric registration");

        let workers_busy = IntGauge::new(
            "workers_busy",
            "Current number of worker threads executing a command",
        )
        .expect("metric creation");
        registry
            .register(Box::new(workers_busy.clone()))
            .expect("metric registration");

        let command_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "command_latency_seconds",
                "End-to-end command execution latency in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(command_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            connections_accepted_total,
            commands_succeeded_total,
            commands_failed_total,
            queue_depth,
            workers_busy,
            command_latency_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition
    /// format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedMetrics = Arc<ServerMetrics>;

/// Binds `addr` and spawns a thread that serves `GET /metrics` on it until
/// the process exits. There is exactly one route; anything else gets a
/// 404. This is deliberately not a general-purpose HTTP server — just
/// enough to let Prometheus scrape this process.
///
/// Returns the thread handle and the address actually bound (useful when
/// `addr` uses port 0, as in tests).
pub fn serve(
    addr: &str,
    metrics: SharedMetrics,
) -> std::io::Result<(thread::JoinHandle<()>, SocketAddr)> {
    let listener = TcpListener::bind(addr)?;
    let bound_addr = listener.local_addr()?;
    tracing::info!(%bound_addr, "metrics endpoint listening");
    let handle = thread::Builder::new()
        .name("metrics-http".to_string())
        .spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => handle_connection(stream, &metrics),
                    Err(e) => tracing::warn!("metrics listener accept error: {}", e),
                }
            }
        })
        .expect("failed to spawn metrics thread");
    Ok((handle, bound_addr))
}

fn handle_connection(mut stream: TcpStream, metrics: &ServerMetrics) {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    let response = if request_line.starts_with("GET /metrics") {
        match metrics.encode() {
            Ok(body) => format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/plain; version=0.0.4\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            ),
            Err(e) => {
                tracing::error!("failed to encode metrics: {}", e);
                "HTTP/1.1 500 Internal Server Error\r\nconnection: close\r\n\r\n".to_string()
            }
        }
    } else {
        "HTTP/1.1 404 Not Found\r\nconnection: close\r\n\r\n".to_string()
    };

    let _ = stream.write_all(response.as_bytes());
}
