//! # CLI Interface
//!
//! Defines the command-line argument structure for `bankd` using `clap`
//! derive. The server has exactly one mode of operation — run — so there
//! are no subcommands, just flags with sane defaults and `env` fallbacks.

use std::time::Duration;

use bank_core::config;
use clap::Parser;

use crate::logging::LogFormat;

/// Concurrent in-memory bank ledger server.
#[derive(Parser, Debug)]
#[command(name = "bankd", about = "Concurrent in-memory bank ledger server", version)]
pub struct Cli {
    /// Address to bind the TCP listener on.
    #[arg(long, env = "BANKD_BIND_ADDR", default_value = config::DEFAULT_BIND_ADDR)]
    pub bind_addr: String,

    /// Port to bind the TCP listener on.
    #[arg(long, env = "BANKD_PORT", default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// Address to serve Prometheus-style metrics on.
    #[arg(long, env = "BANKD_METRICS_ADDR", default_value = "0.0.0.0:9100")]
    pub metrics_addr: String,

    /// Number of worker threads draining the task queue.
    #[arg(long, env = "BANKD_WORKERS", default_value_t = config::DEFAULT_WORKER_COUNT)]
    pub workers: usize,

    /// Capacity of the bounded task queue shared by the reactor and the
    /// worker pool.
    #[arg(long, env = "BANKD_QUEUE_CAPACITY", default_value_t = config::DEFAULT_TASK_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Maximum number of accounts the ledger can hold.
    #[arg(long, env = "BANKD_MAX_ACCOUNTS", default_value_t = config::MAX_ACCOUNTS)]
    pub max_accounts: usize,

    /// Simulated per-command processing delay, in milliseconds. Exists to
    /// make thread-pool concurrency observable under load; set to 0 to
    /// disable.
    #[arg(long, env = "BANKD_SIMULATED_DELAY_MS", default_value_t = config::DEFAULT_SIMULATED_DELAY.as_millis() as u64)]
    pub simulated_delay_ms: u64,

    /// Log level when `RUST_LOG` is not set.
    #[arg(long, env = "BANKD_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "BANKD_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl Cli {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_str_lossy(&self.log_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_config_constants() {
        let cli = Cli::parse_from(["bankd"]);
        assert_eq!(cli.port, config::DEFAULT_PORT);
        assert_eq!(cli.workers, config::DEFAULT_WORKER_COUNT);
        assert_eq!(cli.queue_capacity, config::DEFAULT_TASK_QUEUE_CAPACITY);
        assert_eq!(cli.max_accounts, config::MAX_ACCOUNTS);
        assert_eq!(cli.simulated_delay(), config::DEFAULT_SIMULATED_DELAY);
    }

    #[test]
    fn simulated_delay_can_be_disabled() {
        let cli = Cli::parse_from(["bankd", "--simulated-delay-ms", "0"]);
        assert_eq!(cli.simulated_delay(), Duration::ZERO);
    }
}
