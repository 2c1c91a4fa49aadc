// Copyright (c) 2026 Bank Ledger Contributors. MIT License.
// See LICENSE for details.

//! Entry point for the `bankd` binary. Parses CLI arguments and hands off
//! to [`bank_server::run`].

use anyhow::Result;
use clap::Parser;

use bank_server::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    bank_server::run(cli)
}
