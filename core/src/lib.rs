// Copyright (c) 2026 Bank Ledger Contributors. MIT License.
// See LICENSE for details.

//! # Bank Ledger — Core Library
//!
//! The part of the system that doesn't know what a socket is. `bank-core`
//! owns the three things every client of the server ultimately cares about:
//!
//! - **ledger** — Accounts and balances, and the only code allowed to move
//!   money between them.
//! - **protocol** — The line-oriented wire grammar clients speak, and the
//!   dispatcher that turns a parsed command into a ledger call plus a reply
//!   string.
//! - **control** — The small set of runtime flags (`running`,
//!   `single_threaded`) the protocol layer itself needs to read and flip —
//!   `MODE_SINGLE`/`MODE_MULTI`/`SHUTDOWN` are commands, which means the
//!   protocol dispatcher is the one mutating them, not the server binary.
//! - **config** — Named constants shared by the ledger and the protocol.
//!
//! ## Design Philosophy
//!
//! 1. The structure lock and an account lock are never held at the same time
//!    by the same thread. See `ledger::Ledger` for how that's enforced.
//! 2. `execute()` is a pure function of `(line, &Ledger, &ServerControl)` —
//!    no socket, no thread, no queue. Everything socket-shaped lives in
//!    `bank-server`.
//! 3. Every public API is documented. Every public API has tests.

pub mod config;
pub mod control;
pub mod ledger;
pub mod protocol;
