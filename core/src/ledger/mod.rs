//! The transactional account store.
//!
//! See [`Ledger`] for the locking discipline: a coarse "structure" lock
//! protects the account table and the id counter, while each account's
//! balance is protected by its own lock so that unrelated accounts never
//! contend with each other.

mod account;
mod ledger;

pub use account::Account;
pub use ledger::{Ledger, LedgerError};
