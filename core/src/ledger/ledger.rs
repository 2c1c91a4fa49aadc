//! The in-memory account store: fine-grained locking, deadlock-free
//! transfers, conservation of funds.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::account::Account;
use crate::config::MAX_ACCOUNTS;

/// Everything that can go wrong inside the Ledger. The wire Protocol
/// collapses all of these to `FAILURE <CMD> -1`, but the Ledger itself
/// keeps them distinct so callers (and tests) can tell them apart.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account not found")]
    NotFound,
    #[error("amount must be a positive finite value")]
    InvalidAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("source and destination accounts must differ")]
    SameAccount,
    #[error("ledger is at capacity")]
    Full,
}

/// The account table plus the monotonic id counter, behind a single
/// "structure" lock. Individual balances are behind their own locks (see
/// `Account`) so that `deposit`/`withdraw`/`transfer`/`balance_of` on
/// distinct accounts never block on each other.
///
/// Invariant upheld everywhere in this module: the structure lock is never
/// held while an account lock is held. Every method below either holds the
/// structure lock to clone `Arc<Account>` handles out and then drops it
/// before touching any account lock, or never touches the structure lock at
/// all.
pub struct Ledger {
    accounts: RwLock<Vec<Arc<Account>>>,
    capacity: usize,
}

impl Ledger {
    /// A ledger with the default capacity (`config::MAX_ACCOUNTS`).
    pub fn new() -> Self {
        Self::with_capacity(MAX_ACCOUNTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            capacity,
        }
    }

    /// Allocates a new account with balance zero. Ids are dense and
    /// assigned in order starting at 0.
    pub fn create(&self) -> Result<u64, LedgerError> {
        let mut accounts = self.accounts.write();
        if accounts.len() >= self.capacity {
            return Err(LedgerError::Full);
        }
        let id = accounts.len() as u64;
        accounts.push(Arc::new(Account::new(id)));
        Ok(id)
    }

    fn lookup(&self, id: u64) -> Result<Arc<Account>, LedgerError> {
        let accounts = self.accounts.read();
        accounts
            .get(id as usize)
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    pub fn deposit(&self, id: u64, amount: f64) -> Result<f64, LedgerError> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount);
        }
        let account = self.lookup(id)?;
        let mut balance = account.lock();
        *balance += amount;
        Ok(*balance)
    }

    pub fn withdraw(&self, id: u64, amount: f64) -> Result<f64, LedgerError> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount);
        }
        let account = self.lookup(id)?;
        let mut balance = account.lock();
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        *balance -= amount;
        Ok(*balance)
    }

    /// Moves `amount` from `from_id` to `to_id`. Locks are acquired in
    /// ascending-id order regardless of transfer direction, which is what
    /// makes concurrent transfers deadlock-free: any two transfers that
    /// share an account agree on which of the two locks to take first.
    pub fn transfer(&self, from_id: u64, to_id: u64, amount: f64) -> Result<f64, LedgerError> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount);
        }
        if from_id == to_id {
            return Err(LedgerError::SameAccount);
        }
        let from = self.lookup(from_id)?;
        let to = self.lookup(to_id)?;

        let result = if from_id < to_id {
            let mut from_balance = from.lock();
            let mut to_balance = to.lock();
            if *from_balance < amount {
                Err(LedgerError::InsufficientFunds)
            } else {
                *from_balance -= amount;
                *to_balance += amount;
                Ok(*from_balance)
            }
        } else {
            let mut to_balance = to.lock();
            let mut from_balance = from.lock();
            if *from_balance < amount {
                Err(LedgerError::InsufficientFunds)
            } else {
                *from_balance -= amount;
                *to_balance += amount;
                Ok(*from_balance)
            }
        };
        result

        // Whichever branch ran, the lock taken second (the larger id) is
        // declared second and so drops first, releasing locks in reverse
        // acquisition order.
    }

    pub fn balance_of(&self, id: u64) -> Result<f64, LedgerError> {
        let account = self.lookup(id)?;
        Ok(account.balance())
    }

    /// A per-account-consistent, but not globally transactional, snapshot:
    /// the set of ids is fixed under the structure lock, then each balance
    /// is sampled under its own account lock, in ascending id order. A
    /// transfer racing this call may be observed as only its debit or only
    /// its credit having landed.
    pub fn snapshot(&self) -> Vec<(u64, f64)> {
        let handles: Vec<Arc<Account>> = self.accounts.read().clone();
        handles
            .into_iter()
            .map(|account| (account.id(), account.balance()))
            .collect()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}
