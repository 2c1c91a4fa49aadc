//! A single account: a stable id plus a mutex-guarded balance.

use parking_lot::Mutex;

/// One ledger account. Once created it lives for the process lifetime —
/// there is no `close_account`. The `id` is immutable; `balance` is the only
/// mutable field, and it is guarded by its own lock so that balance
/// operations on different accounts never contend with each other.
pub struct Account {
    id: u64,
    balance: Mutex<f64>,
}

impl Account {
    pub(super) fn new(id: u64) -> Self {
        Self {
            id,
            balance: Mutex::new(0.0),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current balance. Takes the account lock; safe to call concurrently
    /// with any other operation on this or any other account.
    pub fn balance(&self) -> f64 {
        *self.balance.lock()
    }

    pub(super) fn lock(&self) -> parking_lot::MutexGuard<'_, f64> {
        self.balance.lock()
    }
}
