//! Injected dependencies for the ticketing state machine.
//!
//! All external collaborators are abstracted behind traits and supplied via
//! [`TicketingEnvironment`], so the trust boundaries (wall-clock time, token
//! custody, the resolver identity set) are explicit and swappable in tests.

use crate::types::{AccountId, Money};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Token-custody subsystem: moves exactly the requested amount between a
/// participant account and the event vault.
///
/// Contract: implementations must be non-blocking and must move exactly the
/// stated amount with no rounding. Calls happen inside a record's critical
/// section, so an implementation that performs blocking I/O here would stall
/// every operation on that event.
pub trait TokenCustody: Send + Sync {
    /// Debits `amount` from `account` (into the vault's custody).
    ///
    /// # Errors
    ///
    /// [`crate::error::CustodyError::InsufficientFunds`] when the account
    /// does not hold `amount`; [`crate::error::CustodyError::Unavailable`]
    /// for transient subsystem trouble.
    fn debit(&self, account: AccountId, amount: Money)
    -> Result<(), crate::error::CustodyError>;

    /// Credits `amount` to `account` (out of the vault's custody).
    ///
    /// # Errors
    ///
    /// [`crate::error::CustodyError::Unavailable`] for transient subsystem
    /// trouble.
    fn credit(
        &self,
        account: AccountId,
        amount: Money,
    ) -> Result<(), crate::error::CustodyError>;
}

/// Environment dependencies for the ticketing state machine.
#[derive(Clone)]
pub struct TicketingEnvironment {
    /// Clock for timestamps and lock-window checks
    pub clock: Arc<dyn Clock>,
    /// Token-custody subsystem holding participant balances
    pub custody: Arc<dyn TokenCustody>,
    /// Identities allowed to record market resolutions
    pub trusted_resolvers: HashSet<AccountId>,
}

impl TicketingEnvironment {
    /// Creates a new `TicketingEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        custody: Arc<dyn TokenCustody>,
        trusted_resolvers: HashSet<AccountId>,
    ) -> Self {
        Self {
            clock,
            custody,
            trusted_resolvers,
        }
    }
}
