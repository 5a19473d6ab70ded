//! Escrow ledger: the per-event custodial balance.
//!
//! One account exists per event, created at balance zero alongside the event
//! record. Only the state machine's buy and refund transitions touch it;
//! callers never reach the ledger directly.

use crate::error::{Result, TicketingError};
use crate::types::{Money, SettlementUnit};
use serde::{Deserialize, Serialize};

/// Custodial balance holding collected ticket payments pending refunds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowAccount {
    /// Unit the account settles in
    unit: SettlementUnit,
    /// Current balance; never negative by construction
    balance: Money,
}

impl EscrowAccount {
    /// Opens an empty escrow account settling in `unit`.
    #[must_use]
    pub const fn new(unit: SettlementUnit) -> Self {
        Self {
            unit,
            balance: Money::ZERO,
        }
    }

    /// The unit this account settles in.
    #[must_use]
    pub const fn unit(&self) -> &SettlementUnit {
        &self.unit
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Credits exactly `amount` to the balance.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` on balance overflow. A real overflow would need
    /// inventory times base price to exceed `u64`, so this is a defensive
    /// check like `withdraw`'s.
    pub fn deposit(&mut self, amount: Money) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TicketingError::InsufficientFunds)?;
        Ok(())
    }

    /// Debits exactly `amount` from the balance.
    ///
    /// Refund amounts are bounded by deposited prices, so a failure here is
    /// a defensive invariant check, not expected behavior.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` if `amount` exceeds the balance.
    pub fn withdraw(&mut self, amount: Money) -> Result<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(TicketingError::InsufficientFunds)?;
        Ok(())
    }
}
