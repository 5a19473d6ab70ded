//! Testing utilities and mocks for the EventGuard ticketing core.
//!
//! This crate provides:
//! - Deterministic clocks (`FixedClock`, `SteppableClock`)
//! - An in-memory token-custody double (`InMemoryCustody`)
//! - Fixture builders for event configurations
//!
//! ## Example
//!
//! ```ignore
//! use eventguard_testing::{fixtures, mocks};
//!
//! #[tokio::test]
//! async fn sells_a_ticket() {
//!     let clock = mocks::test_clock();
//!     let custody = std::sync::Arc::new(mocks::InMemoryCustody::new());
//!     let buyer = AccountId::new();
//!     custody.fund(buyer, Money::from_minor_units(5_000_000));
//!     // wire a TicketingMachine with the mocks and exercise it
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use eventguard_core::environment::{Clock, TokenCustody};
use eventguard_core::error::CustodyError;
use eventguard_core::types::{AccountId, EventConfig, Money, ResaleRules};
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{
        AccountId, Clock, CustodyError, DateTime, Duration, HashMap, Money, Mutex, TokenCustody,
        Utc,
    };

    /// Fixed clock for deterministic tests: always returns the same time.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Clock whose time can be moved forward mid-test, for exercising
    /// transfer-lock windows and similar time-dependent rules.
    #[derive(Debug)]
    pub struct SteppableClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl SteppableClock {
        /// Create a steppable clock starting at the given time
        #[must_use]
        pub const fn new(start: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(start),
            }
        }

        /// Move the clock forward by `step`.
        ///
        /// # Panics
        ///
        /// Panics if the internal mutex was poisoned by a panicking test.
        #[allow(clippy::expect_used)]
        pub fn advance(&self, step: Duration) {
            let mut time = self.time.lock().expect("clock mutex poisoned");
            *time += step;
        }

        /// Pin the clock to an exact instant.
        ///
        /// # Panics
        ///
        /// Panics if the internal mutex was poisoned by a panicking test.
        #[allow(clippy::expect_used)]
        pub fn set(&self, instant: DateTime<Utc>) {
            *self.time.lock().expect("clock mutex poisoned") = instant;
        }
    }

    impl Clock for SteppableClock {
        #[allow(clippy::expect_used)]
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().expect("clock mutex poisoned")
        }
    }

    /// In-memory token-custody double holding participant balances.
    ///
    /// Moves exactly the requested amounts, like the real subsystem's
    /// contract requires, and can be switched into an "unavailable" state to
    /// exercise the retryable infrastructure-failure path.
    #[derive(Debug, Default)]
    pub struct InMemoryCustody {
        balances: Mutex<HashMap<AccountId, Money>>,
        unavailable: Mutex<bool>,
    }

    impl InMemoryCustody {
        /// Create an empty custody double
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Credit an account out of thin air (test setup only).
        ///
        /// # Panics
        ///
        /// Panics if the internal mutex was poisoned by a panicking test.
        #[allow(clippy::expect_used)]
        pub fn fund(&self, account: AccountId, amount: Money) {
            let mut balances = self.balances.lock().expect("custody mutex poisoned");
            let balance = balances.entry(account).or_insert(Money::ZERO);
            *balance = balance.checked_add(amount).expect("test balance overflow");
        }

        /// Current balance of an account (zero if never funded).
        ///
        /// # Panics
        ///
        /// Panics if the internal mutex was poisoned by a panicking test.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn balance(&self, account: AccountId) -> Money {
            self.balances
                .lock()
                .expect("custody mutex poisoned")
                .get(&account)
                .copied()
                .unwrap_or(Money::ZERO)
        }

        /// Switch the double into or out of the unavailable state.
        ///
        /// # Panics
        ///
        /// Panics if the internal mutex was poisoned by a panicking test.
        #[allow(clippy::expect_used)]
        pub fn set_unavailable(&self, unavailable: bool) {
            *self.unavailable.lock().expect("custody mutex poisoned") = unavailable;
        }

        #[allow(clippy::expect_used)]
        fn check_available(&self) -> Result<(), CustodyError> {
            if *self.unavailable.lock().expect("custody mutex poisoned") {
                return Err(CustodyError::Unavailable {
                    reason: "custody double switched off".to_string(),
                });
            }
            Ok(())
        }
    }

    impl TokenCustody for InMemoryCustody {
        #[allow(clippy::expect_used)]
        fn debit(&self, account: AccountId, amount: Money) -> Result<(), CustodyError> {
            self.check_available()?;
            let mut balances = self.balances.lock().expect("custody mutex poisoned");
            let balance = balances.entry(account).or_insert(Money::ZERO);
            *balance = balance
                .checked_sub(amount)
                .ok_or(CustodyError::InsufficientFunds)?;
            Ok(())
        }

        #[allow(clippy::expect_used)]
        fn credit(&self, account: AccountId, amount: Money) -> Result<(), CustodyError> {
            self.check_available()?;
            let mut balances = self.balances.lock().expect("custody mutex poisoned");
            let balance = balances.entry(account).or_insert(Money::ZERO);
            *balance = balance.checked_add(amount).ok_or_else(|| {
                CustodyError::Unavailable {
                    reason: "credit overflowed the account balance".to_string(),
                }
            })?;
            Ok(())
        }
    }
}

/// Fixture builders for common test scenarios.
pub mod fixtures {
    use super::{DateTime, Duration, EventConfig, Money, ResaleRules, Utc};

    /// A permissive event configuration one week after `now`: two-ticket
    /// inventory, 10% resale markup cap, one-hour transfer lock, two
    /// tickets per wallet, transfers enabled.
    #[must_use]
    pub fn event_config(name: &str, now: DateTime<Utc>) -> EventConfig {
        EventConfig {
            name: name.to_string(),
            date: now + Duration::days(7),
            venue: "Event Hall".to_string(),
            total_tickets: 2,
            base_price: Money::from_minor_units(1_000_000),
            rules: ResaleRules {
                max_resale_markup_bps: 1_000,
                transfer_lock_secs: 3_600,
                max_tickets_per_wallet: 2,
                transfers_enabled: true,
            },
        }
    }
}

// Re-export commonly used items
pub use fixtures::event_config;
pub use mocks::{FixedClock, InMemoryCustody, SteppableClock, test_clock};
