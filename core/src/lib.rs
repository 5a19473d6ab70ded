//! EventGuard ticketing core - ticket sale, resale control, attendance
//! badging, and oracle-gated conditional refunds, settled in a
//! stablecoin-like unit.
//!
//! The core is the event/ticket state machine and its invariant-enforcing
//! transition rules: inventory accounting, anti-scalping resale controls,
//! attendance badging, and escrow refunds gated on an external market
//! outcome. Every transition guarantees exactly-once effects — no
//! double-mint, no double-refund, no oversold inventory — under concurrent,
//! adversarial callers, using only atomic per-transition checks.
//!
//! # Architecture
//!
//! ```text
//!  external caller                resolution feed
//!        │                              │
//!        ▼                              ▼
//! ┌──────────────────┐        ┌──────────────────┐
//! │ TicketingMachine │◄───────│ ResolutionGateway│
//! │  (7 operations)  │        └──────────────────┘
//! └──────────────────┘
//!    │          │
//!    │ checks   │ mutates (one atomic step per operation)
//!    ▼          ▼
//! ┌───────┐  ┌──────────────────────────────┐
//! │ rules │  │ EventRecordStore             │
//! │ (pure)│  │  per-event: Event, Tickets,  │
//! └───────┘  │  CultureBadges, EscrowAccount│
//!            └──────────────────────────────┘
//! ```
//!
//! # Key Guarantees
//!
//! - **Inventory bound**: `tickets_sold` never exceeds the configured
//!   inventory; the losing buyer in a last-ticket race gets `SoldOut`.
//! - **Deterministic identities**: events derive from (organizer, name),
//!   tickets from (event, sequence), badges from (event, attendee) — an
//!   identity collision on creation is itself the uniqueness check.
//! - **All-or-nothing transitions**: rules run before effects under the
//!   affected event's exclusive guard; a failing transition leaves no
//!   partial state, so resubmission is always safe.
//! - **Explicit trust boundaries**: wall-clock time, token custody, and the
//!   trusted resolver identities are injected capabilities.

pub mod config;
pub mod environment;
pub mod error;
mod escrow;
pub mod gateway;
pub mod machine;
pub mod metrics;
pub mod projections;
pub mod rules;
mod store;
pub mod types;

pub use config::Config;
pub use environment::{Clock, SystemClock, TicketingEnvironment, TokenCustody};
pub use error::{CustodyError, Result, TicketingError};
pub use gateway::{ResolutionGateway, ResolutionReport};
pub use machine::TicketingMachine;
pub use projections::{BadgeView, EventSummary, TicketView};
pub use types::{
    AccountId, BadgeKey, CultureBadge, Event, EventConfig, EventId, EventType, Money,
    ProtectionPolicy, RefundCondition, ResaleRules, Resolution, SettlementUnit, Ticket,
    TicketKey, TicketSeq,
};
