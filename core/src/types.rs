//! Domain types for the EventGuard ticketing core.
//!
//! Value objects, identities, and record types shared by the rule evaluator,
//! the record store, and the state machine. Record identities are derived
//! deterministically from their seeds (organizer + name for events, event +
//! sequence for tickets, event + attendee for badges), so an identity
//! collision on creation doubles as the uniqueness check.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Namespace under which deterministic record identities are derived.
const EVENTGUARD_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6e, 0x76, 0x67, 0x64, 0x2d, 0x74, 0x69, 0x78, 0x2d, 0x63, 0x6f, 0x72, 0x65, 0x2d, 0x30,
    0x31,
]);

// ============================================================================
// Identifiers
// ============================================================================

/// Identity of a wallet-holding participant: buyer, organizer, or resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random `AccountId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `AccountId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an event, derived from organizer identity and
/// event name.
///
/// Two `create_event` calls with the same organizer and name collide on the
/// same identity, which the record store rejects — there is no way to mint
/// two distinct events from one (organizer, name) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Derives the identity for an event owned by `organizer` named `name`.
    #[must_use]
    pub fn derive(organizer: &AccountId, name: &str) -> Self {
        let mut seed = Vec::with_capacity(16 + 5 + name.len());
        seed.extend_from_slice(b"event");
        seed.extend_from_slice(organizer.as_uuid().as_bytes());
        seed.extend_from_slice(name.as_bytes());
        Self(Uuid::new_v5(&EVENTGUARD_NAMESPACE, &seed))
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential, zero-based position of a ticket within its event.
///
/// Assigned at purchase from the event's `tickets_sold` counter, so the set
/// of sequences for an event is always the contiguous range `0..tickets_sold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketSeq(u32);

impl TicketSeq {
    /// Creates a `TicketSeq` from its zero-based position
    #[must_use]
    pub const fn new(seq: u32) -> Self {
        Self(seq)
    }

    /// Returns the zero-based position
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deterministic identity of a ticket: the (event, sequence) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketKey {
    /// Event the ticket belongs to
    pub event: EventId,
    /// Position within the event's sale order
    pub seq: TicketSeq,
}

impl TicketKey {
    /// Creates a `TicketKey`
    #[must_use]
    pub const fn new(event: EventId, seq: TicketSeq) -> Self {
        Self { event, seq }
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event, self.seq)
    }
}

/// Deterministic identity of a culture badge: the (event, attendee) pair.
///
/// At most one badge exists per attendee per event; a second mint attempt
/// collides on this key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BadgeKey {
    /// Event the badge commemorates
    pub event: EventId,
    /// Attendee who checked in
    pub owner: AccountId,
}

impl BadgeKey {
    /// Creates a `BadgeKey`
    #[must_use]
    pub const fn new(event: EventId, owner: AccountId) -> Self {
        Self { event, owner }
    }
}

impl fmt::Display for BadgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.owner, self.event)
    }
}

// ============================================================================
// Money Value Object (integer minor units, stablecoin-style 6 decimals)
// ============================================================================

/// Minor units per whole settlement unit (6-decimal stablecoin convention).
pub const MINOR_UNITS_PER_UNIT: u64 = 1_000_000;

/// Basis-point denominator for resale markup arithmetic.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// An amount of the settlement unit in integer minor units.
///
/// All arithmetic is integer with floor division; there is no floating
/// point anywhere in pricing or refund computation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from minor units
    #[must_use]
    pub const fn from_minor_units(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Creates a `Money` value from whole settlement units with overflow
    /// checking
    #[must_use]
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(MINOR_UNITS_PER_UNIT) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Returns the amount in minor units
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Subtracts two amounts (returns `None` if the result would be negative)
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if self.0 >= other.0 {
            Some(Self(self.0 - other.0))
        } else {
            None
        }
    }

    /// The highest price allowed after applying a basis-point markup cap:
    /// `self + self * bps / 10_000`, floor division.
    ///
    /// Computed in 128-bit and saturated, so a cap wider than the
    /// representable range simply admits every representable price.
    #[must_use]
    pub const fn with_markup_bps(self, bps: u32) -> Self {
        let base = self.0 as u128;
        let capped = base + base * (bps as u128) / (BPS_DENOMINATOR as u128);
        if capped > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(capped as u64)
        }
    }

    /// Takes an integer percentage of the amount, floor division.
    ///
    /// `percent` is clamped by callers to `0..=100`, so the product cannot
    /// overflow for any representable amount.
    #[must_use]
    pub const fn percentage(self, percent: u8) -> Self {
        Self(self.0 / 100 * (percent as u64) + self.0 % 100 * (percent as u64) / 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.0 / MINOR_UNITS_PER_UNIT,
            self.0 % MINOR_UNITS_PER_UNIT
        )
    }
}

/// Tag naming the stablecoin-like unit an escrow account settles in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementUnit(String);

impl SettlementUnit {
    /// Creates a `SettlementUnit` from its symbol (e.g. `"USDC"`)
    #[must_use]
    pub const fn new(symbol: String) -> Self {
        Self(symbol)
    }

    /// Returns the unit symbol
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SettlementUnit {
    fn default() -> Self {
        Self("USDC".to_string())
    }
}

impl fmt::Display for SettlementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event configuration
// ============================================================================

/// Category tag stamped onto culture badges at check-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Concerts and live music
    Music,
    /// Sports games
    Sports,
    /// Conferences and talks
    Conference,
    /// Festivals
    Festival,
    /// Anything else
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Music => "music",
            Self::Sports => "sports",
            Self::Conference => "conference",
            Self::Festival => "festival",
            Self::Other => "other",
        };
        write!(f, "{tag}")
    }
}

/// Anti-scalping resale rules, fixed at event creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleRules {
    /// Maximum resale markup over the stored purchase price, in basis points
    pub max_resale_markup_bps: u32,
    /// Length of the pre-event window during which transfers are locked,
    /// in seconds before the event date
    pub transfer_lock_secs: u32,
    /// Maximum tickets a single wallet may hold for the event
    pub max_tickets_per_wallet: u32,
    /// Global transfer toggle
    pub transfers_enabled: bool,
}

impl ResaleRules {
    /// The transfer-lock lead time as a duration.
    #[must_use]
    pub fn transfer_lock(&self) -> Duration {
        Duration::seconds(i64::from(self.transfer_lock_secs))
    }
}

/// Immutable configuration supplied when an event is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Event name (identity seed together with the organizer)
    pub name: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue description
    pub venue: String,
    /// Total ticket inventory
    pub total_tickets: u32,
    /// Base ticket price in minor units
    pub base_price: Money,
    /// Resale rule set
    pub rules: ResaleRules,
}

// ============================================================================
// Protection and resolution
// ============================================================================

/// Which recorded outcome makes tickets refund-eligible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundCondition {
    /// Refunds unlock when the market resolves `true`
    OnYes,
    /// Refunds unlock when the market resolves `false`
    OnNo,
}

impl RefundCondition {
    /// Whether a recorded outcome satisfies this condition.
    #[must_use]
    pub const fn is_met_by(&self, outcome: bool) -> bool {
        match self {
            Self::OnYes => outcome,
            Self::OnNo => !outcome,
        }
    }
}

/// Conditional-refund policy tied to an external market, attached at most
/// once per event and only while the event is unresolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionPolicy {
    /// External market whose outcome gates refunds
    pub market_id: String,
    /// Outcome direction that unlocks refunds
    pub refund_condition: RefundCondition,
    /// Percentage of the purchase price refunded, `0..=100`
    pub refund_percentage: u8,
}

/// The binary real-world outcome reported by the trusted resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Reported market outcome
    pub outcome: bool,
    /// When the report was accepted
    pub recorded_at: DateTime<Utc>,
}

// ============================================================================
// Records
// ============================================================================

/// A ticketed occasion with its configuration, inventory counter, and
/// optional protection/resolution state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Deterministic identity (organizer + name)
    pub id: EventId,
    /// Organizer who created the event and may attach protection
    pub organizer: AccountId,
    /// Immutable configuration
    pub config: EventConfig,
    /// Number of tickets sold so far; never exceeds `config.total_tickets`
    pub tickets_sold: u32,
    /// Conditional-refund policy, if attached
    pub protection: Option<ProtectionPolicy>,
    /// Recorded market outcome; `None` until the resolver reports
    pub resolution: Option<Resolution>,
    /// When the event was created
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Tickets still available for sale.
    #[must_use]
    pub const fn tickets_remaining(&self) -> u32 {
        self.config.total_tickets - self.tickets_sold
    }

    /// Whether the resolver has reported an outcome.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// The instant the transfer-lock window opens.
    #[must_use]
    pub fn transfer_lock_begins_at(&self) -> DateTime<Utc> {
        self.config.date - self.config.rules.transfer_lock()
    }
}

/// A single sold admission right.
///
/// `checked_in` and `refunded` are independent tracks; neither is ever
/// reversed once set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Current holder
    pub owner: AccountId,
    /// Event this ticket admits to
    pub event: EventId,
    /// Sale-order position, assigned at purchase
    pub seq: TicketSeq,
    /// Price stored for resale-cap purposes; updated on priced transfers
    pub purchase_price: Money,
    /// Set on first successful check-in
    pub checked_in: bool,
    /// Set on successful refund claim
    pub refunded: bool,
}

impl Ticket {
    /// The ticket's deterministic identity.
    #[must_use]
    pub const fn key(&self) -> TicketKey {
        TicketKey::new(self.event, self.seq)
    }
}

/// Non-transferable attendance credential, minted once on first check-in.
///
/// No operation anywhere in the public interface changes a badge's owner or
/// deletes a badge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CultureBadge {
    /// Attendee the badge belongs to, fixed at mint
    pub owner: AccountId,
    /// Event the badge commemorates
    pub event: EventId,
    /// Category tag supplied at check-in
    pub event_type: EventType,
    /// Venue snapshot taken from the event config
    pub venue: String,
    /// Free-text seat or tier description supplied at check-in
    pub seat_info: String,
    /// When the badge was issued
    pub issued_at: DateTime<Utc>,
}

impl CultureBadge {
    /// The badge's deterministic identity.
    #[must_use]
    pub const fn key(&self) -> BadgeKey {
        BadgeKey::new(self.event, self.owner)
    }
}
