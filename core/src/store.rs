//! Event record store: the arena owning every Event, Ticket, and
//! `CultureBadge` record plus the event's escrow account.
//!
//! Records for one event live together in an [`EventRecords`] bundle behind
//! a per-event lock, so a transition that reads and writes the
//! Event/Ticket/Escrow triple holds exactly one exclusive guard and
//! operations on different events proceed fully in parallel. Transition
//! closures run on a draft that is committed only on success; a failing
//! transition leaves no partial state behind.

use crate::error::{Result, TicketingError};
use crate::escrow::EscrowAccount;
use crate::types::{AccountId, CultureBadge, Event, EventId, Ticket, TicketSeq};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Every record owned by a single event: the event itself, its tickets and
/// badges indexed by their deterministic identities, and its escrow account.
#[derive(Clone, Debug)]
pub(crate) struct EventRecords {
    /// The event record
    pub event: Event,
    /// Tickets indexed by sale-order sequence
    pub tickets: BTreeMap<TicketSeq, Ticket>,
    /// Badges indexed by attendee identity
    pub badges: HashMap<AccountId, CultureBadge>,
    /// The event's custodial balance
    pub escrow: EscrowAccount,
}

impl EventRecords {
    /// Bundles a freshly created event with its empty escrow account.
    pub(crate) fn new(event: Event, escrow: EscrowAccount) -> Self {
        Self {
            event,
            tickets: BTreeMap::new(),
            badges: HashMap::new(),
            escrow,
        }
    }

    /// Looks up a ticket by sequence.
    ///
    /// # Errors
    ///
    /// `NotFound` if no ticket has been sold under that sequence.
    pub(crate) fn ticket(&self, seq: TicketSeq) -> Result<&Ticket> {
        self.tickets.get(&seq).ok_or(TicketingError::NotFound)
    }

    /// Looks up a ticket by sequence for mutation.
    ///
    /// # Errors
    ///
    /// `NotFound` if no ticket has been sold under that sequence.
    pub(crate) fn ticket_mut(&mut self, seq: TicketSeq) -> Result<&mut Ticket> {
        self.tickets.get_mut(&seq).ok_or(TicketingError::NotFound)
    }

    /// Looks up an attendee's badge.
    ///
    /// # Errors
    ///
    /// `NotFound` if the attendee has not checked in.
    pub(crate) fn badge(&self, owner: AccountId) -> Result<&CultureBadge> {
        self.badges.get(&owner).ok_or(TicketingError::NotFound)
    }

    /// Inserts a freshly minted ticket under its deterministic identity.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the sequence is already occupied — the identity
    /// collision is the double-mint guard.
    pub(crate) fn insert_ticket(&mut self, ticket: Ticket) -> Result<()> {
        if self.tickets.contains_key(&ticket.seq) {
            return Err(TicketingError::AlreadyExists);
        }
        self.tickets.insert(ticket.seq, ticket);
        Ok(())
    }

    /// Inserts a freshly minted badge under its deterministic identity.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the attendee already holds a badge for this
    /// event.
    pub(crate) fn insert_badge(&mut self, badge: CultureBadge) -> Result<()> {
        if self.badges.contains_key(&badge.owner) {
            return Err(TicketingError::AlreadyExists);
        }
        self.badges.insert(badge.owner, badge);
        Ok(())
    }

    /// Sequences of every ticket currently held by `owner`, in sale order.
    pub(crate) fn holdings_of(&self, owner: AccountId) -> Vec<TicketSeq> {
        self.tickets
            .values()
            .filter(|ticket| ticket.owner == owner)
            .map(|ticket| ticket.seq)
            .collect()
    }
}

/// Arena of per-event record bundles keyed by deterministic event identity.
#[derive(Debug, Default)]
pub(crate) struct EventRecordStore {
    events: RwLock<HashMap<EventId, Arc<RwLock<EventRecords>>>>,
}

impl EventRecordStore {
    /// Creates an empty store.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a new event bundle under its deterministic identity.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the identity is taken.
    pub(crate) async fn create(&self, event: Event, escrow: EscrowAccount) -> Result<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(TicketingError::AlreadyExists);
        }
        let id = event.id;
        events.insert(id, Arc::new(RwLock::new(EventRecords::new(event, escrow))));
        Ok(())
    }

    /// The shared handle for one event's records.
    async fn slot(&self, id: EventId) -> Result<Arc<RwLock<EventRecords>>> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TicketingError::NotFound)
    }

    /// Runs a read-only closure against one event's records.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event, otherwise whatever the closure
    /// returns.
    pub(crate) async fn read<R>(
        &self,
        id: EventId,
        f: impl FnOnce(&EventRecords) -> Result<R>,
    ) -> Result<R> {
        let slot = self.slot(id).await?;
        let records = slot.read().await;
        f(&records)
    }

    /// Applies a transition closure to one event's records atomically.
    ///
    /// The closure receives a draft copy under the event's exclusive guard;
    /// the draft replaces the live records only if the closure succeeds.
    /// The closure is synchronous, so the guard is never held across a
    /// suspension point.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event, otherwise whatever the closure
    /// returns; on error the live records are untouched.
    pub(crate) async fn mutate<R>(
        &self,
        id: EventId,
        f: impl FnOnce(&mut EventRecords) -> Result<R>,
    ) -> Result<R> {
        let slot = self.slot(id).await?;
        let mut records = slot.write().await;
        let mut draft = records.clone();
        let outcome = f(&mut draft)?;
        *records = draft;
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{EventConfig, Money, ResaleRules, SettlementUnit};
    use chrono::{Duration, Utc};

    fn sample_event(name: &str) -> Event {
        let organizer = AccountId::new();
        Event {
            id: EventId::derive(&organizer, name),
            organizer,
            config: EventConfig {
                name: name.to_string(),
                date: Utc::now() + Duration::days(1),
                venue: "Hall".to_string(),
                total_tickets: 3,
                base_price: Money::from_minor_units(1_000_000),
                rules: ResaleRules {
                    max_resale_markup_bps: 0,
                    transfer_lock_secs: 0,
                    max_tickets_per_wallet: 3,
                    transfers_enabled: true,
                },
            },
            tickets_sold: 0,
            protection: None,
            resolution: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_identity_is_rejected() {
        let event = sample_event("Dup");
        let store = EventRecordStore::new();
        store
            .create(event.clone(), EscrowAccount::new(SettlementUnit::default()))
            .await
            .unwrap();
        assert_eq!(
            store
                .create(event, EscrowAccount::new(SettlementUnit::default()))
                .await,
            Err(TicketingError::AlreadyExists)
        );
    }

    #[tokio::test]
    async fn failed_transition_leaves_no_partial_state() {
        let event = sample_event("Atomic");
        let id = event.id;
        let store = EventRecordStore::new();
        store
            .create(event, EscrowAccount::new(SettlementUnit::default()))
            .await
            .unwrap();

        // Mutate the draft, then fail: nothing may stick.
        let result: Result<()> = store
            .mutate(id, |records| {
                records.event.tickets_sold = 99;
                records.escrow.deposit(Money::from_minor_units(5))?;
                Err(TicketingError::SoldOut)
            })
            .await;
        assert_eq!(result, Err(TicketingError::SoldOut));

        store
            .read(id, |records| {
                assert_eq!(records.event.tickets_sold, 0);
                assert_eq!(records.escrow.balance(), Money::ZERO);
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ticket_and_badge_identities_collide_once() {
        let event = sample_event("Collide");
        let id = event.id;
        let buyer = AccountId::new();
        let store = EventRecordStore::new();
        store
            .create(event, EscrowAccount::new(SettlementUnit::default()))
            .await
            .unwrap();

        store
            .mutate(id, |records| {
                records.insert_ticket(Ticket {
                    owner: buyer,
                    event: id,
                    seq: TicketSeq::new(0),
                    purchase_price: Money::from_minor_units(1),
                    checked_in: false,
                    refunded: false,
                })
            })
            .await
            .unwrap();

        let second = store
            .mutate(id, |records| {
                records.insert_ticket(Ticket {
                    owner: buyer,
                    event: id,
                    seq: TicketSeq::new(0),
                    purchase_price: Money::from_minor_units(1),
                    checked_in: false,
                    refunded: false,
                })
            })
            .await;
        assert_eq!(second, Err(TicketingError::AlreadyExists));
    }

    #[tokio::test]
    async fn unknown_event_reads_fail_not_found() {
        let store = EventRecordStore::new();
        let missing = EventId::derive(&AccountId::new(), "missing");
        let result = store.read(missing, |_| Ok(())).await;
        assert_eq!(result, Err(TicketingError::NotFound));
    }

    #[test]
    fn holdings_enumerate_in_sale_order() {
        let event = sample_event("Order");
        let holder = AccountId::new();
        let other = AccountId::new();
        let mut records =
            EventRecords::new(event.clone(), EscrowAccount::new(SettlementUnit::default()));
        for (seq, owner) in [(0, holder), (1, other), (2, holder)] {
            records
                .insert_ticket(Ticket {
                    owner,
                    event: event.id,
                    seq: TicketSeq::new(seq),
                    purchase_price: Money::from_minor_units(1),
                    checked_in: false,
                    refunded: false,
                })
                .unwrap();
        }
        assert_eq!(
            records.holdings_of(holder),
            vec![TicketSeq::new(0), TicketSeq::new(2)]
        );
    }
}
