//! Ticketing state machine: the seven public operations.
//!
//! Each operation acquires exclusive access to the affected event's records,
//! evaluates the relevant [`crate::rules`] checks, applies every effect, and
//! only then releases the guard — so concurrent callers observe either none
//! or all of a transition. Token-custody calls are synchronous by contract
//! and ordered as the last fallible step of a transition, so a custody
//! failure aborts with no partial state and a record failure never leaves a
//! dangling debit.

use crate::environment::TicketingEnvironment;
use crate::error::Result;
use crate::error::TicketingError;
use crate::escrow::EscrowAccount;
use crate::metrics;
use crate::rules;
use crate::store::EventRecordStore;
use crate::types::{
    AccountId, BadgeKey, CultureBadge, Event, EventConfig, EventId, EventType, Money,
    ProtectionPolicy, Resolution, SettlementUnit, Ticket, TicketKey, TicketSeq,
};
use tracing::{info, instrument};

/// The ticketing core's only entry point: orchestrates the rule evaluator,
/// the record store, and the escrow ledger behind the seven operations.
pub struct TicketingMachine {
    store: EventRecordStore,
    env: TicketingEnvironment,
    settlement_unit: SettlementUnit,
}

impl TicketingMachine {
    /// Creates a machine settling escrow accounts in `settlement_unit`.
    #[must_use]
    pub fn new(env: TicketingEnvironment, settlement_unit: SettlementUnit) -> Self {
        Self {
            store: EventRecordStore::new(),
            env,
            settlement_unit,
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Creates an event under its deterministic identity and opens its
    /// escrow account at balance zero.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for zero inventory, an empty name, or a non-future
    /// date; `AlreadyExists` when the organizer already created an event of
    /// the same name.
    #[instrument(skip(self, config), fields(organizer = %organizer, name = %config.name))]
    pub async fn create_event(
        &self,
        organizer: AccountId,
        config: EventConfig,
    ) -> Result<Event> {
        let now = self.env.clock.now();
        rules::validate_config(&config, now)?;

        let event = Event {
            id: EventId::derive(&organizer, &config.name),
            organizer,
            config,
            tickets_sold: 0,
            protection: None,
            resolution: None,
            created_at: now,
        };
        let escrow = EscrowAccount::new(self.settlement_unit.clone());
        self.store.create(event.clone(), escrow).await?;

        metrics::record_event_created();
        info!(event = %event.id, total_tickets = event.config.total_tickets, "event created");
        Ok(event)
    }

    /// Sells the next sequential ticket to `buyer`, debiting the base price
    /// into escrow.
    ///
    /// The inventory check, the custody debit, the escrow deposit, the
    /// ticket mint, and the counter increment commit as one transition.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event, `SoldOut` at capacity, or a
    /// `Custody` failure when the buyer cannot cover the price — in every
    /// case no state changes.
    #[instrument(skip(self), fields(buyer = %buyer, event = %event_id))]
    pub async fn buy_ticket(&self, buyer: AccountId, event_id: EventId) -> Result<Ticket> {
        let custody = std::sync::Arc::clone(&self.env.custody);
        let ticket = self
            .store
            .mutate(event_id, |records| {
                rules::can_buy(&records.event)?;

                let price = records.event.config.base_price;
                records.escrow.deposit(price)?;
                let ticket = Ticket {
                    owner: buyer,
                    event: event_id,
                    seq: TicketSeq::new(records.event.tickets_sold),
                    purchase_price: price,
                    checked_in: false,
                    refunded: false,
                };
                records.insert_ticket(ticket.clone())?;
                records.event.tickets_sold += 1;

                // Last fallible step: a rejected debit discards the draft,
                // and nothing after it can fail and strand the buyer's funds.
                custody.debit(buyer, price)?;
                Ok(ticket)
            })
            .await?;

        metrics::record_ticket_sold(ticket.purchase_price.minor_units());
        info!(ticket = %ticket.key(), price = %ticket.purchase_price, "ticket sold");
        Ok(ticket)
    }

    /// Checks a ticket in and mints the holder's culture badge on their
    /// first check-in for the event.
    ///
    /// `authority` identifies the gate operator submitting the check-in;
    /// authenticating that identity is the transport's concern.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown ticket, `AlreadyCheckedIn` on reuse.
    #[instrument(skip(self), fields(authority = %authority, ticket = %ticket_key))]
    pub async fn check_in(
        &self,
        authority: AccountId,
        ticket_key: TicketKey,
        event_type: EventType,
        seat_info: String,
    ) -> Result<(Ticket, CultureBadge)> {
        let now = self.env.clock.now();
        let (ticket, badge, minted) = self
            .store
            .mutate(ticket_key.event, |records| {
                let venue = records.event.config.venue.clone();
                let ticket = records.ticket_mut(ticket_key.seq)?;
                rules::can_check_in(ticket)?;
                ticket.checked_in = true;
                let ticket = ticket.clone();

                // The badge identity collision itself is the double-mint
                // guard: a holder checking a second ticket in keeps their
                // original badge.
                let (badge, minted) = match records.badges.get(&ticket.owner).cloned() {
                    Some(existing) => (existing, false),
                    None => {
                        let badge = CultureBadge {
                            owner: ticket.owner,
                            event: ticket_key.event,
                            event_type,
                            venue,
                            seat_info,
                            issued_at: now,
                        };
                        records.insert_badge(badge.clone())?;
                        (badge, true)
                    }
                };
                Ok((ticket, badge, minted))
            })
            .await?;

        if minted {
            metrics::record_badge_minted();
        }
        info!(attendee = %ticket.owner, badge_minted = minted, "ticket checked in");
        Ok((ticket, badge))
    }

    /// Transfers a ticket to `new_owner`, enforcing the event's resale
    /// rules.
    ///
    /// `proposed_price` of `None` is a gift and leaves the stored price
    /// unchanged. `recipient_holdings` is the recipient's claimed current
    /// ticket set for this event; it is cross-checked against the arena and
    /// the transfer is rejected outright if it does not match. No settlement
    /// moves between the parties here — payment, if any, is off-ledger.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` when the caller does not own the ticket,
    /// `IncompleteOwnershipProof` on a holdings mismatch, then the
    /// [`rules::can_transfer`] taxonomy (`TransfersDisabled`,
    /// `TransferLocked`, `PriceCapExceeded`, `WalletLimitExceeded`).
    #[instrument(skip(self, recipient_holdings), fields(ticket = %ticket_key, to = %new_owner))]
    pub async fn transfer_ticket(
        &self,
        current_owner: AccountId,
        new_owner: AccountId,
        ticket_key: TicketKey,
        proposed_price: Option<Money>,
        recipient_holdings: &[TicketSeq],
    ) -> Result<Ticket> {
        let now = self.env.clock.now();
        let mut claimed: Vec<TicketSeq> = recipient_holdings.to_vec();
        claimed.sort_unstable();
        claimed.dedup();

        let ticket = self
            .store
            .mutate(ticket_key.event, |records| {
                let ticket = records.ticket(ticket_key.seq)?;
                if ticket.owner != current_owner {
                    return Err(TicketingError::Unauthorized);
                }

                let actual = records.holdings_of(new_owner);
                if claimed != actual {
                    return Err(TicketingError::IncompleteOwnershipProof);
                }
                let recipient_count = u32::try_from(actual.len())
                    .map_err(|_| TicketingError::WalletLimitExceeded)?;

                rules::can_transfer(&records.event, ticket, now, proposed_price, recipient_count)?;

                let ticket = records.ticket_mut(ticket_key.seq)?;
                ticket.owner = new_owner;
                if let Some(price) = proposed_price {
                    ticket.purchase_price = price;
                }
                Ok(ticket.clone())
            })
            .await?;

        metrics::record_ticket_transferred(proposed_price.is_some());
        info!(price = %ticket.purchase_price, "ticket transferred");
        Ok(ticket)
    }

    /// Attaches a conditional-refund protection policy to an event.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` for a caller other than the organizer,
    /// `AlreadyResolved` after an outcome is on record,
    /// `ProtectionAlreadyAttached` on a second attach, `InvalidConfig` for
    /// a percentage above 100.
    #[instrument(skip(self, policy), fields(organizer = %organizer, event = %event_id, market = %policy.market_id))]
    pub async fn attach_protection(
        &self,
        organizer: AccountId,
        event_id: EventId,
        policy: ProtectionPolicy,
    ) -> Result<Event> {
        let event = self
            .store
            .mutate(event_id, |records| {
                rules::can_attach_protection(&records.event, &organizer, &policy)?;
                records.event.protection = Some(policy.clone());
                Ok(records.event.clone())
            })
            .await?;

        info!("protection attached");
        Ok(event)
    }

    /// Records the market outcome reported by a trusted resolver.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` for a reporter outside the configured
    /// trusted set, `AlreadyResolved` on redelivery.
    #[instrument(skip(self), fields(resolver = %resolver, event = %event_id, outcome))]
    pub async fn record_resolution(
        &self,
        resolver: AccountId,
        event_id: EventId,
        outcome: bool,
    ) -> Result<Event> {
        let now = self.env.clock.now();
        let trusted = &self.env.trusted_resolvers;
        let event = self
            .store
            .mutate(event_id, |records| {
                rules::can_record_resolution(&records.event, &resolver, trusted)?;
                records.event.resolution = Some(Resolution {
                    outcome,
                    recorded_at: now,
                });
                Ok(records.event.clone())
            })
            .await?;

        metrics::record_resolution_recorded();
        info!("market resolution recorded");
        Ok(event)
    }

    /// Pays the claimer their conditional refund out of the event's escrow.
    ///
    /// The refund is `purchase_price * refund_percentage / 100`, integer
    /// floor. The escrow withdrawal, the custody credit, and the `refunded`
    /// flag commit as one transition.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` when the claimer does not own the ticket,
    /// the [`rules::can_claim_refund`] taxonomy (`ConditionNotMet`,
    /// `AlreadyRefunded`), `InsufficientFunds` if escrow cannot cover the
    /// amount (defensive), or a `Custody` failure — in every case the
    /// ticket stays unrefunded.
    #[instrument(skip(self), fields(claimer = %claimer, ticket = %ticket_key))]
    pub async fn claim_refund(&self, claimer: AccountId, ticket_key: TicketKey) -> Result<Money> {
        let custody = std::sync::Arc::clone(&self.env.custody);
        let amount = self
            .store
            .mutate(ticket_key.event, |records| {
                let ticket = records.ticket(ticket_key.seq)?;
                if ticket.owner != claimer {
                    return Err(TicketingError::Unauthorized);
                }
                rules::can_claim_refund(&records.event, ticket)?;

                let percentage = records
                    .event
                    .protection
                    .as_ref()
                    .map_or(0, |policy| policy.refund_percentage);
                let amount = rules::refund_amount(ticket.purchase_price, percentage);

                records.escrow.withdraw(amount)?;
                records.ticket_mut(ticket_key.seq)?.refunded = true;

                // Last fallible step, as in `buy_ticket`.
                custody.credit(claimer, amount)?;
                Ok(amount)
            })
            .await?;

        metrics::record_refund_paid(amount.minor_units());
        info!(%amount, "refund paid");
        Ok(amount)
    }

    // ========================================================================
    // Read-only projections
    // ========================================================================

    /// Snapshot of an event record.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    pub async fn event(&self, event_id: EventId) -> Result<Event> {
        self.store.read(event_id, |records| Ok(records.event.clone())).await
    }

    /// Snapshot of a ticket record.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event or unsold sequence.
    pub async fn ticket(&self, ticket_key: TicketKey) -> Result<Ticket> {
        self.store
            .read(ticket_key.event, |records| {
                records.ticket(ticket_key.seq).cloned()
            })
            .await
    }

    /// Snapshot of a culture badge.
    ///
    /// # Errors
    ///
    /// `NotFound` when the attendee has not checked in to the event.
    pub async fn badge(&self, badge_key: BadgeKey) -> Result<CultureBadge> {
        self.store
            .read(badge_key.event, |records| {
                records.badge(badge_key.owner).cloned()
            })
            .await
    }

    /// Current escrow balance for an event.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    pub async fn escrow_balance(&self, event_id: EventId) -> Result<Money> {
        self.store
            .read(event_id, |records| Ok(records.escrow.balance()))
            .await
    }

    /// The sequences of every ticket `owner` currently holds for an event,
    /// in sale order — the enumerable identity list a transfer recipient
    /// supplies as their holdings proof.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    pub async fn holdings(&self, event_id: EventId, owner: AccountId) -> Result<Vec<TicketSeq>> {
        self.store
            .read(event_id, |records| Ok(records.holdings_of(owner)))
            .await
    }
}
