//! Read-only projections for the presentation boundary.
//!
//! The presentation layer consumes these owned, serializable views and never
//! mutates records directly. Conversions are pure; refund eligibility is
//! derived the same way the rule evaluator derives it, minus the per-ticket
//! checks.

use crate::types::{CultureBadge, Event, Money, Ticket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public summary of an event's inventory and protection status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event identity, as a display string
    pub id: String,
    /// Event name
    pub name: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue description
    pub venue: String,
    /// Total inventory
    pub total_tickets: u32,
    /// Tickets sold so far
    pub tickets_sold: u32,
    /// Tickets still available
    pub tickets_remaining: u32,
    /// Base ticket price
    pub base_price: Money,
    /// Whether transfers are currently possible at all
    pub transfers_enabled: bool,
    /// External market gating refunds, if protection is attached
    pub protection_market: Option<String>,
    /// Whether the market outcome has been recorded
    pub resolved: bool,
    /// Whether tickets are refund-eligible right now (protection attached,
    /// outcome recorded, condition met)
    pub refund_eligible: bool,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        let refund_eligible = match (&event.protection, &event.resolution) {
            (Some(protection), Some(resolution)) => {
                protection.refund_condition.is_met_by(resolution.outcome)
            }
            _ => false,
        };
        Self {
            id: event.id.to_string(),
            name: event.config.name.clone(),
            date: event.config.date,
            venue: event.config.venue.clone(),
            total_tickets: event.config.total_tickets,
            tickets_sold: event.tickets_sold,
            tickets_remaining: event.tickets_remaining(),
            base_price: event.config.base_price,
            transfers_enabled: event.config.rules.transfers_enabled,
            protection_market: event
                .protection
                .as_ref()
                .map(|policy| policy.market_id.clone()),
            resolved: event.is_resolved(),
            refund_eligible,
        }
    }
}

/// Public view of a single ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketView {
    /// Ticket identity, as a display string
    pub id: String,
    /// Current holder, as a display string
    pub owner: String,
    /// Sale-order position
    pub seq: u32,
    /// Stored purchase price
    pub purchase_price: Money,
    /// Whether the ticket has been used to check in
    pub checked_in: bool,
    /// Whether the ticket has been refunded
    pub refunded: bool,
}

impl From<&Ticket> for TicketView {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.key().to_string(),
            owner: ticket.owner.to_string(),
            seq: ticket.seq.value(),
            purchase_price: ticket.purchase_price,
            checked_in: ticket.checked_in,
            refunded: ticket.refunded,
        }
    }
}

/// Public view of an attendance badge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeView {
    /// Attendee, as a display string
    pub owner: String,
    /// Event, as a display string
    pub event: String,
    /// Category tag stamped at check-in
    pub event_type: String,
    /// Venue snapshot
    pub venue: String,
    /// Seat or tier description supplied at check-in
    pub seat_info: String,
    /// When the badge was issued
    pub issued_at: DateTime<Utc>,
}

impl From<&CultureBadge> for BadgeView {
    fn from(badge: &CultureBadge) -> Self {
        Self {
            owner: badge.owner.to_string(),
            event: badge.event.to_string(),
            event_type: badge.event_type.to_string(),
            venue: badge.venue.clone(),
            seat_info: badge.seat_info.clone(),
            issued_at: badge.issued_at,
        }
    }
}
