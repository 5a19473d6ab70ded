//! Business metrics for the ticketing core.
//!
//! Counters are recorded through the `metrics` facade; wiring an exporter is
//! the embedding application's concern.
//!
//! # Exported Metrics
//!
//! - `eventguard_events_created_total` - Events created
//! - `eventguard_tickets_sold_total` - Tickets sold
//! - `eventguard_ticket_transfers_total{kind}` - Transfers by kind (sale, gift)
//! - `eventguard_badges_minted_total` - Culture badges minted at check-in
//! - `eventguard_resolutions_recorded_total` - Market resolutions accepted
//! - `eventguard_refunds_paid_total` - Refunds paid out
//! - `eventguard_refunds_paid_minor_units_total` - Refund volume in minor units
//! - `eventguard_escrow_deposits_minor_units_total` - Escrow inflow in minor units

use metrics::describe_counter;

/// Initialize and register all business metrics descriptions.
///
/// Call once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "eventguard_events_created_total",
        "Total number of events created"
    );
    describe_counter!(
        "eventguard_tickets_sold_total",
        "Total number of tickets sold across all events"
    );
    describe_counter!(
        "eventguard_ticket_transfers_total",
        "Total number of ticket transfers by kind (sale, gift)"
    );
    describe_counter!(
        "eventguard_badges_minted_total",
        "Total number of culture badges minted at check-in"
    );
    describe_counter!(
        "eventguard_resolutions_recorded_total",
        "Total number of market resolutions accepted"
    );
    describe_counter!("eventguard_refunds_paid_total", "Total refunds paid out");
    describe_counter!(
        "eventguard_refunds_paid_minor_units_total",
        "Total refund volume in settlement minor units"
    );
    describe_counter!(
        "eventguard_escrow_deposits_minor_units_total",
        "Total escrow inflow in settlement minor units"
    );

    tracing::info!("Business metrics registered");
}

/// Record an event created.
pub fn record_event_created() {
    metrics::counter!("eventguard_events_created_total").increment(1);
}

/// Record a ticket sold and its escrow deposit.
pub fn record_ticket_sold(price_minor_units: u64) {
    metrics::counter!("eventguard_tickets_sold_total").increment(1);
    metrics::counter!("eventguard_escrow_deposits_minor_units_total")
        .increment(price_minor_units);
}

/// Record a completed transfer; `priced` distinguishes sales from gifts.
pub fn record_ticket_transferred(priced: bool) {
    let kind = if priced { "sale" } else { "gift" };
    metrics::counter!("eventguard_ticket_transfers_total", "kind" => kind).increment(1);
}

/// Record a badge minted at check-in.
pub fn record_badge_minted() {
    metrics::counter!("eventguard_badges_minted_total").increment(1);
}

/// Record an accepted market resolution.
pub fn record_resolution_recorded() {
    metrics::counter!("eventguard_resolutions_recorded_total").increment(1);
}

/// Record a refund payout.
pub fn record_refund_paid(amount_minor_units: u64) {
    metrics::counter!("eventguard_refunds_paid_total").increment(1);
    metrics::counter!("eventguard_refunds_paid_minor_units_total").increment(amount_minor_units);
}
