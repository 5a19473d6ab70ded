//! Concurrency stress tests for last-ticket and double-refund races.
//!
//! These tests verify that under heavy concurrent load the per-event
//! exclusive guard admits exactly one winner wherever exactly one effect may
//! occur, and that events do not contend with each other.
//!
//! Run with: `cargo test --test concurrency_test -- --nocapture`

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use eventguard_core::{
    AccountId, Clock, EventConfig, Money, ProtectionPolicy, RefundCondition, SettlementUnit,
    TicketSeq, TicketingEnvironment, TicketingError, TicketingMachine,
};
use eventguard_testing::{InMemoryCustody, SteppableClock, event_config, test_clock};
use std::collections::HashSet;
use std::sync::Arc;

struct Harness {
    machine: Arc<TicketingMachine>,
    custody: Arc<InMemoryCustody>,
    clock: Arc<SteppableClock>,
    resolver: AccountId,
}

fn harness() -> Harness {
    let clock = Arc::new(SteppableClock::new(test_clock().now()));
    let custody = Arc::new(InMemoryCustody::new());
    let resolver = AccountId::new();
    let trusted: HashSet<AccountId> = [resolver].into_iter().collect();
    let env = TicketingEnvironment::new(
        Arc::clone(&clock) as Arc<dyn eventguard_core::Clock>,
        Arc::clone(&custody) as Arc<dyn eventguard_core::TokenCustody>,
        trusted,
    );
    Harness {
        machine: Arc::new(TicketingMachine::new(env, SettlementUnit::default())),
        custody,
        clock,
        resolver,
    }
}

/// 100 funded buyers race for the last ticket: exactly one wins, 99 get
/// `SoldOut`, and exactly one debit happened.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn last_ticket_race_admits_exactly_one_winner() {
    let h = harness();
    let organizer = AccountId::new();
    let config = EventConfig {
        total_tickets: 1,
        ..event_config("Last Ticket", h.clock.now())
    };
    let event = h.machine.create_event(organizer, config).await.unwrap();
    let price = event.config.base_price;

    let buyers: Vec<AccountId> = (0..100)
        .map(|_| {
            let buyer = AccountId::new();
            h.custody.fund(buyer, price);
            buyer
        })
        .collect();

    let handles: Vec<_> = buyers
        .iter()
        .map(|&buyer| {
            let machine = Arc::clone(&h.machine);
            let event_id = event.id;
            tokio::spawn(async move { (buyer, machine.buy_ticket(buyer, event_id).await) })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let winners: Vec<_> = results
        .iter()
        .filter(|(_, result)| result.is_ok())
        .collect();
    let losers: Vec<_> = results
        .iter()
        .filter(|(_, result)| result.is_err())
        .collect();

    assert_eq!(winners.len(), 1, "exactly one buyer may win the last ticket");
    assert_eq!(losers.len(), 99);
    for (_, result) in &losers {
        assert_eq!(result.clone().unwrap_err(), TicketingError::SoldOut);
    }

    let event = h.machine.event(event.id).await.unwrap();
    assert_eq!(event.tickets_sold, 1);

    // Exactly one buyer was debited; everyone else kept their funds.
    let debited: Vec<_> = buyers
        .iter()
        .filter(|&&buyer| h.custody.balance(buyer).is_zero())
        .collect();
    assert_eq!(debited.len(), 1);
    assert_eq!(
        h.machine.escrow_balance(event.id).await.unwrap(),
        price
    );
}

/// 50 contenders for 3 tickets: exactly three sales, sequences 0, 1, 2.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn capacity_race_sells_exactly_the_inventory() {
    let h = harness();
    let organizer = AccountId::new();
    let config = EventConfig {
        total_tickets: 3,
        ..event_config("Three Seats", h.clock.now())
    };
    let event = h.machine.create_event(organizer, config).await.unwrap();
    let price = event.config.base_price;

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let buyer = AccountId::new();
            h.custody.fund(buyer, price);
            let machine = Arc::clone(&h.machine);
            let event_id = event.id;
            tokio::spawn(async move { machine.buy_ticket(buyer, event_id).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let mut sold_seqs: Vec<TicketSeq> = results
        .iter()
        .filter_map(|result| result.as_ref().ok().map(|ticket| ticket.seq))
        .collect();
    sold_seqs.sort_unstable();

    assert_eq!(
        sold_seqs,
        vec![TicketSeq::new(0), TicketSeq::new(1), TicketSeq::new(2)],
        "winners hold the distinct sequential ids"
    );
    assert_eq!(results.iter().filter(|result| result.is_err()).count(), 47);
    assert_eq!(h.machine.event(event.id).await.unwrap().tickets_sold, 3);
}

/// Two concurrent refund claims on one ticket: exactly one pays out.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn double_refund_race_pays_exactly_once() {
    let h = harness();
    let organizer = AccountId::new();
    let config = EventConfig {
        base_price: Money::from_minor_units(100_000_000),
        ..event_config("Refund Race", h.clock.now())
    };
    let event = h.machine.create_event(organizer, config).await.unwrap();
    h.machine
        .attach_protection(
            organizer,
            event.id,
            ProtectionPolicy {
                market_id: "refund-race".to_string(),
                refund_condition: RefundCondition::OnYes,
                refund_percentage: 50,
            },
        )
        .await
        .unwrap();

    let holder = AccountId::new();
    h.custody.fund(holder, Money::from_minor_units(100_000_000));
    let ticket = h.machine.buy_ticket(holder, event.id).await.unwrap();
    h.machine
        .record_resolution(h.resolver, event.id, true)
        .await
        .unwrap();

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let machine = Arc::clone(&h.machine);
            let key = ticket.key();
            tokio::spawn(async move { machine.claim_refund(holder, key).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let payouts: Vec<Money> = results
        .iter()
        .filter_map(|result| result.as_ref().ok().copied())
        .collect();
    assert_eq!(payouts, vec![Money::from_minor_units(50_000_000)]);
    for result in results.iter().filter(|result| result.is_err()) {
        assert_eq!(
            result.clone().unwrap_err(),
            TicketingError::AlreadyRefunded
        );
    }

    // Paid exactly once: holder got half back, escrow kept the other half.
    assert_eq!(
        h.custody.balance(holder),
        Money::from_minor_units(50_000_000)
    );
    assert_eq!(
        h.machine.escrow_balance(event.id).await.unwrap(),
        Money::from_minor_units(50_000_000)
    );
}

/// Operations on distinct events do not serialize against each other: every
/// buy across ten events succeeds.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn independent_events_proceed_in_parallel() {
    let h = harness();

    let mut event_ids = Vec::new();
    for index in 0..10 {
        let organizer = AccountId::new();
        let config = EventConfig {
            total_tickets: 5,
            ..event_config(&format!("Parallel {index}"), h.clock.now())
        };
        let event = h.machine.create_event(organizer, config).await.unwrap();
        event_ids.push(event.id);
    }

    let handles: Vec<_> = event_ids
        .iter()
        .flat_map(|&event_id| {
            (0..5).map(move |_| (event_id, AccountId::new()))
        })
        .map(|(event_id, buyer)| {
            h.custody.fund(buyer, Money::from_minor_units(1_000_000));
            let machine = Arc::clone(&h.machine);
            tokio::spawn(async move { machine.buy_ticket(buyer, event_id).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    assert!(
        results
            .into_iter()
            .all(|joined| joined.expect("task panicked").is_ok()),
        "no buy should fail when every event has capacity for its buyers"
    );

    for event_id in event_ids {
        assert_eq!(h.machine.event(event_id).await.unwrap().tickets_sold, 5);
    }
}
