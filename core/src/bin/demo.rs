//! EventGuard Demo
//!
//! End-to-end walkthrough of the ticketing core:
//! - Event creation with escrow initialization
//! - Ticket sales until the inventory bound trips
//! - Check-in with culture badge minting
//! - A markup-capped resale and a rejected scalper price
//! - Protection attach, market resolution, conditional refund
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin demo
//! ```

use eventguard_core::{
    AccountId, Config, EventConfig, EventType, Money, ProtectionPolicy, RefundCondition,
    ResaleRules, ResolutionGateway, ResolutionReport, SystemClock, TicketingEnvironment,
    TicketingMachine, TokenCustody, metrics, projections::EventSummary,
};
use eventguard_core::error::CustodyError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Minimal custody stand-in for the demo: every account starts with 1000
/// units and balances live in process.
#[derive(Debug, Default)]
struct DemoCustody {
    balances: Mutex<std::collections::HashMap<AccountId, Money>>,
}

impl DemoCustody {
    fn balance(&self, account: AccountId) -> Money {
        self.balances
            .lock()
            .map(|balances| balances.get(&account).copied())
            .ok()
            .flatten()
            .unwrap_or_else(Self::starting_balance)
    }

    fn starting_balance() -> Money {
        Money::checked_from_units(1_000).unwrap_or(Money::ZERO)
    }
}

impl TokenCustody for DemoCustody {
    fn debit(&self, account: AccountId, amount: Money) -> Result<(), CustodyError> {
        let mut balances = self.balances.lock().map_err(|_| CustodyError::Unavailable {
            reason: "demo custody lock poisoned".to_string(),
        })?;
        let balance = balances
            .entry(account)
            .or_insert_with(Self::starting_balance);
        *balance = balance
            .checked_sub(amount)
            .ok_or(CustodyError::InsufficientFunds)?;
        Ok(())
    }

    fn credit(&self, account: AccountId, amount: Money) -> Result<(), CustodyError> {
        let mut balances = self.balances.lock().map_err(|_| CustodyError::Unavailable {
            reason: "demo custody lock poisoned".to_string(),
        })?;
        let balance = balances
            .entry(account)
            .or_insert_with(Self::starting_balance);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Unavailable {
                reason: "demo balance overflow".to_string(),
            })?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eventguard_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🎫 ============================================");
    println!("   EventGuard Ticketing Core - Live Demo");
    println!("============================================\n");

    let config = Config::from_env();
    metrics::register_business_metrics();

    let resolver = AccountId::new();
    let mut trusted: HashSet<AccountId> = config.trusted_resolvers;
    trusted.insert(resolver);

    let custody = Arc::new(DemoCustody::default());
    let env = TicketingEnvironment::new(Arc::new(SystemClock), Arc::clone(&custody) as _, trusted);
    let machine = Arc::new(TicketingMachine::new(env, config.settlement_unit));
    let gateway = ResolutionGateway::new(Arc::clone(&machine));

    // Step 1: organizer creates a protected two-ticket event
    println!("1️⃣  Creating event...");
    let organizer = AccountId::new();
    let event = machine
        .create_event(
            organizer,
            EventConfig {
                name: "Open Air Finale".to_string(),
                date: chrono::Utc::now() + chrono::Duration::days(30),
                venue: "Riverside Stage".to_string(),
                total_tickets: 2,
                base_price: Money::from_minor_units(100_000_000),
                rules: ResaleRules {
                    max_resale_markup_bps: 1_000,
                    transfer_lock_secs: 24 * 3_600,
                    max_tickets_per_wallet: 2,
                    transfers_enabled: true,
                },
            },
        )
        .await?;
    println!("   ✓ Event created: {}\n", event.id);

    machine
        .attach_protection(
            organizer,
            event.id,
            ProtectionPolicy {
                market_id: "will-it-rain-on-the-finale".to_string(),
                refund_condition: RefundCondition::OnYes,
                refund_percentage: 50,
            },
        )
        .await?;
    println!("   ✓ Protection attached: 50% refund if the market resolves YES\n");

    // Step 2: sell out, then watch the inventory bound trip
    println!("2️⃣  Selling tickets...");
    let alice = AccountId::new();
    let bob = AccountId::new();
    let carol = AccountId::new();

    let alice_ticket = machine.buy_ticket(alice, event.id).await?;
    let bob_ticket = machine.buy_ticket(bob, event.id).await?;
    println!("   ✓ Sold {} to alice, {} to bob", alice_ticket.key(), bob_ticket.key());

    match machine.buy_ticket(carol, event.id).await {
        Err(error) => println!("   ✓ Third buy rejected as expected: {error}\n"),
        Ok(_) => println!("   ✗ Third buy unexpectedly succeeded!\n"),
    }

    // Step 3: alice checks in and receives her culture badge
    println!("3️⃣  Checking alice in...");
    let gate = AccountId::new();
    let (_, badge) = machine
        .check_in(gate, alice_ticket.key(), EventType::Music, "GA".to_string())
        .await?;
    println!("   ✓ Badge minted for {} at {}\n", badge.owner, badge.venue);

    // Step 4: bob resells to carol inside the markup cap
    println!("4️⃣  Reselling bob's ticket...");
    let scalper_price = Money::from_minor_units(200_000_000);
    if let Err(error) = machine
        .transfer_ticket(bob, carol, bob_ticket.key(), Some(scalper_price), &[])
        .await
    {
        println!("   ✓ Scalper price rejected: {error}");
    }
    let resold = machine
        .transfer_ticket(
            bob,
            carol,
            bob_ticket.key(),
            Some(Money::from_minor_units(110_000_000)),
            &[],
        )
        .await?;
    println!("   ✓ Resold at {} to carol\n", resold.purchase_price);

    // Step 5: the oracle reports rain; alice claims her conditional refund
    println!("5️⃣  Resolving the market and claiming refunds...");
    gateway
        .submit(ResolutionReport {
            reporter: resolver,
            event: event.id,
            market_id: "will-it-rain-on-the-finale".to_string(),
            outcome: true,
        })
        .await?;

    let refund = machine.claim_refund(alice, alice_ticket.key()).await?;
    println!("   ✓ Alice refunded {refund} (balance now {})", custody.balance(alice));

    match machine.claim_refund(alice, alice_ticket.key()).await {
        Err(error) => println!("   ✓ Second claim rejected: {error}\n"),
        Ok(_) => println!("   ✗ Second claim unexpectedly paid!\n"),
    }

    // Final projection snapshot, as the presentation layer would read it
    let summary = EventSummary::from(&machine.event(event.id).await?);
    println!("📊 Final event summary:\n{}", serde_json::to_string_pretty(&summary)?);
    println!(
        "💰 Escrow balance: {}",
        machine.escrow_balance(event.id).await?
    );

    Ok(())
}
