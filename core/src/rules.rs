//! Rule evaluator: pure precondition checks for every state transition.
//!
//! Every function here is side-effect free and deterministic given its
//! inputs. The state machine evaluates the relevant check while holding the
//! affected records' exclusive access, so a check that passes is still valid
//! when the mutation is applied.

use crate::error::{Result, TicketingError};
use crate::types::{AccountId, Event, EventConfig, Money, ProtectionPolicy, Ticket};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Validates configuration for a new event.
///
/// # Errors
///
/// `InvalidConfig` on zero inventory, an empty name, or a date that is not
/// in the future.
pub fn validate_config(config: &EventConfig, now: DateTime<Utc>) -> Result<()> {
    if config.name.trim().is_empty() {
        return Err(TicketingError::InvalidConfig {
            reason: "event name cannot be empty".to_string(),
        });
    }
    if config.total_tickets == 0 {
        return Err(TicketingError::InvalidConfig {
            reason: "total ticket inventory must be greater than zero".to_string(),
        });
    }
    if config.date <= now {
        return Err(TicketingError::InvalidConfig {
            reason: "event date must be in the future".to_string(),
        });
    }
    Ok(())
}

/// Whether another ticket can be sold for the event.
///
/// # Errors
///
/// `SoldOut` once `tickets_sold` has reached the configured inventory.
pub const fn can_buy(event: &Event) -> Result<()> {
    if event.tickets_sold >= event.config.total_tickets {
        return Err(TicketingError::SoldOut);
    }
    Ok(())
}

/// Whether the ticket can be used to check in.
///
/// # Errors
///
/// `AlreadyCheckedIn` if the ticket was used before.
pub const fn can_check_in(ticket: &Ticket) -> Result<()> {
    if ticket.checked_in {
        return Err(TicketingError::AlreadyCheckedIn);
    }
    Ok(())
}

/// Whether the ticket can move to a recipient currently holding
/// `recipient_count` tickets for the event.
///
/// `proposed_price` of `None` is a gift: the stored price is unchanged and
/// the markup cap does not apply.
///
/// # Errors
///
/// In evaluation order: `TransfersDisabled`, `TransferLocked` once `now`
/// has entered the pre-event lock window, `PriceCapExceeded` when a proposed
/// price exceeds `purchase_price + purchase_price * markup_bps / 10_000`
/// (integer floor), and `WalletLimitExceeded` when the recipient is at the
/// per-wallet maximum.
pub fn can_transfer(
    event: &Event,
    ticket: &Ticket,
    now: DateTime<Utc>,
    proposed_price: Option<Money>,
    recipient_count: u32,
) -> Result<()> {
    if !event.config.rules.transfers_enabled {
        return Err(TicketingError::TransfersDisabled);
    }
    if now >= event.transfer_lock_begins_at() {
        return Err(TicketingError::TransferLocked);
    }
    if let Some(price) = proposed_price {
        let cap = ticket
            .purchase_price
            .with_markup_bps(event.config.rules.max_resale_markup_bps);
        if price > cap {
            return Err(TicketingError::PriceCapExceeded);
        }
    }
    if recipient_count >= event.config.rules.max_tickets_per_wallet {
        return Err(TicketingError::WalletLimitExceeded);
    }
    Ok(())
}

/// Whether the caller may attach the given protection policy to the event.
///
/// # Errors
///
/// `Unauthorized` unless the caller is the event organizer, `AlreadyResolved`
/// once an outcome has been recorded, `ProtectionAlreadyAttached` on a second
/// attach, and `InvalidConfig` for a percentage above 100.
pub fn can_attach_protection(
    event: &Event,
    caller: &AccountId,
    policy: &ProtectionPolicy,
) -> Result<()> {
    if *caller != event.organizer {
        return Err(TicketingError::Unauthorized);
    }
    if event.is_resolved() {
        return Err(TicketingError::AlreadyResolved);
    }
    if event.protection.is_some() {
        return Err(TicketingError::ProtectionAlreadyAttached);
    }
    if policy.refund_percentage > 100 {
        return Err(TicketingError::InvalidConfig {
            reason: "refund percentage must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

/// Whether the caller may record a market resolution for the event.
///
/// # Errors
///
/// `Unauthorized` unless the caller is one of the configured trusted
/// resolver identities; `AlreadyResolved` on redelivery.
pub fn can_record_resolution(
    event: &Event,
    caller: &AccountId,
    trusted_resolvers: &HashSet<AccountId>,
) -> Result<()> {
    if !trusted_resolvers.contains(caller) {
        return Err(TicketingError::Unauthorized);
    }
    if event.is_resolved() {
        return Err(TicketingError::AlreadyResolved);
    }
    Ok(())
}

/// Whether the ticket is currently refund-eligible under the event's
/// protection policy.
///
/// Check-in status is deliberately not consulted: attendance and refunds are
/// independent tracks.
///
/// # Errors
///
/// `ConditionNotMet` when no protection is attached, no outcome has been
/// recorded, or the recorded outcome does not satisfy the refund condition;
/// `AlreadyRefunded` on a repeat claim.
pub fn can_claim_refund(event: &Event, ticket: &Ticket) -> Result<()> {
    let Some(protection) = &event.protection else {
        return Err(TicketingError::ConditionNotMet);
    };
    let Some(resolution) = &event.resolution else {
        return Err(TicketingError::ConditionNotMet);
    };
    if !protection.refund_condition.is_met_by(resolution.outcome) {
        return Err(TicketingError::ConditionNotMet);
    }
    if ticket.refunded {
        return Err(TicketingError::AlreadyRefunded);
    }
    Ok(())
}

/// The amount paid out when a ticket is refunded:
/// `purchase_price * refund_percentage / 100`, integer floor.
#[must_use]
pub const fn refund_amount(purchase_price: Money, refund_percentage: u8) -> Money {
    purchase_price.percentage(refund_percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, RefundCondition, ResaleRules, Resolution, TicketSeq};
    use chrono::Duration;
    use proptest::prelude::*;

    fn test_event(organizer: AccountId, now: DateTime<Utc>) -> Event {
        Event {
            id: EventId::derive(&organizer, "Test Event"),
            organizer,
            config: EventConfig {
                name: "Test Event".to_string(),
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
            },
            tickets_sold: 0,
            protection: None,
            resolution: None,
            created_at: now,
        }
    }

    fn test_ticket(event: &Event, owner: AccountId) -> Ticket {
        Ticket {
            owner,
            event: event.id,
            seq: TicketSeq::new(0),
            purchase_price: Money::from_minor_units(100),
            checked_in: false,
            refunded: false,
        }
    }

    #[test]
    fn config_validation_rejects_each_bad_field() {
        let now = Utc::now();
        let organizer = AccountId::new();
        let good = test_event(organizer, now).config;

        assert!(validate_config(&good, now).is_ok());

        let mut empty_name = good.clone();
        empty_name.name = "  ".to_string();
        assert!(matches!(
            validate_config(&empty_name, now),
            Err(TicketingError::InvalidConfig { .. })
        ));

        let mut no_inventory = good.clone();
        no_inventory.total_tickets = 0;
        assert!(matches!(
            validate_config(&no_inventory, now),
            Err(TicketingError::InvalidConfig { .. })
        ));

        let mut past_date = good;
        past_date.date = now - Duration::hours(1);
        assert!(matches!(
            validate_config(&past_date, now),
            Err(TicketingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn buy_is_rejected_only_at_capacity() {
        let now = Utc::now();
        let mut event = test_event(AccountId::new(), now);
        assert!(can_buy(&event).is_ok());
        event.tickets_sold = 2;
        assert_eq!(can_buy(&event), Err(TicketingError::SoldOut));
    }

    #[test]
    fn transfer_checks_run_in_order() {
        let now = Utc::now();
        let event = test_event(AccountId::new(), now);
        let ticket = test_ticket(&event, AccountId::new());

        // Disabled transfers win over everything else.
        let mut disabled = event.clone();
        disabled.config.rules.transfers_enabled = false;
        assert_eq!(
            can_transfer(&disabled, &ticket, now, Some(Money::from_minor_units(999)), 99),
            Err(TicketingError::TransfersDisabled)
        );

        // Inside the lock window the price is never even considered.
        let locked_now = event.config.date - Duration::minutes(30);
        assert_eq!(
            can_transfer(&event, &ticket, locked_now, Some(Money::from_minor_units(1)), 0),
            Err(TicketingError::TransferLocked)
        );

        // 1000 bps over 100: 110 passes, 111 does not.
        assert!(can_transfer(&event, &ticket, now, Some(Money::from_minor_units(110)), 0).is_ok());
        assert_eq!(
            can_transfer(&event, &ticket, now, Some(Money::from_minor_units(111)), 0),
            Err(TicketingError::PriceCapExceeded)
        );

        // Gift: no price, no cap.
        assert!(can_transfer(&event, &ticket, now, None, 0).is_ok());

        // Recipient at the wallet limit.
        assert_eq!(
            can_transfer(&event, &ticket, now, None, 2),
            Err(TicketingError::WalletLimitExceeded)
        );
    }

    #[test]
    fn lock_boundary_is_inclusive() {
        let now = Utc::now();
        let event = test_event(AccountId::new(), now);
        let ticket = test_ticket(&event, AccountId::new());
        let boundary = event.transfer_lock_begins_at();

        assert!(can_transfer(&event, &ticket, boundary - Duration::seconds(1), None, 0).is_ok());
        assert_eq!(
            can_transfer(&event, &ticket, boundary, None, 0),
            Err(TicketingError::TransferLocked)
        );
    }

    #[test]
    fn protection_attach_is_organizer_only_and_once() {
        let now = Utc::now();
        let organizer = AccountId::new();
        let mut event = test_event(organizer, now);
        let policy = ProtectionPolicy {
            market_id: "weather-2026".to_string(),
            refund_condition: RefundCondition::OnYes,
            refund_percentage: 50,
        };

        assert_eq!(
            can_attach_protection(&event, &AccountId::new(), &policy),
            Err(TicketingError::Unauthorized)
        );
        assert!(can_attach_protection(&event, &organizer, &policy).is_ok());

        let over_limit = ProtectionPolicy {
            refund_percentage: 101,
            ..policy.clone()
        };
        assert!(matches!(
            can_attach_protection(&event, &organizer, &over_limit),
            Err(TicketingError::InvalidConfig { .. })
        ));

        event.protection = Some(policy.clone());
        assert_eq!(
            can_attach_protection(&event, &organizer, &policy),
            Err(TicketingError::ProtectionAlreadyAttached)
        );

        event.protection = None;
        event.resolution = Some(Resolution {
            outcome: true,
            recorded_at: now,
        });
        assert_eq!(
            can_attach_protection(&event, &organizer, &policy),
            Err(TicketingError::AlreadyResolved)
        );
    }

    #[test]
    fn resolution_requires_trusted_identity_and_rejects_redelivery() {
        let now = Utc::now();
        let mut event = test_event(AccountId::new(), now);
        let resolver = AccountId::new();
        let trusted: HashSet<AccountId> = [resolver].into_iter().collect();

        assert_eq!(
            can_record_resolution(&event, &AccountId::new(), &trusted),
            Err(TicketingError::Unauthorized)
        );
        assert!(can_record_resolution(&event, &resolver, &trusted).is_ok());

        event.resolution = Some(Resolution {
            outcome: false,
            recorded_at: now,
        });
        assert_eq!(
            can_record_resolution(&event, &resolver, &trusted),
            Err(TicketingError::AlreadyResolved)
        );
    }

    #[test]
    fn refund_gates_on_protection_resolution_and_condition() {
        let now = Utc::now();
        let mut event = test_event(AccountId::new(), now);
        let mut ticket = test_ticket(&event, AccountId::new());

        // No protection attached yet.
        assert_eq!(
            can_claim_refund(&event, &ticket),
            Err(TicketingError::ConditionNotMet)
        );

        event.protection = Some(ProtectionPolicy {
            market_id: "m".to_string(),
            refund_condition: RefundCondition::OnNo,
            refund_percentage: 100,
        });

        // Protection attached but unresolved.
        assert_eq!(
            can_claim_refund(&event, &ticket),
            Err(TicketingError::ConditionNotMet)
        );

        // Resolved against the condition.
        event.resolution = Some(Resolution {
            outcome: true,
            recorded_at: now,
        });
        assert_eq!(
            can_claim_refund(&event, &ticket),
            Err(TicketingError::ConditionNotMet)
        );

        // Resolved in favor.
        event.resolution = Some(Resolution {
            outcome: false,
            recorded_at: now,
        });
        assert!(can_claim_refund(&event, &ticket).is_ok());

        // Check-in does not forfeit eligibility.
        ticket.checked_in = true;
        assert!(can_claim_refund(&event, &ticket).is_ok());

        ticket.refunded = true;
        assert_eq!(
            can_claim_refund(&event, &ticket),
            Err(TicketingError::AlreadyRefunded)
        );
    }

    proptest! {
        #[test]
        fn refund_never_exceeds_the_purchase_price(
            price in 0u64..=u64::MAX,
            percentage in 0u8..=100,
        ) {
            let refund = refund_amount(Money::from_minor_units(price), percentage);
            prop_assert!(refund.minor_units() <= price);
        }

        #[test]
        fn full_percentage_refunds_exactly_the_purchase_price(price in 0u64..=u64::MAX) {
            let refund = refund_amount(Money::from_minor_units(price), 100);
            prop_assert_eq!(refund.minor_units(), price);
        }

        #[test]
        fn markup_cap_admits_the_purchase_price_itself(
            price in 0u64..=u64::MAX,
            bps in 0u32..=50_000,
        ) {
            let cap = Money::from_minor_units(price).with_markup_bps(bps);
            prop_assert!(cap.minor_units() >= price);
        }

        #[test]
        fn markup_cap_is_monotone_in_bps(
            price in 0u64..=1_000_000_000_000u64,
            lo in 0u32..=10_000,
            extra in 0u32..=10_000,
        ) {
            let money = Money::from_minor_units(price);
            prop_assert!(money.with_markup_bps(lo + extra).minor_units()
                >= money.with_markup_bps(lo).minor_units());
        }
    }
}
