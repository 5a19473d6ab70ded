//! Resolution gateway: the authenticated entry point for the external
//! resolution feed.
//!
//! The feed watches one market per protected event and reports its binary
//! outcome exactly once. Verifying the reporter's signature is the
//! transport's concern; the gateway carries the verified identity into the
//! state machine, where the trusted-resolver capability decides whether the
//! report is accepted.

use crate::error::Result;
use crate::machine::TicketingMachine;
use crate::types::{AccountId, Event, EventId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};

/// An outcome report delivered by the resolution feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Verified identity of the reporter
    pub reporter: AccountId,
    /// Event whose market resolved
    pub event: EventId,
    /// External market the outcome belongs to (logged for audit)
    pub market_id: String,
    /// The binary outcome
    pub outcome: bool,
}

/// Thin forwarding layer between the resolution feed and the state machine.
#[derive(Clone)]
pub struct ResolutionGateway {
    machine: Arc<TicketingMachine>,
}

impl ResolutionGateway {
    /// Creates a gateway in front of `machine`.
    #[must_use]
    pub const fn new(machine: Arc<TicketingMachine>) -> Self {
        Self { machine }
    }

    /// Forwards an outcome report into the state machine.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for a reporter outside the trusted set,
    /// `AlreadyResolved` on redelivery, `NotFound` for an unknown event.
    #[instrument(skip(self), fields(reporter = %report.reporter, event = %report.event, market = %report.market_id))]
    pub async fn submit(&self, report: ResolutionReport) -> Result<Event> {
        let outcome = self
            .machine
            .record_resolution(report.reporter, report.event, report.outcome)
            .await;
        if let Err(error) = &outcome {
            warn!(%error, "resolution report rejected");
        }
        outcome
    }
}
