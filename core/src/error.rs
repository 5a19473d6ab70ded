//! Error types for ticketing operations.

use thiserror::Error;

/// Result type alias for ticketing operations.
pub type Result<T> = std::result::Result<T, TicketingError>;

/// Failure reported by the token-custody subsystem.
///
/// Custody failures are kept distinct from rule violations so callers can
/// tell "retry later" apart from "this request is invalid".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The debited account does not hold the requested amount.
    #[error("custody account holds less than the requested amount")]
    InsufficientFunds,

    /// The custody subsystem could not be reached; safe to retry.
    #[error("custody subsystem unavailable: {reason}")]
    Unavailable {
        /// Transport-level failure description
        reason: String,
    },
}

/// Complete failure taxonomy for the ticketing core.
///
/// Every operation either fully succeeds or fails with exactly one of these
/// kinds; failures are detected before any mutation, so no compensating
/// rollback exists anywhere in the core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketingError {
    // ═══════════════════════════════════════════════════════════
    // Inventory and purchase
    // ═══════════════════════════════════════════════════════════

    /// Every ticket for the event has been sold.
    #[error("event has sold out")]
    SoldOut,

    // ═══════════════════════════════════════════════════════════
    // Check-in
    // ═══════════════════════════════════════════════════════════

    /// The ticket was already used to check in.
    #[error("ticket has already been checked in")]
    AlreadyCheckedIn,

    // ═══════════════════════════════════════════════════════════
    // Transfers
    // ═══════════════════════════════════════════════════════════

    /// The event's configuration disables transfers outright.
    #[error("transfers are disabled for this event")]
    TransfersDisabled,

    /// The pre-event transfer-lock window has begun.
    #[error("transfer window is locked")]
    TransferLocked,

    /// The proposed resale price exceeds the markup cap.
    #[error("resale price exceeds the maximum allowed markup")]
    PriceCapExceeded,

    /// The recipient already holds the per-wallet maximum for this event.
    #[error("recipient wallet has reached the ticket limit for this event")]
    WalletLimitExceeded,

    /// The supplied recipient-holdings proof does not match the recipient's
    /// known holdings for the event.
    #[error("recipient holdings proof is incomplete")]
    IncompleteOwnershipProof,

    // ═══════════════════════════════════════════════════════════
    // Records
    // ═══════════════════════════════════════════════════════════

    /// Event configuration is unusable: zero inventory, empty name, or a
    /// date that is not in the future.
    #[error("invalid event configuration: {reason}")]
    InvalidConfig {
        /// Which configuration rule was violated
        reason: String,
    },

    /// No record exists under the requested identity.
    #[error("record not found")]
    NotFound,

    /// A record already exists under the deterministic identity.
    #[error("record already exists")]
    AlreadyExists,

    /// Caller is not permitted to perform this operation on this record.
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    // ═══════════════════════════════════════════════════════════
    // Protection and resolution
    // ═══════════════════════════════════════════════════════════

    /// A protection policy has already been attached to the event.
    #[error("protection has already been attached")]
    ProtectionAlreadyAttached,

    /// The event's market outcome has already been recorded.
    #[error("market resolution has already been recorded")]
    AlreadyResolved,

    /// The recorded outcome does not satisfy the refund condition.
    #[error("recorded outcome does not meet the refund condition")]
    ConditionNotMet,

    /// The ticket has already been refunded.
    #[error("ticket has already been refunded")]
    AlreadyRefunded,

    // ═══════════════════════════════════════════════════════════
    // Escrow
    // ═══════════════════════════════════════════════════════════

    /// The escrow balance cannot cover the requested withdrawal. Refunds are
    /// bounded by deposited prices, so this is a defensive invariant check
    /// rather than expected behavior.
    #[error("escrow balance cannot cover the requested amount")]
    InsufficientFunds,

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// The token-custody subsystem failed.
    #[error("custody operation failed: {0}")]
    Custody(#[from] CustodyError),
}

impl TicketingError {
    /// Returns `true` if this error is a precondition/rule violation — the
    /// request itself is invalid and resubmitting it unchanged cannot
    /// succeed.
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        !matches!(self, Self::Custody(CustodyError::Unavailable { .. }))
    }

    /// Returns `true` if the failure is transient infrastructure trouble
    /// and the identical request may be retried later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Custody(CustodyError::Unavailable { .. }))
    }
}
