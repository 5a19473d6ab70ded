//! Configuration for embedding the ticketing core.
//!
//! Loads from environment variables with sensible defaults. The trusted
//! resolver list is the configuration-time capability behind
//! [`crate::rules::can_record_resolution`].

use crate::types::{AccountId, SettlementUnit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use uuid::Uuid;

/// Core configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identities allowed to record market resolutions
    pub trusted_resolvers: HashSet<AccountId>,
    /// Unit escrow accounts settle in
    pub settlement_unit: SettlementUnit,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `EVENTGUARD_TRUSTED_RESOLVERS` is a comma-separated list of resolver
    /// UUIDs; entries that do not parse are skipped. `EVENTGUARD_SETTLEMENT_UNIT`
    /// defaults to `USDC`; `RUST_LOG` defaults to `info`.
    #[must_use]
    pub fn from_env() -> Self {
        let trusted_resolvers = env::var("EVENTGUARD_TRUSTED_RESOLVERS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|entry| Uuid::parse_str(entry.trim()).ok())
                    .map(AccountId::from_uuid)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            trusted_resolvers,
            settlement_unit: env::var("EVENTGUARD_SETTLEMENT_UNIT")
                .map_or_else(|_| SettlementUnit::default(), SettlementUnit::new),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
