//! Audit reporting.
//!
//! The report answers "who is banned and who is locked right now" from the
//! attempt ledger alone. It deliberately never consults the counter store:
//! counters are volatile and may have drifted, while the ledger holds the
//! full history the thresholds can be recomputed from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, config::GuardConfig, repositories::AttemptLedger};

/// Point-in-time view of enforcement state, recomputed from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    /// Client addresses over the ban threshold.
    pub banned_ips: Vec<String>,
    /// Login names of accounts over the lock threshold.
    pub locked_users: Vec<String>,
}

/// Service producing [`ReportSnapshot`]s.
pub struct ReportService<L>
where
    L: AttemptLedger,
{
    ledger: Arc<L>,
    config: GuardConfig,
}

impl<L> ReportService<L>
where
    L: AttemptLedger,
{
    pub fn new(ledger: Arc<L>, config: GuardConfig) -> Self {
        Self { ledger, config }
    }

    /// Recompute the banned and locked sets from the ledger.
    ///
    /// Fail-hard: either query failing fails the whole snapshot. A report
    /// that silently dropped one half would read as "nothing flagged".
    pub async fn snapshot(&self) -> Result<ReportSnapshot, Error> {
        let banned_ips = self.ledger.banned_ips(self.config.ip_ban_threshold).await?;
        let locked_users = self
            .ledger
            .locked_logins(self.config.user_lock_threshold)
            .await?;

        Ok(ReportSnapshot {
            banned_ips,
            locked_users,
        })
    }
}
