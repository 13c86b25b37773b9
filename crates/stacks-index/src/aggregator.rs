//! Network-wide reputation bookkeeping
//!
//! Keeps each account's score and tier in step with its counters and
//! summarises the tier distribution across the network.

use serde::{Deserialize, Serialize};
use stacks_core::reputation::{self, Tier};
use stacks_core::{Account, AccountId, AccountStore, Error, Result};
use std::sync::Arc;

/// Action label used by [`ReputationService::access_allowed`]
pub const ACCESS_RESOURCE: &str = "access resource";

/// Result of refreshing one account during a bulk recalculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Updated { score: i64, tier: Tier },
    Skipped(String),
}

/// Per-account outcomes of [`ReputationService::recalculate_all`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecalculationReport {
    pub outcomes: Vec<(AccountId, Outcome)>,
}

impl RecalculationReport {
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Updated { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.updated()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped() == 0
    }
}

/// Tier distribution across every account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_users: usize,
    pub contributors: usize,
    pub neutral: usize,
    pub leechers: usize,
    pub average_score: f64,
}

/// Reputation details for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationInfo {
    pub account_id: AccountId,
    pub score: i64,
    pub tier: Tier,
    pub uploads: u64,
    pub downloads: u64,
    pub average_rating: f64,
    pub throttle: f64,
}

impl From<&Account> for ReputationInfo {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            score: account.score,
            tier: account.tier,
            uploads: account.uploads,
            downloads: account.downloads,
            average_rating: account.average_rating,
            throttle: reputation::throttle_multiplier(account.tier),
        }
    }
}

pub struct ReputationService<S> {
    store: Arc<S>,
}

impl<S: AccountStore> ReputationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Score implied by an account's current counters
    pub fn calculate(&self, account_id: &AccountId) -> Result<i64> {
        let account = self.store.get_account(account_id)?;
        Ok(reputation::score(
            account.uploads,
            account.downloads,
            account.average_rating,
        ))
    }

    /// Refresh score and tier for every account.
    ///
    /// Best effort: an account whose write-back fails is recorded as
    /// skipped and the pass carries on. Only a failure to list accounts
    /// fails the call.
    pub fn recalculate_all(&self) -> Result<RecalculationReport> {
        let accounts = self.store.list_accounts()?;
        let mut report = RecalculationReport {
            outcomes: Vec::with_capacity(accounts.len()),
        };

        for mut account in accounts {
            account.refresh();
            let outcome = match self.store.update_account(&account) {
                Ok(()) => Outcome::Updated {
                    score: account.score,
                    tier: account.tier,
                },
                Err(e) => {
                    tracing::warn!("Skipping account {}: {}", account.id, e);
                    Outcome::Skipped(e.to_string())
                }
            };
            report.outcomes.push((account.id, outcome));
        }

        tracing::info!(
            "Recalculated reputation: {} updated, {} skipped",
            report.updated(),
            report.skipped()
        );

        Ok(report)
    }

    /// Count accounts per tier and average their scores
    pub fn network_stats(&self) -> Result<NetworkStats> {
        let accounts = self.store.list_accounts()?;
        let mut stats = NetworkStats {
            total_users: accounts.len(),
            ..Default::default()
        };

        let mut total_score: i64 = 0;
        for account in &accounts {
            total_score += account.score;
            match account.tier {
                Tier::Contributor => stats.contributors += 1,
                Tier::Neutral => stats.neutral += 1,
                Tier::Leecher => stats.leechers += 1,
            }
        }

        if !accounts.is_empty() {
            stats.average_score = total_score as f64 / accounts.len() as f64;
        }

        Ok(stats)
    }

    /// Fail with `InsufficientReputation` when the account's score is below
    /// `required_score`
    pub fn access_allowed(&self, account_id: &AccountId, required_score: i64) -> Result<()> {
        self.check_access(account_id, required_score, ACCESS_RESOURCE)
    }

    /// [`Self::access_allowed`] with a caller-chosen action label
    pub fn check_access(&self, account_id: &AccountId, required_score: i64, action: &str) -> Result<()> {
        let account = self.store.get_account(account_id)?;
        if account.score < required_score {
            return Err(Error::InsufficientReputation {
                account_id: account_id.to_string(),
                required: required_score,
                current: account.score,
                action: action.to_string(),
            });
        }
        Ok(())
    }

    pub fn reputation_info(&self, account_id: &AccountId) -> Result<ReputationInfo> {
        let account = self.store.get_account(account_id)?;
        Ok(ReputationInfo::from(&account))
    }

    /// Download speed multiplier for an account's current tier
    pub fn throttle_speed(&self, account_id: &AccountId) -> Result<f64> {
        let account = self.store.get_account(account_id)?;
        Ok(reputation::throttle_multiplier(account.tier))
    }

    /// Accounts ordered by score, highest first
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<Account>> {
        let mut accounts = self.store.list_accounts()?;
        accounts.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        accounts.truncate(limit);
        Ok(accounts)
    }
}
