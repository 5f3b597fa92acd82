use super::card::Card;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared handle to the registry; the issuer, guard, ledger and teller all
/// hold one.
pub type CardRegistryRef = Arc<dyn CardRegistry>;

/// Data-access contract the engine requires from the card storage backend.
///
/// Backends are assumed reliable: every operation either succeeds or fails
/// with a storage-layer error that terminates the run. The only modeled
/// lookup failure is `NonexistentCard` from [`CardRegistry::get_card`].
#[async_trait]
pub trait CardRegistry: Send + Sync {
    /// Highest internal id assigned so far; 0 for an empty registry. Used
    /// as the generation seed for new account identifiers.
    async fn last_sequence_id(&self) -> Result<i64>;

    /// True if any stored card number starts with `prefix`.
    async fn account_number_exists(&self, prefix: &str) -> Result<bool>;

    async fn card_exists(&self, number: &str) -> Result<bool>;

    async fn get_card(&self, number: &str) -> Result<Card>;

    async fn insert_card(&self, card: Card) -> Result<()>;

    /// Applies `balance += delta` to one card.
    async fn adjust_balance(&self, number: &str, delta: i64) -> Result<()>;

    /// Debits `from` and credits `to` as a single atomic unit. Fails with
    /// `InsufficientFunds` without touching either row if the source
    /// balance is short.
    async fn transfer_balance(&self, from: &str, to: &str, amount: i64) -> Result<()>;

    async fn delete_card(&self, number: &str) -> Result<()>;

    async fn failed_login_count(&self, number: &str) -> Result<u32>;

    /// Zeroes the failed-login counter and clears the last-failure
    /// timestamp.
    async fn reset_failed_logins(&self, number: &str) -> Result<()>;

    /// Increments the failed-login counter and stores `at` as the most
    /// recent failure.
    async fn record_failed_login(&self, number: &str, at: DateTime<Utc>) -> Result<()>;

    async fn last_failed_login(&self, number: &str) -> Result<Option<DateTime<Utc>>>;
}
