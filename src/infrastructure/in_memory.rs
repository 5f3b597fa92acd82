use crate::domain::card::Card;
use crate::domain::ports::CardRegistry;
use crate::error::{Result, TellerError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    cards: HashMap<String, Card>,
    last_id: i64,
}

/// A thread-safe in-memory card registry.
///
/// Uses `Arc<RwLock<...>>` for shared access. The default backend; nothing
/// survives the process, which is fine for testing and single runs.
#[derive(Default, Clone)]
pub struct InMemoryCardRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryCardRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardRegistry for InMemoryCardRegistry {
    async fn last_sequence_id(&self) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.last_id)
    }

    async fn account_number_exists(&self, prefix: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.cards.keys().any(|number| number.starts_with(prefix)))
    }

    async fn card_exists(&self, number: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.cards.contains_key(number))
    }

    async fn get_card(&self, number: &str) -> Result<Card> {
        let inner = self.inner.read().await;
        inner
            .cards
            .get(number)
            .cloned()
            .ok_or_else(|| TellerError::NonexistentCard {
                number: number.to_string(),
            })
    }

    async fn insert_card(&self, card: Card) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        inner.cards.insert(card.number.clone(), card);
        Ok(())
    }

    async fn adjust_balance(&self, number: &str, delta: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let card = lookup_mut(&mut inner, number)?;
        card.balance += delta;
        Ok(())
    }

    async fn transfer_balance(&self, from: &str, to: &str, amount: i64) -> Result<()> {
        // Both mutations happen under one write guard, so no other task can
        // observe the debited-but-not-credited state.
        let mut inner = self.inner.write().await;

        if !inner.cards.contains_key(to) {
            return Err(TellerError::NonexistentCard {
                number: to.to_string(),
            });
        }
        let source = lookup_mut(&mut inner, from)?;
        if source.balance < amount {
            return Err(TellerError::InsufficientFunds {
                balance: source.balance,
                requested: amount,
            });
        }
        source.balance -= amount;
        lookup_mut(&mut inner, to)?.balance += amount;
        Ok(())
    }

    async fn delete_card(&self, number: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.cards.remove(number);
        Ok(())
    }

    async fn failed_login_count(&self, number: &str) -> Result<u32> {
        let inner = self.inner.read().await;
        Ok(inner
            .cards
            .get(number)
            .map(|card| card.failed_logins)
            .unwrap_or(0))
    }

    async fn reset_failed_logins(&self, number: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let card = lookup_mut(&mut inner, number)?;
        card.failed_logins = 0;
        card.last_failed_login = None;
        Ok(())
    }

    async fn record_failed_login(&self, number: &str, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write().await;
        let card = lookup_mut(&mut inner, number)?;
        card.failed_logins += 1;
        card.last_failed_login = Some(at);
        Ok(())
    }

    async fn last_failed_login(&self, number: &str) -> Result<Option<DateTime<Utc>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .cards
            .get(number)
            .and_then(|card| card.last_failed_login))
    }
}

fn lookup_mut<'a>(inner: &'a mut Inner, number: &str) -> Result<&'a mut Card> {
    inner
        .cards
        .get_mut(number)
        .ok_or_else(|| TellerError::NonexistentCard {
            number: number.to_string(),
        })
}
