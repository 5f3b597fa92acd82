use crate::domain::ports::CardRegistryRef;
use crate::error::{Result, TellerError};

/// Balance reads and mutations against the registry.
pub struct Ledger {
    registry: CardRegistryRef,
}

impl Ledger {
    pub fn new(registry: CardRegistryRef) -> Self {
        Self { registry }
    }

    pub async fn balance(&self, card_number: &str) -> Result<i64> {
        Ok(self.registry.get_card(card_number).await?.balance)
    }

    /// Adds `amount` to the card. Zero and negative amounts are rejected.
    pub async fn deposit(&self, card_number: &str, amount: i64) -> Result<()> {
        if amount <= 0 {
            return Err(TellerError::InvalidAmount { amount });
        }
        self.registry.adjust_balance(card_number, amount).await?;
        tracing::info!(number = %card_number, amount, "deposit applied");
        Ok(())
    }

    /// Moves `amount` from one card to another.
    ///
    /// Sufficiency is checked up front so the caller gets a clean
    /// `InsufficientFunds`; the registry's atomic transfer re-checks under
    /// its own lock before mutating.
    pub async fn transfer(&self, from: &str, to: &str, amount: i64) -> Result<()> {
        if amount <= 0 {
            return Err(TellerError::InvalidAmount { amount });
        }
        if from == to {
            return Err(TellerError::SameAccountTransfer);
        }
        let balance = self.balance(from).await?;
        if balance < amount {
            return Err(TellerError::InsufficientFunds {
                balance,
                requested: amount,
            });
        }
        self.registry.transfer_balance(from, to, amount).await?;
        tracing::info!(%from, %to, amount, "transfer applied");
        Ok(())
    }

    /// Deletes the card row. The caller owns clearing any authenticated
    /// session that still points at it.
    pub async fn close_account(&self, card_number: &str) -> Result<()> {
        self.registry.delete_card(card_number).await?;
        tracing::info!(number = %card_number, "account closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::Card;
    use crate::domain::ports::CardRegistry;
    use crate::infrastructure::in_memory::InMemoryCardRegistry;
    use std::sync::Arc;

    const A: &str = "4000008449433403";
    const B: &str = "4000000000000002";

    async fn ledger_with_cards() -> (Ledger, Arc<InMemoryCardRegistry>) {
        let registry = Arc::new(InMemoryCardRegistry::new());
        let mut a = Card::new(A, "1234");
        a.balance = 100;
        registry.insert_card(a).await.unwrap();
        registry.insert_card(Card::new(B, "5678")).await.unwrap();
        (Ledger::new(registry.clone()), registry)
    }

    #[tokio::test]
    async fn test_deposit_adds_to_balance() {
        let (ledger, _) = ledger_with_cards().await;
        ledger.deposit(B, 25).await.unwrap();
        assert_eq!(ledger.balance(B).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_deposit_rejects_non_positive() {
        let (ledger, _) = ledger_with_cards().await;
        assert!(matches!(
            ledger.deposit(B, 0).await,
            Err(TellerError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.deposit(B, -5).await,
            Err(TellerError::InvalidAmount { .. })
        ));
        assert_eq!(ledger.balance(B).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_moves_funds() {
        let (ledger, _) = ledger_with_cards().await;
        ledger.transfer(A, B, 40).await.unwrap();
        assert_eq!(ledger.balance(A).await.unwrap(), 60);
        assert_eq!(ledger.balance(B).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_changes_nothing() {
        let (ledger, _) = ledger_with_cards().await;
        let result = ledger.transfer(A, B, 150).await;
        assert!(matches!(result, Err(TellerError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance(A).await.unwrap(), 100);
        assert_eq!(ledger.balance(B).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_to_self_rejected() {
        let (ledger, _) = ledger_with_cards().await;
        assert!(matches!(
            ledger.transfer(A, A, 10).await,
            Err(TellerError::SameAccountTransfer)
        ));
    }

    #[tokio::test]
    async fn test_close_account_removes_card() {
        let (ledger, registry) = ledger_with_cards().await;
        ledger.close_account(A).await.unwrap();
        assert!(!registry.card_exists(A).await.unwrap());
    }
}
