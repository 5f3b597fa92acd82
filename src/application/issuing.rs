use crate::domain::card::{ACCOUNT_ID_LEN, Card};
use crate::domain::luhn;
use crate::domain::ports::CardRegistryRef;
use crate::error::Result;
use rand::Rng;

/// Issues new cards: unique account identifiers, checksummed card numbers
/// and random PINs.
pub struct CardIssuer {
    registry: CardRegistryRef,
    issuer_prefix: String,
}

impl CardIssuer {
    pub fn new(registry: CardRegistryRef, issuer_prefix: impl Into<String>) -> Self {
        Self {
            registry,
            issuer_prefix: issuer_prefix.into(),
        }
    }

    /// Creates a card, registers it and hands it back.
    pub async fn issue(&self) -> Result<Card> {
        let account_id = self.generate_account_identifier().await?;
        let number = self.generate_card_number(&account_id);
        let card = Card::new(number, generate_pin());

        self.registry.insert_card(card.clone()).await?;
        tracing::info!(number = %card.number, "issued new card");
        Ok(card)
    }

    /// Produces a zero-padded account identifier that is not yet taken.
    ///
    /// Seeds from the registry's last sequence id plus a random offset and
    /// re-rolls on collision. Collisions are rare; the loop terminates as
    /// long as the identifier space is not exhausted.
    async fn generate_account_identifier(&self) -> Result<String> {
        loop {
            let seed = self.registry.last_sequence_id().await? + 1;
            let offset: i64 = rand::thread_rng().gen_range(0..=9_999_999);
            let account_id = format!("{:0width$}", seed + offset, width = ACCOUNT_ID_LEN);

            let full_prefix = format!("{}{}", self.issuer_prefix, account_id);
            if !self.registry.account_number_exists(&full_prefix).await? {
                return Ok(account_id);
            }
        }
    }

    /// Appends a placeholder check digit, then substitutes the real one.
    fn generate_card_number(&self, account_id: &str) -> String {
        let mut digits: Vec<u8> = format!("{}{}0", self.issuer_prefix, account_id)
            .chars()
            .filter_map(|c| c.to_digit(10).map(|d| d as u8))
            .collect();

        let check = luhn::checksum(&digits);
        if let Some(last) = digits.last_mut() {
            *last = check;
        }
        digits.into_iter().map(|d| char::from(b'0' + d)).collect()
    }
}

/// A 4-digit PIN, uniform over 1000..=9999.
pub fn generate_pin() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}
