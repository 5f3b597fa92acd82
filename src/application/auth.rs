use crate::domain::ports::CardRegistryRef;
use crate::error::Result;
use chrono::{Duration, Utc};

/// Failed attempts tolerated before the lockout window applies.
pub const MAX_FAILED_LOGINS: u32 = 3;

/// How long a card stays blocked after the third consecutive failure.
pub fn lockout_window() -> Duration {
    Duration::hours(1)
}

/// PIN verification and brute-force lockout bookkeeping.
pub struct AuthGuard {
    registry: CardRegistryRef,
}

impl AuthGuard {
    pub fn new(registry: CardRegistryRef) -> Self {
        Self { registry }
    }

    /// Whether the PIN prompt may be shown for this card.
    ///
    /// True while the failure counter is under the limit, or once the last
    /// failure is more than the lockout window in the past. Does not touch
    /// the counter.
    pub async fn may_attempt_login(&self, card_number: &str) -> Result<bool> {
        let failed = self.registry.failed_login_count(card_number).await?;
        if failed < MAX_FAILED_LOGINS {
            return Ok(true);
        }
        match self.registry.last_failed_login(card_number).await? {
            Some(last) => Ok(last + lockout_window() < Utc::now()),
            None => Ok(true),
        }
    }

    /// Compares `pin` against the stored value.
    ///
    /// A match resets the failure counter and clears the failure timestamp;
    /// a mismatch records one more failure stamped with the current time.
    pub async fn authorize(&self, card_number: &str, pin: &str) -> Result<bool> {
        let card = self.registry.get_card(card_number).await?;

        if card.pin == pin {
            self.registry.reset_failed_logins(card_number).await?;
            tracing::info!(number = %card_number, "login succeeded");
            Ok(true)
        } else {
            self.registry
                .record_failed_login(card_number, Utc::now())
                .await?;
            tracing::warn!(number = %card_number, "login failed, wrong PIN");
            Ok(false)
        }
    }
}
