use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card number is the bank's issuer prefix, a 9-digit account identifier
/// and one trailing check digit.
pub const CARD_NUMBER_LEN: usize = 16;
/// Width of the account-identifier portion of a card number.
pub const ACCOUNT_ID_LEN: usize = 9;

/// One card record, persisted verbatim by the registry backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Full card number: issuer prefix + account identifier + check digit.
    pub number: String,
    /// 4-digit PIN, stored as entered.
    pub pin: String,
    /// Integer funds. Validated operations never drive this negative.
    pub balance: i64,
    /// Consecutive failed PIN attempts since the last successful login.
    #[serde(default)]
    pub failed_logins: u32,
    /// When the most recent failed attempt happened, if any.
    #[serde(default)]
    pub last_failed_login: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(number: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            pin: pin.into(),
            balance: 0,
            failed_logins: 0,
            last_failed_login: None,
        }
    }
}
