use crate::domain::card::Card;
use crate::domain::ports::CardRegistry;
use crate::error::{Result, TellerError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column family holding one serde_json row per card, keyed by card number.
pub const CF_CARDS: &str = "cards";
/// Column family for registry-level bookkeeping (the sequence counter).
pub const CF_META: &str = "meta";

const LAST_ID_KEY: &[u8] = b"last_sequence_id";

/// A persistent card registry backed by RocksDB.
///
/// Card rows and registry metadata live in separate column families. The
/// struct is cheap to clone (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbCardRegistry {
    db: Arc<DB>,
}

impl RocksDbCardRegistry {
    /// Opens or creates the database at `path`, ensuring both column
    /// families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_cards = ColumnFamilyDescriptor::new(CF_CARDS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_cards, cf_meta])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            TellerError::IoError(std::io::Error::other(format!(
                "{name} column family not found"
            )))
        })
    }

    fn read_card(&self, number: &str) -> Result<Option<Card>> {
        let cf = self.cf(CF_CARDS)?;
        match self.db.get_cf(cf, number.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn require_card(&self, number: &str) -> Result<Card> {
        self.read_card(number)?
            .ok_or_else(|| TellerError::NonexistentCard {
                number: number.to_string(),
            })
    }

    fn write_card(&self, card: &Card) -> Result<()> {
        let cf = self.cf(CF_CARDS)?;
        self.db
            .put_cf(cf, card.number.as_bytes(), serde_json::to_vec(card)?)?;
        Ok(())
    }
}

#[async_trait]
impl CardRegistry for RocksDbCardRegistry {
    async fn last_sequence_id(&self) -> Result<i64> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(cf, LAST_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    TellerError::IoError(std::io::Error::other("malformed sequence counter"))
                })?;
                Ok(i64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    async fn account_number_exists(&self, prefix: &str) -> Result<bool> {
        let cf = self.cf(CF_CARDS)?;
        let mode = IteratorMode::From(prefix.as_bytes(), Direction::Forward);
        match self.db.iterator_cf(cf, mode).next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(key.starts_with(prefix.as_bytes()))
            }
            None => Ok(false),
        }
    }

    async fn card_exists(&self, number: &str) -> Result<bool> {
        let cf = self.cf(CF_CARDS)?;
        Ok(self.db.get_pinned_cf(cf, number.as_bytes())?.is_some())
    }

    async fn get_card(&self, number: &str) -> Result<Card> {
        self.require_card(number)
    }

    async fn insert_card(&self, card: Card) -> Result<()> {
        let next_id = self.last_sequence_id().await? + 1;

        // Row and counter land together or not at all.
        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_CARDS)?,
            card.number.as_bytes(),
            serde_json::to_vec(&card)?,
        );
        batch.put_cf(self.cf(CF_META)?, LAST_ID_KEY, next_id.to_be_bytes());
        self.db.write(batch)?;
        Ok(())
    }

    async fn adjust_balance(&self, number: &str, delta: i64) -> Result<()> {
        let mut card = self.require_card(number)?;
        card.balance += delta;
        self.write_card(&card)
    }

    async fn transfer_balance(&self, from: &str, to: &str, amount: i64) -> Result<()> {
        let mut source = self.require_card(from)?;
        let mut target = self.require_card(to)?;

        if source.balance < amount {
            return Err(TellerError::InsufficientFunds {
                balance: source.balance,
                requested: amount,
            });
        }
        source.balance -= amount;
        target.balance += amount;

        // Debit and credit are one write: a crash cannot land between them.
        let cf = self.cf(CF_CARDS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, source.number.as_bytes(), serde_json::to_vec(&source)?);
        batch.put_cf(cf, target.number.as_bytes(), serde_json::to_vec(&target)?);
        self.db.write(batch)?;
        Ok(())
    }

    async fn delete_card(&self, number: &str) -> Result<()> {
        let cf = self.cf(CF_CARDS)?;
        self.db.delete_cf(cf, number.as_bytes())?;
        Ok(())
    }

    async fn failed_login_count(&self, number: &str) -> Result<u32> {
        Ok(self
            .read_card(number)?
            .map(|card| card.failed_logins)
            .unwrap_or(0))
    }

    async fn reset_failed_logins(&self, number: &str) -> Result<()> {
        let mut card = self.require_card(number)?;
        card.failed_logins = 0;
        card.last_failed_login = None;
        self.write_card(&card)
    }

    async fn record_failed_login(&self, number: &str, at: DateTime<Utc>) -> Result<()> {
        let mut card = self.require_card(number)?;
        card.failed_logins += 1;
        card.last_failed_login = Some(at);
        self.write_card(&card)
    }

    async fn last_failed_login(&self, number: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read_card(number)?.and_then(|card| card.last_failed_login))
    }
}
