//! History of passwords a user chose to keep.
//!
//! Only a truncated SHA-256 digest and the strength metadata of each password is stored. The
//! ledger keeps the [`RETENTION`] most recent records, oldest first on disk.

use std::cell::RefCell;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::strength::{StrengthReport, StrengthTier};
use crate::Password;

/// Maximum number of records kept.
pub const RETENTION: usize = 100;

/// Length of a record digest, in hex characters.
pub const DIGEST_LEN: usize = 16;

const DEFAULT_FILE_NAME: &str = ".password_history.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "StoredRecord")]
pub struct HistoryRecord {
    pub digest: String,
    pub length: usize,
    pub entropy: f64,
    pub strength: StrengthTier,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        password: &Password,
        report: &StrengthReport,
        created_at: DateTime<Utc>,
    ) -> HistoryRecord {
        HistoryRecord {
            digest: digest(password.as_str()),
            length: report.length,
            entropy: report.entropy,
            strength: report.tier,
            created_at,
        }
    }
}

/// A record as found on disk. Older files name the digest `hash`, store the strength as a
/// localized label, and write `created_at` as local time without an offset.
#[derive(Deserialize)]
struct StoredRecord {
    #[serde(alias = "hash")]
    digest: String,
    length: usize,
    entropy: f64,
    #[serde(default)]
    strength: String,
    created_at: String,
}

impl TryFrom<StoredRecord> for HistoryRecord {
    type Error = String;

    fn try_from(stored: StoredRecord) -> Result<HistoryRecord, String> {
        Ok(HistoryRecord {
            strength: stored_tier(&stored.strength)
                .unwrap_or_else(|| StrengthTier::from_entropy(stored.entropy)),
            created_at: parse_created_at(&stored.created_at)?,
            digest: stored.digest,
            length: stored.length,
            entropy: stored.entropy,
        })
    }
}

fn stored_tier(label: &str) -> Option<StrengthTier> {
    let tier = match label {
        "extremely_weak" | "极弱" => StrengthTier::ExtremelyWeak,
        "weak" | "弱" => StrengthTier::Weak,
        "moderate" | "中等" => StrengthTier::Moderate,
        "strong" | "强" => StrengthTier::Strong,
        "very_strong" | "很强" => StrengthTier::VeryStrong,
        "extremely_strong" | "极强" => StrengthTier::ExtremelyStrong,
        _ => return None,
    };
    Some(tier)
}

fn parse_created_at(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|err| format!("invalid created_at {s:?}: {err}"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| format!("created_at {s:?} does not exist in the local time zone"))
}

/// First [`DIGEST_LEN`] hex characters of the SHA-256 of `password`.
pub fn digest(password: &str) -> String {
    let hash = Sha256::digest(password.as_bytes());
    hex::encode(&hash[..DIGEST_LEN / 2])
}

/// Durable storage behind a [`Ledger`].
pub trait LedgerStore {
    /// Every stored record, oldest first. A store that was never written holds no records.
    fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Replace the stored records. Either all of `records` is stored or the previous contents
    /// are left intact.
    fn save(&self, records: &[HistoryRecord]) -> Result<(), HistoryError>;
}

/// Records kept as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> JsonFileStore {
        JsonFileStore { path }
    }

    /// `$HOME/.password_history.json`.
    pub fn at_default_location() -> Result<JsonFileStore, HistoryError> {
        let home = env::var_os("HOME").ok_or(HistoryErrorRepr::NoHomeDirectory)?;
        let mut path = PathBuf::from(home);
        path.push(DEFAULT_FILE_NAME);
        Ok(JsonFileStore::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(HistoryErrorRepr::Io(err).into()),
        };
        Ok(serde_json::from_slice(&data).map_err(HistoryErrorRepr::Decode)?)
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        // Written next to the ledger and renamed over it, so a crash never leaves half a file.
        let mut temp_file =
            tempfile::NamedTempFile::new_in(parent).map_err(HistoryErrorRepr::Io)?;
        serde_json::to_writer_pretty(&mut temp_file, records).map_err(HistoryErrorRepr::Encode)?;
        temp_file.flush().map_err(HistoryErrorRepr::Io)?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(HistoryErrorRepr::Io)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| HistoryErrorRepr::Io(err.error))?;
        Ok(())
    }
}

/// Records kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<Vec<HistoryRecord>>,
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(self.records.borrow().clone())
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }
}

/// The most recent records, newest first, and how many records exist in total.
#[derive(Debug, Clone)]
pub struct HistorySummary {
    pub recent: Vec<HistoryRecord>,
    pub total: usize,
}

pub struct Ledger<S = JsonFileStore> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Ledger<S> {
        Ledger { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a digest-only record of `password`, evicting the oldest records beyond
    /// [`RETENTION`].
    ///
    /// Storage failures are logged and never returned; the result only says whether the record
    /// was stored.
    pub fn record(&self, password: &Password, report: &StrengthReport) -> bool {
        self.record_at(password, report, Utc::now())
    }

    pub fn record_at(
        &self,
        password: &Password,
        report: &StrengthReport,
        created_at: DateTime<Utc>,
    ) -> bool {
        let record = HistoryRecord::new(password, report, created_at);
        match self.append(record) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to record password history");
                false
            }
        }
    }

    fn append(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        let mut records = self.store.load()?;
        records.push(record);
        if records.len() > RETENTION {
            let excess = records.len() - RETENTION;
            records.drain(..excess);
        }
        self.store.save(&records)?;
        tracing::debug!(records = records.len(), "recorded password history");
        Ok(())
    }

    /// The `limit` most recent records, newest first.
    pub fn list(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(self.summary(limit)?.recent)
    }

    pub fn summary(&self, limit: usize) -> Result<HistorySummary, HistoryError> {
        let records = self.store.load()?;
        let total = records.len();
        let recent = records.into_iter().rev().take(limit).collect();
        Ok(HistorySummary { recent, total })
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct HistoryError(HistoryErrorRepr);

impl From<HistoryErrorRepr> for HistoryError {
    fn from(err: HistoryErrorRepr) -> HistoryError {
        HistoryError(err)
    }
}

#[derive(Debug, thiserror::Error)]
enum HistoryErrorRepr {
    #[error("HOME is not set; cannot find the history file")]
    NoHomeDirectory,
    #[error("I/O error on the history file: {0}")]
    Io(io::Error),
    #[error("the history file is not valid: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode the history: {0}")]
    Encode(#[source] serde_json::Error),
}
