//! RocksDB-backed persistent score storage.
//!
//! Implements [`ScoreStore`] with three column families:
//!
//! - `current`: `subject_id` → latest encoded [`ReputationScore`]
//! - `history`: `subject_id ++ 0x00 ++ seq (u64 BE)` → encoded score
//! - `meta`: `subject_id` → next history sequence number (u64 BE)
//!
//! History keys sort by subject, then by save order, so a reverse scan from
//! `subject_id ++ 0x01` yields the most recent records first. Every save is a
//! single atomic [`WriteBatch`]. Values use bincode's serde encoding.

use std::path::Path;

use nanda_core::error::StoreError;
use nanda_core::store::ScoreStore;
use nanda_core::types::ReputationScore;
use parking_lot::Mutex;
use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use tracing::debug;

// --- Column family names ---

const CF_CURRENT: &str = "current";
const CF_HISTORY: &str = "history";
const CF_META: &str = "meta";

const ALL_CFS: &[&str] = &[CF_CURRENT, CF_HISTORY, CF_META];

const KEY_SEPARATOR: u8 = 0x00;
const SEQ_LEN: usize = 8;

pub struct RocksScoreStore {
    db: DB,
    /// Serialises the read-modify-write of per-subject sequence numbers.
    write_lock: Mutex<()>,
}

impl RocksScoreStore {
    /// Open or create a score database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        debug!(path = %path.as_ref().display(), "score_store: opened");

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("missing column family: {name}")))
    }

    fn encode_score(score: &ReputationScore) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(score, bincode::config::standard())
            .map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn decode_score(bytes: &[u8]) -> Result<ReputationScore, StoreError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(score, _)| score)
            .map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn next_seq(&self, subject_id: &str) -> Result<u64, StoreError> {
        let cf = self.cf_handle(CF_META)?;
        match self
            .db
            .get_cf(cf, subject_id.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => {
                let raw: [u8; SEQ_LEN] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Codec("invalid sequence length".into()))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

/// `subject_id ++ 0x00`, the common prefix of a subject's history keys.
fn history_prefix(subject_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(subject_id.len() + 1 + SEQ_LEN);
    key.extend_from_slice(subject_id.as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

fn history_key(subject_id: &str, seq: u64) -> Vec<u8> {
    let mut key = history_prefix(subject_id);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// NUL would make history keys of different subjects overlap.
fn check_subject(subject_id: &str) -> Result<(), StoreError> {
    if subject_id.is_empty() || subject_id.as_bytes().contains(&KEY_SEPARATOR) {
        return Err(StoreError::InvalidSubject(subject_id.to_string()));
    }
    Ok(())
}

impl ScoreStore for RocksScoreStore {
    fn save(&self, score: &ReputationScore) -> Result<(), StoreError> {
        let subject_id = score.subject_id.as_str();
        check_subject(subject_id)?;
        let value = Self::encode_score(score)?;

        let cf_current = self.cf_handle(CF_CURRENT)?;
        let cf_history = self.cf_handle(CF_HISTORY)?;
        let cf_meta = self.cf_handle(CF_META)?;

        let _guard = self.write_lock.lock();
        let seq = self.next_seq(subject_id)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_history, history_key(subject_id, seq), &value);
        batch.put_cf(cf_current, subject_id.as_bytes(), &value);
        batch.put_cf(cf_meta, subject_id.as_bytes(), (seq + 1).to_be_bytes());
        self.db
            .write(batch)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(subject = %subject_id, seq, "score_store: saved");
        Ok(())
    }

    fn get_current(&self, subject_id: &str) -> Result<Option<ReputationScore>, StoreError> {
        let cf = self.cf_handle(CF_CURRENT)?;
        self.db
            .get_cf(cf, subject_id.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .map(|bytes| Self::decode_score(&bytes))
            .transpose()
    }

    fn get_history(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationScore>, StoreError> {
        if limit == 0 || check_subject(subject_id).is_err() {
            return Ok(Vec::new());
        }
        let cf = self.cf_handle(CF_HISTORY)?;
        let prefix = history_prefix(subject_id);
        // One past the prefix: reverse iteration starts at this subject's newest key.
        let mut upper = subject_id.as_bytes().to_vec();
        upper.push(KEY_SEPARATOR + 1);

        let mut newest_first = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&upper, Direction::Reverse))
        {
            let (key, value) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            if key.len() != prefix.len() + SEQ_LEN || !key.starts_with(&prefix) {
                break;
            }
            newest_first.push(Self::decode_score(&value)?);
            if newest_first.len() == limit {
                break;
            }
        }
        newest_first.reverse();
        Ok(newest_first)
    }

    fn subjects(&self) -> Result<Vec<String>, StoreError> {
        let cf = self.cf_handle(CF_CURRENT)?;
        let mut subjects = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            let subject = String::from_utf8(key.into_vec())
                .map_err(|e| StoreError::Codec(e.to_string()))?;
            subjects.push(subject);
        }
        Ok(subjects)
    }

    fn history_len(&self, subject_id: &str) -> Result<usize, StoreError> {
        let seq = self.next_seq(subject_id)?;
        usize::try_from(seq).map_err(|e| StoreError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keys_sort_by_sequence() {
        assert!(history_key("a", 1) < history_key("a", 2));
        assert!(history_key("a", 255) < history_key("a", 256));
        assert!(history_key("a", u64::MAX) < history_prefix("b"));
    }

    #[test]
    fn nul_in_subject_rejected() {
        assert!(check_subject("a\0b").is_err());
        assert!(check_subject("").is_err());
        assert!(check_subject("agent-1").is_ok());
    }
}
