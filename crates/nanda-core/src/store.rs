//! Score persistence interface and in-memory implementation.
//!
//! Provides the [`ScoreStore`] trait: each subject has a "current" slot
//! (last write wins) and an append-only history ordered by save time. The
//! [`MemoryScoreStore`] is suitable for tests and single-process servers;
//! a RocksDB-backed store lives in nanda-server.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::types::ReputationScore;

/// Persistence contract for computed scores.
///
/// Implementations synchronise internally so a store can be shared across
/// threads behind an `Arc`. Concurrent saves for the same subject race on
/// the current slot with last-write-wins semantics; history never loses a
/// record.
pub trait ScoreStore: Send + Sync {
    /// Append `score` to its subject's history and make it the current score.
    fn save(&self, score: &ReputationScore) -> Result<(), StoreError>;

    /// Most recently saved score for a subject, or `None` if never scored.
    fn get_current(&self, subject_id: &str) -> Result<Option<ReputationScore>, StoreError>;

    /// Up to `limit` most recent scores, oldest first.
    fn get_history(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationScore>, StoreError>;

    /// All subjects with at least one saved score, sorted.
    fn subjects(&self) -> Result<Vec<String>, StoreError>;

    /// Number of records in a subject's history.
    ///
    /// Default implementation materialises the full history.
    fn history_len(&self, subject_id: &str) -> Result<usize, StoreError> {
        Ok(self.get_history(subject_id, usize::MAX)?.len())
    }
}

/// Keep the last `limit` items of `items`, preserving order.
pub fn tail<T: Clone>(items: &[T], limit: usize) -> Vec<T> {
    let start = items.len().saturating_sub(limit);
    items[start..].to_vec()
}

#[derive(Debug)]
struct SubjectRecords {
    current: ReputationScore,
    history: Vec<ReputationScore>,
}

/// In-memory score storage.
///
/// A single lock guards both the current slot and the history so a save is
/// observed atomically. Not persistent.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    subjects: RwLock<HashMap<String, SubjectRecords>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save(&self, score: &ReputationScore) -> Result<(), StoreError> {
        if score.subject_id.is_empty() {
            return Err(StoreError::InvalidSubject(score.subject_id.clone()));
        }

        let mut subjects = self.subjects.write();
        match subjects.get_mut(&score.subject_id) {
            Some(records) => {
                records.current = score.clone();
                records.history.push(score.clone());
            }
            None => {
                subjects.insert(
                    score.subject_id.clone(),
                    SubjectRecords {
                        current: score.clone(),
                        history: vec![score.clone()],
                    },
                );
            }
        }

        debug!(
            subject_id = %score.subject_id,
            overall = score.overall_score,
            "score_store: saved"
        );
        Ok(())
    }

    fn get_current(&self, subject_id: &str) -> Result<Option<ReputationScore>, StoreError> {
        Ok(self
            .subjects
            .read()
            .get(subject_id)
            .map(|r| r.current.clone()))
    }

    fn get_history(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationScore>, StoreError> {
        Ok(self
            .subjects
            .read()
            .get(subject_id)
            .map(|r| tail(&r.history, limit))
            .unwrap_or_default())
    }

    fn subjects(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.subjects.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn history_len(&self, subject_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .subjects
            .read()
            .get(subject_id)
            .map(|r| r.history.len())
            .unwrap_or(0))
    }
}
