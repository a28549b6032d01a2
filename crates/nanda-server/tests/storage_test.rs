//! RocksDB score store against a temporary directory.
#![cfg(feature = "rocksdb")]

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use nanda_core::error::StoreError;
use nanda_core::store::ScoreStore;
use nanda_core::types::{CategoryScores, Confidence, ReputationScore};
use nanda_server::storage::RocksScoreStore;

fn score(subject: &str, overall: f64, minute: i64) -> ReputationScore {
    let base = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
    ReputationScore {
        subject_id: subject.to_string(),
        overall_score: overall,
        categories: CategoryScores {
            performance: 95.0,
            verification: 100.0,
            feedback: 95.0,
            usage: overall,
        },
        confidence: Confidence {
            level: 61.0,
            factors: BTreeMap::from([
                ("sample_size".to_string(), 100.0),
                ("verification_level".to_string(), 100.0),
            ]),
        },
        last_updated: base + Duration::minutes(minute),
        data_points: 150,
        algorithm_id: "weighted-aggregation-v1".into(),
    }
}

#[test]
fn round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = RocksScoreStore::open(dir.path()).unwrap();

    let s = score("agent-1", 88.0, 0);
    store.save(&s).unwrap();
    assert_eq!(store.get_current("agent-1").unwrap(), Some(s.clone()));
    assert_eq!(store.get_history("agent-1", 10).unwrap(), vec![s]);
    assert_eq!(store.get_current("nobody").unwrap(), None);
    assert!(store.get_history("nobody", 10).unwrap().is_empty());
}

#[test]
fn history_order_and_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = RocksScoreStore::open(dir.path()).unwrap();

    for i in 0..300 {
        store.save(&score("agent-1", (i % 100) as f64, i)).unwrap();
    }
    // a neighbour whose id extends the first one must not leak in
    store.save(&score("agent-10", 1.0, 0)).unwrap();

    let last3 = store.get_history("agent-1", 3).unwrap();
    let minutes: Vec<i64> = last3
        .iter()
        .map(|s| (s.last_updated - score("x", 0.0, 0).last_updated).num_minutes())
        .collect();
    assert_eq!(minutes, vec![297, 298, 299]);

    assert_eq!(store.get_history("agent-1", usize::MAX).unwrap().len(), 300);
    assert!(store.get_history("agent-1", 0).unwrap().is_empty());
    assert_eq!(store.history_len("agent-1").unwrap(), 300);
    assert_eq!(store.history_len("agent-10").unwrap(), 1);
    assert_eq!(
        store.get_current("agent-1").unwrap().unwrap().last_updated,
        last3[2].last_updated
    );
}

#[test]
fn survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = RocksScoreStore::open(dir.path()).unwrap();
        store.save(&score("agent-1", 70.0, 0)).unwrap();
        store.save(&score("agent-2", 80.0, 1)).unwrap();
    }
    let store = RocksScoreStore::open(dir.path()).unwrap();
    assert_eq!(
        store.subjects().unwrap(),
        vec!["agent-1".to_string(), "agent-2".to_string()]
    );
    store.save(&score("agent-1", 71.0, 2)).unwrap();
    let history = store.get_history("agent-1", 10).unwrap();
    assert_eq!(
        history.iter().map(|s| s.overall_score).collect::<Vec<_>>(),
        vec![70.0, 71.0]
    );
}

#[test]
fn invalid_subjects_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = RocksScoreStore::open(dir.path()).unwrap();
    assert!(matches!(
        store.save(&score("", 1.0, 0)),
        Err(StoreError::InvalidSubject(_))
    ));
    assert!(matches!(
        store.save(&score("a\0b", 1.0, 0)),
        Err(StoreError::InvalidSubject(_))
    ));
}

#[test]
fn concurrent_saves_keep_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = RocksScoreStore::open(dir.path()).unwrap();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let store = &store;
            scope.spawn(move || {
                for i in 0..25 {
                    store.save(&score("shared", (t * 25 + i) as f64, i)).unwrap();
                }
            });
        }
    });

    assert_eq!(store.history_len("shared").unwrap(), 100);
    assert_eq!(store.get_history("shared", usize::MAX).unwrap().len(), 100);
}
