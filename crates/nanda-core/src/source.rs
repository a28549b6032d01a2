//! In-memory [`MetricsSource`] backed by a fixture map.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::SourceError;
use crate::traits::MetricsSource;
use crate::types::MetricsBundle;

/// Metrics source that serves pre-loaded bundles.
///
/// Unknown subjects receive an empty bundle.
#[derive(Debug, Default)]
pub struct MemoryMetricsSource {
    bundles: RwLock<HashMap<String, MetricsBundle>>,
}

impl MemoryMetricsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from `(subject_id, bundle)` pairs.
    pub fn with_bundles<I, S>(bundles: I) -> Self
    where
        I: IntoIterator<Item = (S, MetricsBundle)>,
        S: Into<String>,
    {
        let map = bundles.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            bundles: RwLock::new(map),
        }
    }

    /// Insert or replace the bundle served for a subject.
    pub fn insert(&self, subject_id: impl Into<String>, bundle: MetricsBundle) {
        self.bundles.write().insert(subject_id.into(), bundle);
    }

    pub fn remove(&self, subject_id: &str) -> Option<MetricsBundle> {
        self.bundles.write().remove(subject_id)
    }

    pub fn len(&self) -> usize {
        self.bundles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.read().is_empty()
    }
}

#[async_trait]
impl MetricsSource for MemoryMetricsSource {
    async fn fetch(&self, subject_id: &str) -> Result<MetricsBundle, SourceError> {
        let bundle = self.bundles.read().get(subject_id).cloned();
        match bundle {
            Some(bundle) => Ok(bundle),
            None => {
                debug!(subject_id, "metrics_source: unknown subject, serving empty bundle");
                Ok(MetricsBundle::empty())
            }
        }
    }
}
