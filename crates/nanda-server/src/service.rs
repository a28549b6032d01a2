//! Reputation service: fetch, score, persist.
//!
//! [`ReputationService`] wires a [`MetricsSource`], an [`AlgorithmRegistry`]
//! and a [`ScoreStore`] together. It holds no mutable state of its own, so
//! one instance is shared across all request handlers behind an `Arc`.

use std::sync::Arc;

use nanda_core::constants::DEFAULT_OUTLIER_Z_THRESHOLD;
use nanda_core::error::ConfigError;
use nanda_core::store::ScoreStore;
use nanda_core::traits::MetricsSource;
use nanda_core::types::{MetricsBundle, ReputationScore};
use nanda_reputation::outliers::check_z_threshold;
use nanda_reputation::{score_anomalies, AlgorithmRegistry};
use tracing::{debug, info};

use crate::error::ServiceError;

pub struct ReputationService {
    source: Arc<dyn MetricsSource>,
    registry: AlgorithmRegistry,
    store: Arc<dyn ScoreStore>,
    outlier_z_threshold: f64,
}

impl std::fmt::Debug for ReputationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationService")
            .field("registry", &self.registry)
            .field("outlier_z_threshold", &self.outlier_z_threshold)
            .finish_non_exhaustive()
    }
}

impl ReputationService {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        registry: AlgorithmRegistry,
        store: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            source,
            registry,
            store,
            outlier_z_threshold: DEFAULT_OUTLIER_Z_THRESHOLD,
        }
    }

    /// Override the z-score cut-off used by [`Self::anomalies`].
    pub fn with_outlier_z_threshold(mut self, z: f64) -> Result<Self, ConfigError> {
        check_z_threshold(z)?;
        self.outlier_z_threshold = z;
        Ok(self)
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ScoreStore> {
        &self.store
    }

    /// Pull the latest metrics for `subject_id`, score them and save the result.
    pub async fn refresh(
        &self,
        subject_id: &str,
        algorithm_id: Option<&str>,
    ) -> Result<ReputationScore, ServiceError> {
        check_subject(subject_id)?;
        // Resolve before fetching so an unknown algorithm costs no round trip.
        let algorithm = self.registry.resolve(algorithm_id)?;
        let bundle = self.source.fetch(subject_id).await?;
        debug!(subject = %subject_id, empty = bundle.is_empty(), "service: metrics fetched");

        let score = algorithm.calculate(subject_id, &bundle);
        self.store.save(&score)?;
        info!(
            subject = %subject_id,
            overall = score.overall_score,
            confidence = score.confidence.level,
            algorithm = %score.algorithm_id,
            "service: score refreshed"
        );
        Ok(score)
    }

    /// Score a caller-supplied bundle and save the result.
    pub fn score_bundle(
        &self,
        subject_id: &str,
        bundle: &MetricsBundle,
        algorithm_id: Option<&str>,
    ) -> Result<ReputationScore, ServiceError> {
        check_subject(subject_id)?;
        let score = self.registry.calculate(algorithm_id, subject_id, bundle)?;
        self.store.save(&score)?;
        info!(
            subject = %subject_id,
            overall = score.overall_score,
            algorithm = %score.algorithm_id,
            "service: score computed"
        );
        Ok(score)
    }

    pub fn current(&self, subject_id: &str) -> Result<Option<ReputationScore>, ServiceError> {
        Ok(self.store.get_current(subject_id)?)
    }

    pub fn history(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationScore>, ServiceError> {
        Ok(self.store.get_history(subject_id, limit)?)
    }

    /// Records in the subject's full history whose overall score is an outlier.
    pub fn anomalies(&self, subject_id: &str) -> Result<Vec<ReputationScore>, ServiceError> {
        let history = self.store.get_history(subject_id, usize::MAX)?;
        Ok(score_anomalies(&history, self.outlier_z_threshold)?)
    }

    pub fn subjects(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.subjects()?)
    }
}

fn check_subject(subject_id: &str) -> Result<(), ServiceError> {
    if subject_id.trim().is_empty() {
        return Err(ServiceError::InvalidSubject(subject_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanda_core::error::{RegistryError, SourceError};
    use nanda_core::source::MemoryMetricsSource;
    use nanda_core::store::MemoryScoreStore;
    use nanda_core::types::{FeedbackMetrics, ScoringConfig, VerificationLevel, VerificationMetrics};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl MetricsSource for FailingSource {
        async fn fetch(&self, _subject_id: &str) -> Result<MetricsBundle, SourceError> {
            Err(SourceError::Transport("connection refused".into()))
        }
    }

    fn gold_bundle() -> MetricsBundle {
        MetricsBundle {
            verification: Some(VerificationMetrics {
                level: VerificationLevel::Gold,
                ..Default::default()
            }),
            feedback: Some(FeedbackMetrics {
                average_rating: Some(4.8),
                rating_count: Some(150),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn service_with(source: Arc<dyn MetricsSource>) -> ReputationService {
        ReputationService::new(
            source,
            AlgorithmRegistry::with_default(ScoringConfig::default()).unwrap(),
            Arc::new(MemoryScoreStore::new()),
        )
    }

    #[tokio::test]
    async fn refresh_scores_and_saves() {
        let source = MemoryMetricsSource::new();
        source.insert("agent-1", gold_bundle());
        let svc = service_with(Arc::new(source));

        let score = svc.refresh("agent-1", None).await.unwrap();
        assert_eq!(score.categories.verification, 100.0);
        assert_eq!(score.data_points, 150);
        assert_eq!(svc.current("agent-1").unwrap(), Some(score));
        assert_eq!(svc.history("agent-1", 10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn refresh_unknown_subject_gives_default_record() {
        let svc = service_with(Arc::new(MemoryMetricsSource::new()));
        let score = svc.refresh("ghost", None).await.unwrap();
        assert_eq!(score.categories.performance, 50.0);
        assert_eq!(score.categories.verification, 0.0);
        assert_eq!(score.confidence.level, 0.0);
    }

    #[tokio::test]
    async fn refresh_propagates_source_failure_without_saving() {
        let svc = service_with(Arc::new(FailingSource));
        let err = svc.refresh("agent-1", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Source(SourceError::Transport(_))));
        assert!(svc.current("agent-1").unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_unknown_algorithm() {
        let svc = service_with(Arc::new(FailingSource));
        let err = svc.refresh("agent-1", Some("v0")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Registry(RegistryError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn blank_subject_rejected() {
        let svc = service_with(Arc::new(MemoryMetricsSource::new()));
        assert!(matches!(
            svc.score_bundle("  ", &MetricsBundle::empty(), None),
            Err(ServiceError::InvalidSubject(_))
        ));
    }

    #[test]
    fn anomalies_over_saved_history() {
        let svc = service_with(Arc::new(MemoryMetricsSource::new()));
        for _ in 0..8 {
            svc.score_bundle("agent-2", &gold_bundle(), None).unwrap();
        }
        assert!(svc.anomalies("agent-2").unwrap().is_empty());

        svc.score_bundle("agent-2", &MetricsBundle::empty(), None).unwrap();
        let anomalies = svc.anomalies("agent-2").unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].categories.verification, 0.0);
        assert_eq!(svc.subjects().unwrap(), vec!["agent-2".to_string()]);
    }

    #[test]
    fn outlier_threshold_must_be_positive_and_finite() {
        for z in [-1.0, 0.0, f64::NAN] {
            let err = service_with(Arc::new(MemoryMetricsSource::new()))
                .with_outlier_z_threshold(z)
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidZThreshold(_)), "z={z}");
        }

        let svc = service_with(Arc::new(MemoryMetricsSource::new()))
            .with_outlier_z_threshold(1.5)
            .unwrap();
        assert_eq!(svc.outlier_z_threshold, 1.5);
    }
}
