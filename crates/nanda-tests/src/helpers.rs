//! Shared fixtures for integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use nanda_core::source::MemoryMetricsSource;
use nanda_core::store::MemoryScoreStore;
use nanda_core::types::{
    CategoryWeights, FeedbackMetrics, MetricsBundle, PerformanceMetrics, ScoringConfig,
    UsageMetrics, VerificationLevel, VerificationMetrics,
};
use nanda_reputation::AlgorithmRegistry;
use nanda_server::ReputationService;

/// A fixed calculation instant.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

/// Gold-verified, highly rated, heavily used service with only the core fields.
pub fn showcase_bundle() -> MetricsBundle {
    MetricsBundle {
        performance: Some(PerformanceMetrics {
            uptime_percentage: Some(99.9),
            avg_response_time_ms: Some(150.0),
            error_rate: Some(0.01),
            successful_transactions: None,
        }),
        verification: Some(VerificationMetrics {
            level: VerificationLevel::Gold,
            ..Default::default()
        }),
        feedback: Some(FeedbackMetrics {
            average_rating: Some(4.8),
            rating_count: Some(50),
            ..Default::default()
        }),
        usage: Some(UsageMetrics {
            total_requests: Some(10_000),
            unique_clients: Some(500),
            longevity_days: Some(90),
            consistency_score: None,
        }),
        ..Default::default()
    }
}

/// [`showcase_bundle`] plus the signals the confidence factors draw on.
pub fn rich_bundle(now: DateTime<Utc>) -> MetricsBundle {
    let mut bundle = showcase_bundle();
    if let Some(v) = bundle.verification.as_mut() {
        v.verified_at = Some(now - Duration::days(2));
        v.methods = vec!["domain".into(), "code_audit".into()];
    }
    if let Some(f) = bundle.feedback.as_mut() {
        f.rating_count = Some(150);
        f.rating_distribution = Some([2, 3, 10, 35, 100]);
        f.review_count = Some(45);
    }
    if let Some(u) = bundle.usage.as_mut() {
        u.consistency_score = Some(95.0);
    }
    bundle
}

/// Weights that favour performance and verification.
pub fn showcase_weights() -> CategoryWeights {
    CategoryWeights {
        performance: 0.4,
        verification: 0.3,
        feedback: 0.2,
        usage: 0.1,
    }
}

pub fn showcase_config() -> ScoringConfig {
    ScoringConfig {
        weights: showcase_weights(),
        ..ScoringConfig::default()
    }
}

/// Service over an in-memory source and store, scoring with `config`.
pub fn memory_service(
    source: MemoryMetricsSource,
    config: ScoringConfig,
) -> (Arc<ReputationService>, Arc<MemoryScoreStore>) {
    let store = Arc::new(MemoryScoreStore::new());
    let registry = AlgorithmRegistry::with_default(config).unwrap();
    let service = ReputationService::new(Arc::new(source), registry, store.clone());
    (Arc::new(service), store)
}
