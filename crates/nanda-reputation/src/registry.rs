//! Algorithm registry.
//!
//! An owned map from algorithm id to [`ScoringAlgorithm`]. Callers construct
//! and pass registries explicitly, so several configurations can coexist in
//! one process without interfering.

use std::collections::HashMap;
use std::sync::Arc;

use nanda_core::error::RegistryError;
use nanda_core::traits::ScoringAlgorithm;
use nanda_core::types::{MetricsBundle, ReputationScore, ScoringConfig};
use tracing::info;

use crate::scorer::WeightedAggregation;

#[derive(Default, Clone)]
pub struct AlgorithmRegistry {
    algorithms: HashMap<String, Arc<dyn ScoringAlgorithm>>,
    default_id: Option<String>,
}

impl std::fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("algorithms", &self.ids())
            .field("default_id", &self.default_id)
            .finish()
    }
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding [`WeightedAggregation`] built from `config`, set as default.
    pub fn with_default(config: ScoringConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(WeightedAggregation::new(config)?)?;
        Ok(registry)
    }

    /// Add an algorithm. The first one registered becomes the default.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateAlgorithm`] if the id is already taken.
    pub fn register(
        &mut self,
        algorithm: impl ScoringAlgorithm + 'static,
    ) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(algorithm))
    }

    pub fn register_arc(
        &mut self,
        algorithm: Arc<dyn ScoringAlgorithm>,
    ) -> Result<(), RegistryError> {
        let id = algorithm.id().to_string();
        if self.algorithms.contains_key(&id) {
            return Err(RegistryError::DuplicateAlgorithm(id));
        }
        info!(algorithm = %id, "registry: algorithm registered");
        if self.default_id.is_none() {
            self.default_id = Some(id.clone());
        }
        self.algorithms.insert(id, algorithm);
        Ok(())
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), RegistryError> {
        if !self.algorithms.contains_key(id) {
            return Err(RegistryError::UnknownAlgorithm(id.to_string()));
        }
        self.default_id = Some(id.to_string());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ScoringAlgorithm>> {
        self.algorithms.get(id).cloned()
    }

    pub fn default_id(&self) -> Option<&str> {
        self.default_id.as_deref()
    }

    pub fn default_algorithm(&self) -> Option<Arc<dyn ScoringAlgorithm>> {
        self.default_id.as_deref().and_then(|id| self.get(id))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.algorithms.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Resolve `algorithm_id` (or the default when `None`).
    pub fn resolve(
        &self,
        algorithm_id: Option<&str>,
    ) -> Result<Arc<dyn ScoringAlgorithm>, RegistryError> {
        match algorithm_id {
            Some(id) => self
                .get(id)
                .ok_or_else(|| RegistryError::UnknownAlgorithm(id.to_string())),
            None => self.default_algorithm().ok_or(RegistryError::NoDefault),
        }
    }

    /// Score with the named algorithm, or the default when `None`.
    pub fn calculate(
        &self,
        algorithm_id: Option<&str>,
        subject_id: &str,
        bundle: &MetricsBundle,
    ) -> Result<ReputationScore, RegistryError> {
        Ok(self.resolve(algorithm_id)?.calculate(subject_id, bundle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nanda_core::constants::WEIGHTED_AGGREGATION_V1;
    use nanda_core::types::{CategoryScores, CategoryWeights, Confidence};

    /// Scores every subject with a fixed value.
    struct Flat(f64);

    impl ScoringAlgorithm for Flat {
        fn id(&self) -> &str {
            "flat-v1"
        }

        fn calculate(&self, subject_id: &str, _bundle: &MetricsBundle) -> ReputationScore {
            ReputationScore {
                subject_id: subject_id.to_string(),
                overall_score: self.0,
                categories: CategoryScores::default(),
                confidence: Confidence::default(),
                last_updated: Utc::now(),
                data_points: 0,
                algorithm_id: self.id().to_string(),
            }
        }
    }

    #[test]
    fn with_default_registers_weighted_aggregation() {
        let registry = AlgorithmRegistry::with_default(ScoringConfig::default()).unwrap();
        assert_eq!(registry.default_id(), Some(WEIGHTED_AGGREGATION_V1));
        assert_eq!(registry.ids(), vec![WEIGHTED_AGGREGATION_V1.to_string()]);
    }

    #[test]
    fn with_default_rejects_bad_config() {
        let cfg = ScoringConfig {
            half_life_days: 0.0,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            AlgorithmRegistry::with_default(cfg),
            Err(RegistryError::Config(_))
        ));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(Flat(10.0)).unwrap();
        assert_eq!(
            registry.register(Flat(20.0)),
            Err(RegistryError::DuplicateAlgorithm("flat-v1".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn calculate_routes_by_id() {
        let mut registry = AlgorithmRegistry::with_default(ScoringConfig::default()).unwrap();
        registry.register(Flat(12.0)).unwrap();

        let flat = registry
            .calculate(Some("flat-v1"), "srv", &MetricsBundle::empty())
            .unwrap();
        assert_eq!(flat.overall_score, 12.0);
        assert_eq!(flat.algorithm_id, "flat-v1");

        let default = registry.calculate(None, "srv", &MetricsBundle::empty()).unwrap();
        assert_eq!(default.algorithm_id, WEIGHTED_AGGREGATION_V1);
    }

    #[test]
    fn unknown_algorithm_is_an_error() {
        let registry = AlgorithmRegistry::with_default(ScoringConfig::default()).unwrap();
        assert_eq!(
            registry
                .calculate(Some("nope"), "srv", &MetricsBundle::empty())
                .unwrap_err(),
            RegistryError::UnknownAlgorithm("nope".into())
        );
    }

    #[test]
    fn empty_registry_has_no_default() {
        let registry = AlgorithmRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.calculate(None, "srv", &MetricsBundle::empty()).unwrap_err(),
            RegistryError::NoDefault
        );
    }

    #[test]
    fn set_default_switches_algorithm() {
        let mut registry = AlgorithmRegistry::with_default(ScoringConfig::default()).unwrap();
        registry.register(Flat(5.0)).unwrap();
        registry.set_default("flat-v1").unwrap();
        assert_eq!(registry.default_id(), Some("flat-v1"));
        assert!(registry.set_default("missing").is_err());
    }

    #[test]
    fn registries_are_independent() {
        let a = AlgorithmRegistry::with_default(ScoringConfig::default()).unwrap();
        let b = AlgorithmRegistry::with_default(ScoringConfig {
            weights: CategoryWeights {
                performance: 0.0,
                verification: 1.0,
                feedback: 0.0,
                usage: 0.0,
            },
            ..ScoringConfig::default()
        })
        .unwrap();

        let empty = MetricsBundle::empty();
        let sa = a.calculate(None, "srv", &empty).unwrap();
        let sb = b.calculate(None, "srv", &empty).unwrap();
        assert_eq!(sa.overall_score, 40.0);
        assert_eq!(sb.overall_score, 0.0);
    }
}
