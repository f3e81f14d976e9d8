//! Engine configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it changes:
//!
//! ```rust
//! use dobfs::bfs::{BfsConfig, SwitchPolicy};
//!
//! let cfg = BfsConfig::from_json_str(r#"{ "alpha": 14, "strategy": { "policy": "always_pull" } }"#)
//!     .unwrap();
//! assert_eq!(cfg.alpha, 14);
//! assert_eq!(cfg.beta, 18);
//! assert_eq!(cfg.strategy.policy, SwitchPolicy::AlwaysPull);
//! assert!(cfg.strategy.use_cache);
//! ```

use serde::{Deserialize, Serialize};

use super::BfsError;

/// Default push→pull sensitivity.
pub const DEFAULT_ALPHA: u64 = 15;
/// Default pull→push sensitivity.
pub const DEFAULT_BETA: u64 = 18;
/// Default bound on the number of epochs.
pub const DEFAULT_MAX_EPOCHS: usize = 100;
/// Default frontier/explored capacity in nodes.
pub const DEFAULT_MAX_NODES: usize = 1 << 20;
/// Default neighbor-cache capacity in lines.
pub const DEFAULT_CACHE_LINES: usize = 256;
/// Default depth of the visited-node stream.
pub const DEFAULT_UPDATE_QUEUE_DEPTH: usize = 64;

/// How the controller picks the direction of each epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPolicy {
    /// Per-epoch cost model comparing estimated push and pull edge work.
    #[default]
    Adaptive,
    /// Classic `alpha`/`beta` thresholds with hysteresis on the current direction.
    Beamer,
    /// Every epoch pushes.
    AlwaysPush,
    /// Every epoch pulls.
    AlwaysPull,
}

/// How push epochs walk the frontier's out-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushKernel {
    /// For each frontier node, claim unexplored out-neighbors in place.
    #[default]
    VertexCentric,
    /// Scatter every frontier edge's destination into a buffer, then gather it
    /// against the explored set.
    ScatterGather,
    /// Claim out-neighbors from a rayon pool via atomic test-and-set, then emit
    /// serially.
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Capability flags selecting the traversal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalStrategy {
    /// Direction selection.
    pub policy: SwitchPolicy,
    /// Route pull-phase adjacency reads through the neighbor cache stage.
    pub use_cache: bool,
    /// Stop scanning a node's in-list at its first frontier parent.
    pub early_exit: bool,
    /// Push-phase kernel.
    pub push_kernel: PushKernel,
}

impl Default for TraversalStrategy {
    fn default() -> Self {
        Self {
            policy: SwitchPolicy::Adaptive,
            use_cache: true,
            early_exit: true,
            push_kernel: PushKernel::VertexCentric,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfsConfig {
    /// Push→pull sensitivity for [`SwitchPolicy::Beamer`].
    pub alpha: u64,
    /// Pull→push sensitivity for [`SwitchPolicy::Beamer`].
    pub beta: u64,
    /// Upper bound on epochs before the run is declared non-convergent.
    pub max_epochs: usize,
    /// Largest node count the frontier/explored sets accept.
    pub max_nodes: usize,
    /// Neighbor-cache capacity in lines.
    pub cache_lines: usize,
    /// Count cache hits, misses and aborted scans.
    pub track_cache_stats: bool,
    /// Capacity of the worker → depth writer stream.
    pub update_queue_depth: usize,
    /// Traversal variant.
    pub strategy: TraversalStrategy,
}

impl Default for BfsConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            max_epochs: DEFAULT_MAX_EPOCHS,
            max_nodes: DEFAULT_MAX_NODES,
            cache_lines: DEFAULT_CACHE_LINES,
            track_cache_stats: false,
            update_queue_depth: DEFAULT_UPDATE_QUEUE_DEPTH,
            strategy: TraversalStrategy::default(),
        }
    }
}

impl BfsConfig {
    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    /// Returns [`BfsError::InvalidConfig`] on malformed JSON or unusable values.
    pub fn from_json_str(json: &str) -> Result<Self, BfsError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| BfsError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    /// Returns [`BfsError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), BfsError> {
        let invalid = |field: &str| Err(BfsError::InvalidConfig(format!("{field} must be > 0")));
        if self.alpha == 0 {
            return invalid("alpha");
        }
        if self.beta == 0 {
            return invalid("beta");
        }
        if self.max_epochs == 0 {
            return invalid("max_epochs");
        }
        if self.cache_lines == 0 {
            return invalid("cache_lines");
        }
        if self.update_queue_depth == 0 {
            return invalid("update_queue_depth");
        }
        Ok(())
    }

    /// Sets the switching policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SwitchPolicy) -> Self {
        self.strategy.policy = policy;
        self
    }

    /// Enables or disables the neighbor cache stage.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.strategy.use_cache = enabled;
        self
    }

    /// Sets the neighbor-cache capacity in lines.
    #[must_use]
    pub fn with_cache_lines(mut self, lines: usize) -> Self {
        self.cache_lines = lines;
        self
    }

    /// Enables or disables cache statistics.
    #[must_use]
    pub fn with_cache_stats(mut self, enabled: bool) -> Self {
        self.track_cache_stats = enabled;
        self
    }

    /// Enables or disables pull-phase early exit.
    #[must_use]
    pub fn with_early_exit(mut self, enabled: bool) -> Self {
        self.strategy.early_exit = enabled;
        self
    }

    /// Sets the push-phase kernel.
    #[must_use]
    pub fn with_push_kernel(mut self, kernel: PushKernel) -> Self {
        self.strategy.push_kernel = kernel;
        self
    }

    /// Sets the epoch bound.
    #[must_use]
    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Sets the node capacity.
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Sets the `alpha`/`beta` sensitivities.
    #[must_use]
    pub fn with_thresholds(mut self, alpha: u64, beta: u64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = BfsConfig::default();
        assert_eq!(cfg.alpha, 15);
        assert_eq!(cfg.beta, 18);
        assert_eq!(cfg.max_epochs, 100);
        assert_eq!(cfg.strategy.policy, SwitchPolicy::Adaptive);
        assert!(cfg.strategy.early_exit);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(BfsConfig::from_json_str("{}").unwrap(), BfsConfig::default());
    }

    #[test]
    fn json_round_trips_strategy_names() {
        let cfg = BfsConfig::default()
            .with_policy(SwitchPolicy::Beamer)
            .with_push_kernel(PushKernel::ScatterGather)
            .with_cache(false);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"beamer\""));
        assert!(json.contains("\"scatter_gather\""));
        assert_eq!(BfsConfig::from_json_str(&json).unwrap(), cfg);
    }

    #[test]
    fn zero_values_are_rejected() {
        let err = BfsConfig::from_json_str(r#"{ "cache_lines": 0 }"#).unwrap_err();
        assert_eq!(err, BfsError::InvalidConfig("cache_lines must be > 0".into()));
        assert!(BfsConfig::from_json_str("{ not json").is_err());
        assert!(BfsConfig::default().with_max_epochs(0).validate().is_err());
        let err = BfsConfig::default().with_thresholds(0, 18).validate().unwrap_err();
        assert_eq!(err, BfsError::InvalidConfig("alpha must be > 0".into()));
    }
}
