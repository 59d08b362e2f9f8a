//! Interceptor registry
//!
//! Maps stable names to interceptors so that pipeline configuration can
//! reference them by identifier. Typically populated at startup and used
//! read-only during operation. The registry is an explicit value owned by
//! the host — there is no process-wide singleton.

use crate::enrich::TraceEnricher;
use crate::error::RegistryError;
use crate::interceptor::{Interceptor, InterceptorChain};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of interceptors keyed by name
///
/// # Example
///
/// ```
/// use jalki::{InterceptorRegistry, Noop, TRACE_ENRICHER};
///
/// let mut registry = InterceptorRegistry::with_defaults();
/// registry.register(Noop);
///
/// let chain = registry.chain(&[TRACE_ENRICHER, "noop"])?;
/// assert_eq!(chain.len(), 2);
/// # Ok::<(), jalki::RegistryError>(())
/// ```
pub struct InterceptorRegistry {
    interceptors: HashMap<&'static str, Arc<dyn Interceptor>>,
}

impl InterceptorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            interceptors: HashMap::new(),
        }
    }

    /// Create a registry with the stock interceptors pre-registered
    ///
    /// Currently registers [`TraceEnricher`] with default configuration
    /// under its well-known name.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TraceEnricher::new());
        registry
    }

    /// Register an interceptor under its own name
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.insert(Arc::new(interceptor));
    }

    /// Register an already-shared interceptor under its own name
    pub fn register_shared(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.insert(interceptor);
    }

    fn insert(&mut self, interceptor: Arc<dyn Interceptor>) {
        let name = interceptor.name();
        if self.interceptors.insert(name, interceptor).is_some() {
            warn!(interceptor = name, "replaced existing interceptor registration");
        } else {
            info!(interceptor = name, "registered interceptor");
        }
    }

    /// Look up an interceptor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Interceptor>> {
        self.interceptors.get(name).cloned()
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.interceptors.contains_key(name)
    }

    /// Get the number of registered interceptors
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Resolve an ordered list of names into an invocation chain
    ///
    /// This is how pipeline configuration turns identifiers into the chain
    /// installed at a tap point. Fails on the first unrecognized name.
    pub fn chain(&self, names: &[&str]) -> Result<InterceptorChain, RegistryError> {
        let mut chain = InterceptorChain::new();
        for &name in names {
            let interceptor = self
                .get(name)
                .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
            chain.push(interceptor);
        }
        Ok(chain)
    }
}

impl Default for InterceptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::enrich::TRACE_ENRICHER;
    use crate::interceptor::Noop;

    #[test]
    fn test_register_and_get() {
        let mut registry = InterceptorRegistry::new();
        registry.register(Noop);

        assert!(registry.contains("noop"));
        assert!(!registry.contains("unknown"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("noop").unwrap().name(), "noop");
    }

    #[test]
    fn test_with_defaults_has_trace_enricher() {
        let registry = InterceptorRegistry::with_defaults();
        assert!(registry.contains(TRACE_ENRICHER));
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = InterceptorRegistry::new();
        registry.register(Noop);
        registry.register(Noop);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_shared() {
        let mut registry = InterceptorRegistry::new();
        registry.register_shared(Arc::new(Noop));

        assert!(registry.contains("noop"));
    }

    #[test]
    fn test_chain_resolution() {
        let mut registry = InterceptorRegistry::with_defaults();
        registry.register(Noop);

        let chain = registry.chain(&["noop", TRACE_ENRICHER]).unwrap();
        assert_eq!(chain.names(), vec!["noop", TRACE_ENRICHER]);
    }

    #[test]
    fn test_chain_unknown_name() {
        let registry = InterceptorRegistry::with_defaults();

        let err = registry.chain(&[TRACE_ENRICHER, "missing"]).unwrap_err();
        assert_eq!(err, RegistryError::Unknown("missing".to_string()));
    }

    #[test]
    fn test_empty_registry() {
        let registry = InterceptorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.chain(&[]).unwrap().is_empty());
    }
}
