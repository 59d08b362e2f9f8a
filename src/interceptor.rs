//! Interceptor trait and invocation chain
//!
//! Interceptors observe messages as they pass a tap point in the pipeline.
//! Unlike transforming middleware they cannot drop, reorder, or modify a
//! message: they receive a borrowed view plus the trace context of the
//! enclosing operation, and their only outputs are side effects on that
//! context (span events) and diagnostics.
//!
//! # Message Flow
//!
//! ```text
//! Input ──► Pipeline stages ──► [tap: InterceptorChain] ──► Outputs
//!                                  │
//!                                  └─► observe only (no routing effect)
//! ```
//!
//! # Example
//!
//! ```ignore
//! struct LoggingInterceptor;
//!
//! impl Interceptor for LoggingInterceptor {
//!     fn name(&self) -> &'static str { "logging" }
//!
//!     fn process(&self, _cx: &Context, msg: &Message) {
//!         tracing::info!(id = %msg.id, "observed message");
//!     }
//! }
//! ```

use crate::message::Message;
use opentelemetry::Context;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, trace};

/// Interceptor trait for observe-only message processing
///
/// Implementations must be stateless with respect to invocations: the same
/// value is shared across all pipeline workers and invoked concurrently, so
/// no mutable instance state may be retained between calls.
///
/// # Contract
///
/// - read-only on the message, additive-only on the trace context's span
/// - synchronous and non-blocking
/// - no return value; failure must never reach the caller
pub trait Interceptor: Send + Sync {
    /// Interceptor name for registration and logging
    fn name(&self) -> &'static str;

    /// Observe a message within an explicit trace context
    ///
    /// Invoked once per in-flight message reaching the tap point. The
    /// context carries whatever span is open for the current operation;
    /// implementations must tolerate a context with no active span.
    fn process(&self, cx: &Context, msg: &Message);

    /// Observe a message using the thread's ambient trace context
    ///
    /// Boundary for legacy-style pipelines that propagate the context
    /// implicitly instead of threading it through the invocation
    /// interface. Equivalent to `process(&Context::current(), msg)`.
    fn process_current(&self, msg: &Message) {
        self.process(&Context::current(), msg);
    }
}

/// An ordered set of interceptors invoked at one tap point
///
/// Every interceptor sees every message, in registration order. A
/// panicking interceptor is caught and logged; the remaining interceptors
/// still run and the message path is never aborted.
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Add an interceptor to the end of the chain
    pub fn add<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.push(Arc::new(interceptor));
    }

    /// Add an already-shared interceptor to the end of the chain
    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Run every interceptor against a message, in order
    ///
    /// A panic inside an interceptor is contained here: it is logged at
    /// error level and the chain continues with the next interceptor.
    pub fn process(&self, cx: &Context, msg: &Message) {
        for interceptor in &self.interceptors {
            let start = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| interceptor.process(cx, msg)));
            match outcome {
                Ok(()) => trace!(
                    interceptor = interceptor.name(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "interceptor ran"
                ),
                Err(_) => error!(
                    interceptor = interceptor.name(),
                    id = %msg.id,
                    "interceptor panicked, message path continues"
                ),
            }
        }
    }

    /// Run every interceptor using the thread's ambient trace context
    pub fn process_current(&self, msg: &Message) {
        self.process(&Context::current(), msg);
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Get the number of interceptors in the chain
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Get names of all interceptors in chain order
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.names())
            .finish()
    }
}

/// Interceptor that does nothing (useful for wiring tests)
pub struct Noop;

impl Interceptor for Noop {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn process(&self, _cx: &Context, _msg: &Message) {}
}
