//! jalki — trace enrichment for message pipelines
//!
//! Interceptors observe in-flight messages at a tap point of a routing
//! pipeline and annotate the distributed-trace span that is active for the
//! current operation. They are read-only with respect to the message and
//! additive-only with respect to the trace:
//!
//! ```text
//! Ingest ──► Pipeline stages ──► [tap: InterceptorChain] ──► Outputs
//!                                   │
//!                                   └─► span.add_event("message.observed")
//! ```
//!
//! The trace context is an explicit parameter ([`opentelemetry::Context`])
//! threaded through [`Interceptor::process`]. Pipelines that still propagate
//! the context implicitly call [`Interceptor::process_current`], which looks
//! up the thread's current context at that boundary and nowhere else.
//!
//! Interceptors never originate spans, never decide sampling, and never
//! affect routing. A message with no active span in scope passes the tap
//! untouched.
//!
//! # Quick start
//!
//! ```
//! use bytes::Bytes;
//! use jalki::{InterceptorRegistry, Message, TRACE_ENRICHER};
//!
//! let registry = InterceptorRegistry::with_defaults();
//! let chain = registry.chain(&[TRACE_ENRICHER])?;
//!
//! let msg = Message::new(Bytes::from_static(b"hello")).with_endpoint("jms:orders");
//! chain.process_current(&msg); // no active span here: a safe no-op
//! # Ok::<(), jalki::RegistryError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![warn(missing_docs)]

/// Span-event enrichment interceptor
pub mod enrich;
mod error;
/// Interceptor trait and ordered invocation chain
pub mod interceptor;
/// The in-flight message envelope
pub mod message;
/// Name-keyed interceptor registry
pub mod registry;

pub use enrich::{
    EnrichConfig, MissingSpanPolicy, TraceEnricher, OBSERVED_EVENT, TRACE_ENRICHER,
    UNKNOWN_ENDPOINT,
};
pub use error::RegistryError;
pub use interceptor::{Interceptor, InterceptorChain, Noop};
pub use message::Message;
pub use registry::InterceptorRegistry;
