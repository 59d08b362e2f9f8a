//! Span-event enrichment
//!
//! [`TraceEnricher`] is the tap-point interceptor that annotates the span
//! currently open for a pipeline operation with what it saw: one
//! `message.observed` event per message, describing the originating
//! endpoint and a bounded view of the body.
//!
//! The enricher never opens or closes spans and never touches the message.
//! With no active span in the supplied context it degrades to a no-op, or
//! to a logged warning where a span is guaranteed by deployment and its
//! absence means the pipeline is miswired (see [`MissingSpanPolicy`]).

use crate::interceptor::Interceptor;
use crate::message::Message;
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{Context, KeyValue};
use std::borrow::Cow;
use tracing::{trace, warn};

/// Registration name of [`TraceEnricher`]
pub const TRACE_ENRICHER: &str = "trace-enricher";

/// Name of the span event appended per observed message
pub const OBSERVED_EVENT: &str = "message.observed";

/// Endpoint marker used when a message carries no provenance
pub const UNKNOWN_ENDPOINT: &str = "unknown";

/// Substitute body text for payloads that are not valid UTF-8
const UNREADABLE_BODY: &str = "<unreadable body>";

/// Suffix appended to a body cut at the configured limit
const TRUNCATION_MARKER: &str = "...";

/// Attribute key carrying the composed event description
const DESCRIPTION_KEY: &str = "description";

/// What to do when no span is active at the tap point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingSpanPolicy {
    /// Skip enrichment silently. The right choice when unsampled or
    /// untraced operations are routine at this stage.
    #[default]
    Silent,
    /// Log a warning. For deployments where every message is guaranteed a
    /// span at this stage, so absence indicates a wiring problem.
    Warn,
}

/// Configuration for [`TraceEnricher`]
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Maximum number of body characters included in the event
    /// description. Longer bodies are cut here and suffixed with a
    /// truncation marker, so one oversized message cannot bloat the
    /// tracing backend.
    pub max_body_chars: usize,

    /// Behavior when the supplied context has no active span
    pub missing_span: MissingSpanPolicy,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_body_chars: 256,
            missing_span: MissingSpanPolicy::Silent,
        }
    }
}

/// Trace-enriching interceptor
///
/// Appends one [`OBSERVED_EVENT`] event to the active span per observed
/// message, carrying a `description` attribute of the form
/// `EndPoint uri={endpoint} Message Body={body}`. The event is timestamped
/// by the tracing library at append time.
///
/// Stateless: a single instance is shared across all pipeline workers.
///
/// # Example
///
/// ```ignore
/// let registry = InterceptorRegistry::with_defaults();
/// let chain = registry.chain(&[TRACE_ENRICHER])?;
/// chain.process(&cx, &msg);
/// ```
pub struct TraceEnricher {
    config: EnrichConfig,
}

impl TraceEnricher {
    /// Create an enricher with default configuration
    pub fn new() -> Self {
        Self::with_config(EnrichConfig::default())
    }

    /// Create an enricher with explicit configuration
    pub fn with_config(config: EnrichConfig) -> Self {
        Self { config }
    }

    /// Compose the event description for a message
    ///
    /// Absent provenance yields the [`UNKNOWN_ENDPOINT`] marker rather
    /// than an error.
    fn describe(&self, msg: &Message) -> String {
        let endpoint = msg.endpoint().unwrap_or(UNKNOWN_ENDPOINT);
        let body = self.body_text(msg);
        format!("EndPoint uri={endpoint} Message Body={body}")
    }

    /// Bounded text view of the payload
    ///
    /// Never decodes more than a fixed multiple of `max_body_chars` bytes,
    /// whatever the payload size. A cut that lands inside a multi-byte
    /// character keeps the valid prefix; payloads that are not text yield
    /// a placeholder.
    fn body_text<'a>(&self, msg: &'a Message) -> Cow<'a, str> {
        let max = self.config.max_body_chars;
        let payload: &'a [u8] = &msg.payload;
        // 4 bytes per character bounds how far we ever look
        let byte_bound = max.saturating_mul(4).saturating_add(4);

        if payload.len() <= byte_bound {
            return match msg.payload_str() {
                Some(text) => clip(text, max),
                None => Cow::Borrowed(UNREADABLE_BODY),
            };
        }

        let prefix = &payload[..byte_bound];
        let text = match std::str::from_utf8(prefix) {
            Ok(text) => text,
            // error_len() of None means the bound split a character, not
            // that the body is binary
            Err(e) if e.error_len().is_none() => {
                std::str::from_utf8(&prefix[..e.valid_up_to()]).unwrap_or(UNREADABLE_BODY)
            }
            Err(_) => return Cow::Borrowed(UNREADABLE_BODY),
        };
        let head = match text.char_indices().nth(max) {
            Some((idx, _)) => &text[..idx],
            None => text,
        };
        // The payload extends past the bound, so the marker always applies
        Cow::Owned(format!("{head}{TRUNCATION_MARKER}"))
    }
}

impl Default for TraceEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl Interceptor for TraceEnricher {
    fn name(&self) -> &'static str {
        TRACE_ENRICHER
    }

    fn process(&self, cx: &Context, msg: &Message) {
        if !cx.has_active_span() {
            match self.config.missing_span {
                MissingSpanPolicy::Silent => {}
                MissingSpanPolicy::Warn => {
                    warn!(id = %msg.id, "no active span at enrichment tap point");
                }
            }
            return;
        }

        let description = self.describe(msg);
        cx.span()
            .add_event(OBSERVED_EVENT, vec![KeyValue::new(DESCRIPTION_KEY, description)]);
        trace!(id = %msg.id, "span enriched");
    }
}

/// Cut `text` after `max` characters, marking the cut
fn clip(text: &str, max: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max) {
        Some((idx, _)) => Cow::Owned(format!("{}{}", &text[..idx], TRUNCATION_MARKER)),
        None => Cow::Borrowed(text),
    }
}
