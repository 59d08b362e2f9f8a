//! In-flight message envelope
//!
//! The envelope a pipeline hands to interceptors at a tap point. It is
//! protocol-agnostic and uses `Bytes` for zero-copy payload handling: the
//! pipeline keeps ownership for the duration of the invocation and the
//! interceptor receives a borrowed, read-only view.

use bytes::Bytes;
use std::collections::HashMap;
use ulid::Ulid;

/// The in-flight message observed at a tap point
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use jalki::Message;
///
/// let msg = Message::new(Bytes::from_static(br#"{"id": 1}"#)).with_endpoint("jms:orders");
/// assert_eq!(msg.endpoint(), Some("jms:orders"));
/// assert_eq!(msg.payload_str(), Some(r#"{"id": 1}"#));
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique identifier
    pub id: Ulid,

    /// Unix timestamp in nanoseconds
    pub timestamp: i64,

    /// Identifier of the endpoint the message entered the pipeline through
    ///
    /// Absent when the message was injected programmatically rather than
    /// received from a configured endpoint.
    pub endpoint: Option<String>,

    /// Headers and context propagated through the pipeline
    pub metadata: HashMap<String, String>,

    /// Opaque payload — zero-copy via Bytes
    ///
    /// The pipeline doesn't interpret this; interceptors may read it as
    /// text via [`Message::payload_str`].
    pub payload: Bytes,
}

impl Message {
    /// Create a new message with an auto-generated ID and current timestamp
    pub fn new(payload: Bytes) -> Self {
        Self {
            id: Ulid::new(),
            timestamp: chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
            endpoint: None,
            metadata: HashMap::new(),
            payload,
        }
    }

    /// Set the originating endpoint identifier
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get the originating endpoint identifier, if the message has one
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Get the payload as a string slice (if valid UTF-8)
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Get the payload length in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}
