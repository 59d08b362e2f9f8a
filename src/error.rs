//! Error types

use thiserror::Error;

/// Error type for interceptor registry operations
///
/// Interceptors themselves are infallible by contract — an observability
/// tap must never fail the message path — so errors only arise on the host
/// side, when pipeline configuration is resolved against the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No interceptor registered under the requested name
    #[error("no interceptor registered under '{0}'")]
    Unknown(String),
}
