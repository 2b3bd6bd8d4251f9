//! Error types for the Guestbook Operator

use thiserror::Error;

/// Result type for the operator
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the operator
///
/// A missing object is not an error: lookups surface it as `None`. Every
/// variant here is treated as retryable by the controller's error policy.
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error (network, conflict, permission)
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// The owner reference for the child ConfigMap could not be built
    #[error("Owner reference error: {0}")]
    OwnerReferenceError(String),

    /// An object is missing a required metadata field
    #[error("Object is missing metadata.{0}")]
    MissingObjectKey(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The reconcile pass was aborted by shutdown
    #[error("Reconciliation cancelled")]
    Cancelled,
}

impl Error {
    /// Short label used for metrics
    pub fn metric_label(&self) -> &'static str {
        match self {
            Error::KubeError(_) => "kube",
            Error::OwnerReferenceError(_) => "owner_reference",
            Error::MissingObjectKey(_) => "missing_key",
            Error::ConfigError(_) => "config",
            Error::Cancelled => "cancelled",
        }
    }
}
