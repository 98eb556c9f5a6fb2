//! Domain errors for the Operant planning core.

use thiserror::Error;

/// Errors raised while building planning metadata from a type manifest.
///
/// Discovery failures are configuration bugs and fail fast at
/// metadata-build time; they are never deferred to invocation time.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(
        "Ambiguous input binding in action '{action}': more than one parameter of type \
         '{type_name}' without explicit names"
    )]
    AmbiguousBinding { action: String, type_name: String },

    #[error("Duplicate action name: {0}")]
    DuplicateAction(String),

    #[error("Blank description on {0}")]
    BlankDescription(String),

    #[error("Type '{0}' carries both an agent marker and a scope marker")]
    ConflictingMarkers(String),

    #[error("No exemplar registered for interface type '{0}'")]
    NoExemplar(String),

    #[error("Unknown domain type '{0}' referenced by a parameter")]
    UnknownDomainType(String),
}

/// Errors raised while invoking an action against live process state.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// A required input had no value on the blackboard. This is a
    /// configuration bug, not a runtime condition to recover from.
    #[error(
        "No value found for required input '{binding}' (type '{type_name}') of action '{action}'"
    )]
    MissingInput {
        action: String,
        binding: String,
        type_name: String,
    },

    /// The action's own logic failed. Propagated unmodified.
    #[error("Action '{action}' failed: {source}")]
    Action {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// A model call requested by the action failed after retries.
    #[error("Model call for action '{action}' failed: {source}")]
    Model {
        action: String,
        #[source]
        source: crate::domain::ports::ModelError,
    },
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
