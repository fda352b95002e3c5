use thiserror::Error;

/// Everything that can go wrong while building a group or dispatching on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    /// A value passed to `apply` is not a sequence with one entry per handle.
    #[error("invalid context value for `{parameter}`: {reason}")]
    InvalidContextValue { parameter: String, reason: String },

    /// Named dispatch reached a handle that does not expose the operation.
    #[error("handle `{handle}` does not have an operation named `{operation}`")]
    OperationNotFound { handle: String, operation: String },

    /// Position lookup for a handle that was never part of the group.
    #[error("handle `{handle}` is not a member of this group")]
    NotAMember { handle: String },

    #[error("handle name `{handle}` appears more than once")]
    DuplicateHandle { handle: String },

    #[error("an instance group needs at least one handle")]
    EmptyGroup,

    /// Raised by a handle's own operation; the group passes it through as is.
    #[error("handle `{handle}` failed: {message}")]
    Delegate { handle: String, message: String },

    #[error("config error: {0}")]
    Config(String),
}

impl GroupError {
    pub(crate) fn invalid_context(parameter: &str, reason: impl Into<String>) -> Self {
        GroupError::InvalidContextValue {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn delegate(handle: &str, message: impl Into<String>) -> Self {
        GroupError::Delegate {
            handle: handle.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GroupError>;
