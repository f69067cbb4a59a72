//! Error taxonomy
//!
//! Configuration errors surface while game content is being registered and
//! lookup errors when a name was never registered. Neither is raised from
//! inside a simulation step.

use thiserror::Error;

/// Errors raised while building or querying simulation content.
#[derive(Debug, Error)]
pub enum Error {
    /// Rectangle boundaries need a positive width and height.
    #[error("rectangle boundary must have positive dimensions, got {width}x{height}")]
    InvalidRect { width: f32, height: f32 },
    /// A name was registered twice under the same parent.
    #[error("{kind} `{name}` is already registered")]
    Duplicate { kind: &'static str, name: String },
    /// A second collision handler for the same pair of actors.
    #[error("actor `{actor}` already has a collision handler for `{other}`")]
    DuplicateCollision { actor: String, other: String },
    /// A name that was never registered.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: &'static str, name: String },
    /// Settings JSON could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
    /// Settings file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether this error was raised at construction/registration time
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidRect { .. } | Error::Duplicate { .. } | Error::DuplicateCollision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::not_found("actor", "ghost");
        assert_eq!(err.to_string(), "actor `ghost` not found");
        assert!(!err.is_configuration());

        let err = Error::duplicate("layer", "hud");
        assert_eq!(err.to_string(), "layer `hud` is already registered");
        assert!(err.is_configuration());
    }
}
