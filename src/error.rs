use std::fmt;
use std::fmt::{Display, Formatter};

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Bad or missing parameters, wrong node group cardinality or degenerate geometry.
    Configuration(String),
    /// A referenced node, group or degree of freedom is absent from the current model.
    ModelState(String),
    /// No builder is registered under the requested `process_name`.
    UnknownFactoryTag(String),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn model_state(message: impl Into<String>) -> Self {
        Self::ModelState(message.into())
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_model_state_error(&self) -> bool {
        matches!(self, Self::ModelState(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Configuration error: {}", message),
            Self::ModelState(message) => write!(f, "Model state error: {}", message),
            Self::UnknownFactoryTag(tag) => {
                write!(f, "Unknown process: {} (no builder is registered under this name)", tag)
            }
        }
    }
}

impl std::error::Error for Error {}
