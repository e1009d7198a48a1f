use std::io;
use std::path::PathBuf;

use shadertoy::HeaderError;
use thiserror::Error;

use crate::driver::DriverError;

#[derive(Debug, Error)]
pub enum ShaderError {
    /// The caller broke an API contract (missing unit, unreserved attribute,
    /// operation unsupported by the source format).
    #[error("{component}: {message}")]
    Precondition { component: String, message: String },

    #[error("{component} has no driver object yet")]
    NotReady { component: String },

    #[error("failed to read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("shader header in {name} is invalid: {source}")]
    Header {
        name: String,
        #[source]
        source: HeaderError,
    },

    #[error("shader source {name} is not valid text: {reason}")]
    Encoding { name: String, reason: String },

    #[error("shader {name} has no source to compile")]
    EmptySource { name: String },

    #[error("failed to compile {stage} shader {name}:\n{log}")]
    Compile {
        name: String,
        stage: &'static str,
        log: String,
    },

    #[error("failed to link program {program}:\n{log}")]
    Link { program: String, log: String },

    #[error("uniform '{name}' is not active in program {program}")]
    UniformNotFound { program: String, name: String },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl ShaderError {
    pub(crate) fn precondition(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Precondition {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}
