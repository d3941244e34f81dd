use std::io;

use thiserror::Error;

/// Errors raised by the MIME type core.
///
/// Missing registry entries are not errors: resolvers return `None` for those.
#[derive(Debug, Error)]
pub enum MimeError {
    /// The string does not follow the `primary/sub[+suffix]` grammar.
    #[error("{0} is not a valid MIME type")]
    InvalidTypeName(String),

    /// The type dataset could not be read or produced no usable entries.
    #[error("failed to initialize MIME registry: {message}")]
    RegistryInitialization {
        message: String,
        #[source]
        source: Option<io::Error>,
    },
}

impl MimeError {
    pub(crate) fn init(message: impl Into<String>) -> Self {
        Self::RegistryInitialization {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn init_io(message: impl Into<String>, source: io::Error) -> Self {
        Self::RegistryInitialization {
            message: message.into(),
            source: Some(source),
        }
    }
}

pub type MimeResult<T> = Result<T, MimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceErrorKind {
    NotFound,
    Exists,
    PermissionDenied,
    InvalidArg,
    NotSupported,
    InvalidData,
    Failed,
}

/// Error raised by persistence handlers and resource services.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct ResourceError {
    kind: ResourceErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ResourceError {
    pub fn new(kind: ResourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ResourceErrorKind,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ResourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for ResourceError {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ResourceErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ResourceErrorKind::PermissionDenied,
            io::ErrorKind::AlreadyExists => ResourceErrorKind::Exists,
            io::ErrorKind::InvalidInput => ResourceErrorKind::InvalidArg,
            io::ErrorKind::InvalidData => ResourceErrorKind::InvalidData,
            io::ErrorKind::Unsupported => ResourceErrorKind::NotSupported,
            _ => ResourceErrorKind::Failed,
        };

        Self::with_source(kind, err.to_string(), Box::new(err))
    }
}

impl From<MimeError> for ResourceError {
    fn from(err: MimeError) -> Self {
        Self::with_source(ResourceErrorKind::InvalidArg, err.to_string(), Box::new(err))
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;
