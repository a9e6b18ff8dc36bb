use core::fmt;

/// The seven error kinds of the store's error taxonomy.
///
/// Internal callers match on this enum directly; the HTTP boundary is the
/// only place that projects it onto a status code via [`EntityStoreError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityStoreError {
    NotFound { detail: String },
    Gone,
    Forbidden { reason: String },
    Conflict { detail: String },
    LockedLike { reason: String },
    BadRequest { detail: String },
    IoError { detail: String },
    InvalidReference { detail: String },
}

impl EntityStoreError {
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn locked_like(reason: impl Into<String>) -> Self {
        Self::LockedLike {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn io_error(detail: impl Into<String>) -> Self {
        Self::IoError {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn invalid_reference(detail: impl Into<String>) -> Self {
        Self::InvalidReference {
            detail: detail.into(),
        }
    }

    /// The HTTP status code this error kind maps to. Only the REST layer
    /// should call this; everywhere else should match on the enum.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Gone => 410,
            Self::Forbidden { .. } => 403,
            Self::Conflict { .. } => 409,
            Self::LockedLike { .. } => 423,
            Self::BadRequest { .. } => 400,
            Self::IoError { .. } => 503,
            Self::InvalidReference { .. } => 500,
        }
    }
}

impl fmt::Display for EntityStoreError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { detail } => write!(fmt, "not found: {detail}"),
            Self::Gone => write!(fmt, "entity has been permanently deleted"),
            Self::Forbidden { reason } => write!(fmt, "forbidden: {reason}"),
            Self::Conflict { detail } => write!(fmt, "conflict: {detail}"),
            Self::LockedLike { reason } => write!(fmt, "locked: {reason}"),
            Self::BadRequest { detail } => write!(fmt, "bad request: {detail}"),
            Self::IoError { detail } => write!(fmt, "io error: {detail}"),
            Self::InvalidReference { detail } => write!(fmt, "invalid reference: {detail}"),
        }
    }
}

impl error_stack::Context for EntityStoreError {}

/// Marker [`error_stack::Context`] for failures inside the ID Registry.
#[derive(Debug)]
pub struct RegistryError;

impl fmt::Display for RegistryError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("the ID registry encountered an error")
    }
}

impl error_stack::Context for RegistryError {}

/// Marker [`error_stack::Context`] for failures inside the blob store.
#[derive(Debug)]
pub struct BlobStoreError;

impl fmt::Display for BlobStoreError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("the blob store encountered an error")
    }
}

impl error_stack::Context for BlobStoreError {}

/// Marker [`error_stack::Context`] for failures inside the metadata index.
#[derive(Debug)]
pub struct MetadataIndexError;

impl fmt::Display for MetadataIndexError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("the metadata index encountered an error")
    }
}

impl error_stack::Context for MetadataIndexError {}

/// Marker [`error_stack::Context`] for failures inside the revision pipeline.
#[derive(Debug)]
pub struct PipelineError;

impl fmt::Display for PipelineError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("the revision pipeline failed to process a write")
    }
}

impl error_stack::Context for PipelineError {}

/// Marker [`error_stack::Context`] for failures inside the Turtle serializer.
#[derive(Debug)]
pub struct SerializerError;

impl fmt::Display for SerializerError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("the RDF serializer failed to render an entity")
    }
}

impl error_stack::Context for SerializerError {}
