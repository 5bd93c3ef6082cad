use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for docstash operations.
///
/// The first four kinds are the stable identities every collection and iterator
/// reports; callers branch on them through [`StoreError::kind`]. The remaining kinds
/// describe failures that come from marshalers or storage backends.
///
/// # Examples
///
/// ```rust
/// use docstash::errors::{ErrorKind, StoreError, StoreResult};
///
/// fn lookup() -> StoreResult<()> {
///     Err(StoreError::new("document 'ben' not found", ErrorKind::NotFound))
/// }
///
/// assert_eq!(lookup().unwrap_err().kind(), &ErrorKind::NotFound);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The collection has not been opened, or has been closed
    Closed,
    /// The key is not valid for writing
    InvalidKey,
    /// The requested document does not exist
    NotFound,
    /// The iterator has been released
    Released,

    /// Error encoding or decoding a document
    EncodingError,
    /// Error reported by a storage backend
    BackendError,
    /// Generic IO error
    IOError,
    /// The operation is not valid in the current context
    InvalidOperation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Closed => write!(f, "Collection is closed"),
            ErrorKind::InvalidKey => write!(f, "Invalid key"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::Released => write!(f, "Iterator has been released"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
        }
    }
}

/// Custom docstash error type.
///
/// `StoreError` carries a message, an [`ErrorKind`], an optional cause and the
/// backtrace captured where the error was created.
///
/// # Examples
///
/// ```rust
/// use docstash::errors::{ErrorKind, StoreError};
///
/// let cause = StoreError::new("disk unplugged", ErrorKind::IOError);
/// let err = StoreError::new_with_cause("reload failed", ErrorKind::BackendError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct StoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StoreError>>,
    backtrace: Arc<Backtrace>,
}

impl StoreError {
    /// Creates a new `StoreError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `StoreError` that keeps `cause` as its source.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StoreError) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StoreError> {
        self.cause.as_deref()
    }

    pub fn closed() -> Self {
        StoreError::new("collection is closed", ErrorKind::Closed)
    }

    pub fn released() -> Self {
        StoreError::new("iterator has been released", ErrorKind::Released)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for docstash operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::IOError,
        };
        StoreError::new(&format!("IO error: {}", err), error_kind)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}
