use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn encoding(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Encoding {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn trie_consistency(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::TrieConsistency {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn reconciliation(expected: usize, actual: usize) -> Error {
        Error(ErrorKind::Reconciliation { expected, actual }.into())
    }

    pub fn storage<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Storage {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn cancelled(operation: impl Into<String>) -> Error {
        Error(
            ErrorKind::Cancelled {
                operation: operation.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid encoding for '{element}': {message}")]
    Encoding { element: String, message: String },

    #[error("trie consistency violation: {message}")]
    TrieConsistency { message: String },

    #[error("reconciliation failed: expected {expected} rows, resolved {actual}")]
    Reconciliation { expected: usize, actual: usize },

    #[error("storage error in '{context}': {source}")]
    Storage {
        context: String,
        source: StdErrorBoxed,
    },

    #[error("operation '{operation}' cancelled")]
    Cancelled { operation: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
