//! Error type shared by the engine and the CLI.
//!
//! Every failure carries a kind (so library callers can branch on it), the
//! process exit code the binary should use, and a human-readable message.

/// What went wrong, at the granularity callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An input lies outside its documented domain. Raised before any work.
    InvalidDesign,
    /// The optimizer failed to produce a finite parameter pair.
    FitDivergence,
    /// Reading or writing a design/run/export file failed.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidDesign => 2,
            ErrorKind::Io => 3,
            ErrorKind::FitDivergence => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_design(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDesign, message)
    }

    pub fn fit_divergence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FitDivergence, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
