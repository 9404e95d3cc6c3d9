use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Nothing to analyze
    EmptyCommand,
    /// Local grammar/field violations, never sent over the network
    ValidationError,
    /// Transport failure or a non-2xx response without a structured body
    NetworkError,
    /// The analyzer reported the command could not be parsed
    SyntaxError,
    /// No credential when one is required
    AuthMissing,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyCommand => "EMPTY_COMMAND",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::SyntaxError => "SYNTAX_ERROR",
            ErrorKind::AuthMissing => "AUTH_MISSING",
        }
    }
}

impl From<String> for ErrorKind {
    /// Unknown tags come from the analyzer, so they are treated as syntax errors
    fn from(tag: String) -> Self {
        match tag.to_uppercase().as_str() {
            "EMPTY_COMMAND" => ErrorKind::EmptyCommand,
            "VALIDATION_ERROR" => ErrorKind::ValidationError,
            "NETWORK_ERROR" => ErrorKind::NetworkError,
            "AUTH_MISSING" => ErrorKind::AuthMissing,
            _ => ErrorKind::SyntaxError,
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ErrorKind::from)
    }
}

/// `{type, message, position}` as exchanged with the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseErrorDescriptor {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub position: usize,
}

impl ParseErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: 0,
        }
    }

    pub fn empty_command() -> Self {
        Self::new(ErrorKind::EmptyCommand, "No se proporcionó ningún comando")
    }
}

/// Failures talking to the agenda backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error de conexión: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Sesión inválida o expirada")]
    Unauthorized,

    /// Non-2xx response. `message` is the body text, or a default for the status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Respuesta inválida del servidor: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(status: u16, body: &str, fallback: &str) -> Self {
        let message = body.trim();
        ApiError::Status {
            status,
            message: if message.is_empty() {
                fallback.to_string()
            } else {
                message.to_string()
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
            || matches!(self, ApiError::Status { status: 401, .. })
    }

    /// Descriptor for a failed analyze call that carried no structured error
    pub fn to_descriptor(&self) -> ParseErrorDescriptor {
        ParseErrorDescriptor::new(ErrorKind::NetworkError, self.to_string())
    }
}
