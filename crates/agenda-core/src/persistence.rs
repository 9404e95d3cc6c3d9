//! Saving an analyzed command as an agenda action.
//!
//! The credential is always handed in by the caller. When there is none the
//! save is refused with `SaveBlocked::NoCredential` so the caller can route
//! the user to the login form.

use crate::error::{ApiError, ErrorKind, ParseErrorDescriptor};
use crate::form::CommandForm;
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

/// Bearer token for the agenda backend
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// `None` for a missing or blank token
    pub fn from_optional(token: Option<&str>) -> Option<Self> {
        token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Credential::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[async_trait]
pub trait ActionStore: Send + Sync {
    async fn create_action(&self, credential: &Credential, command: &str) -> Result<(), ApiError>;
}

/// Reasons a save never reaches the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlocked {
    NoCredential,
    /// No successful analysis for the current text
    NotAnalyzed,
    InFlight,
}

impl SaveBlocked {
    pub fn descriptor(&self) -> ParseErrorDescriptor {
        match self {
            SaveBlocked::NoCredential => ParseErrorDescriptor::new(
                ErrorKind::AuthMissing,
                "Iniciá sesión para guardar en tu agenda",
            ),
            SaveBlocked::NotAnalyzed => ParseErrorDescriptor::new(
                ErrorKind::ValidationError,
                "Analizá el comando antes de guardarlo",
            ),
            SaveBlocked::InFlight => {
                ParseErrorDescriptor::new(ErrorKind::ValidationError, "Ya se está guardando")
            }
        }
    }
}

/// A save that passed the local checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub command: String,
    pub credential: Credential,
}

impl SaveRequest {
    /// The answer goes back through `finish_save`
    pub async fn send<S: ActionStore + ?Sized>(&self, store: &S) -> Result<(), ApiError> {
        store.create_action(&self.credential, &self.command).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The listing should be reloaded
    Saved,
    Failed { message: String, unauthorized: bool },
}

/// Check that `form` holds an analyzed command and mark it as saving
pub fn prepare_save(
    form: &mut CommandForm,
    credential: Option<&Credential>,
) -> Result<SaveRequest, SaveBlocked> {
    if form.saving {
        return Err(SaveBlocked::InFlight);
    }
    let command = form
        .analysis()
        .analyzed_command()
        .ok_or(SaveBlocked::NotAnalyzed)?
        .to_string();
    let credential = credential.cloned().ok_or(SaveBlocked::NoCredential)?;

    form.saving = true;
    Ok(SaveRequest {
        command,
        credential,
    })
}

/// Apply the backend's answer to the form
pub fn finish_save(form: &mut CommandForm, result: Result<(), ApiError>) -> SaveOutcome {
    form.saving = false;
    match result {
        Ok(()) => {
            info!("action saved");
            form.clear();
            SaveOutcome::Saved
        }
        Err(err) => {
            warn!(error = %err, "saving action failed");
            SaveOutcome::Failed {
                unauthorized: err.is_unauthorized(),
                message: err.to_string(),
            }
        }
    }
}

pub async fn save<S: ActionStore + ?Sized>(
    store: &S,
    form: &mut CommandForm,
    credential: Option<&Credential>,
) -> Result<SaveOutcome, SaveBlocked> {
    let request = prepare_save(form, credential)?;
    let result = request.send(store).await;
    Ok(finish_save(form, result))
}
