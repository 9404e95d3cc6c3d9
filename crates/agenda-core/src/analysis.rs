//! Lifecycle of a remote analyze call.
//!
//! The coordinator hands out a monotonic request id for every submission and
//! only accepts the response carrying the latest id. Anything older is dropped.

use crate::ast::AstNode;
use crate::error::{ApiError, ErrorKind, ParseErrorDescriptor};
use crate::grammar::ValidationState;
use crate::persistence::Credential;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const MISSING_AST_ERROR: &str = "El servidor no devolvió un árbol sintáctico";
const UNKNOWN_FAILURE_ERROR: &str = "El comando no pudo ser analizado";

/// Body of a `POST /analyze` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<AstNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseErrorDescriptor>,
}

impl AnalysisResult {
    pub fn parsed(ast: AstNode) -> Self {
        Self {
            success: true,
            ast: Some(ast),
            error: None,
        }
    }

    pub fn rejected(error: ParseErrorDescriptor) -> Self {
        Self {
            success: false,
            ast: None,
            error: Some(error),
        }
    }
}

/// Remote parser for agenda commands
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        command: &str,
        credential: Option<&Credential>,
    ) -> Result<AnalysisResult, ApiError>;
}

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing {
        request_id: RequestId,
        command: String,
    },
    Success {
        command: String,
        ast: AstNode,
    },
    Failed(ParseErrorDescriptor),
}

impl AnalysisState {
    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisState::Analyzing { .. })
    }

    pub fn ast(&self) -> Option<&AstNode> {
        match self {
            AnalysisState::Success { ast, .. } => Some(ast),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ParseErrorDescriptor> {
        match self {
            AnalysisState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// The command an AST was produced for
    pub fn analyzed_command(&self) -> Option<&str> {
        match self {
            AnalysisState::Success { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// A request that was started and must be resolved with its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    pub request_id: RequestId,
    pub command: String,
}

impl PendingAnalysis {
    /// Ask `analyzer` about the command; the reply goes to `resolve` with
    /// this request's id
    pub async fn send<A: Analyzer + ?Sized>(
        &self,
        analyzer: &A,
        credential: Option<&Credential>,
    ) -> Result<AnalysisResult, ApiError> {
        analyzer.analyze(&self.command, credential).await
    }
}

/// Why a submission did not start a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    Empty,
    Invalid(Vec<String>),
    InFlight,
}

impl SubmitRejection {
    pub fn descriptor(&self) -> ParseErrorDescriptor {
        match self {
            SubmitRejection::Empty => ParseErrorDescriptor::empty_command(),
            SubmitRejection::Invalid(errors) => {
                ParseErrorDescriptor::new(ErrorKind::ValidationError, errors.join("; "))
            }
            SubmitRejection::InFlight => ParseErrorDescriptor::new(
                ErrorKind::ValidationError,
                "Ya hay un análisis en curso",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct AnalysisCoordinator {
    state: AnalysisState,
    next_id: RequestId,
    latest: Option<RequestId>,
}

impl AnalysisCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Start a request for `text` if the validation allows it
    pub fn begin(
        &mut self,
        text: &str,
        validation: &ValidationState,
    ) -> Result<PendingAnalysis, SubmitRejection> {
        let command = text.trim();
        if command.is_empty() {
            return Err(SubmitRejection::Empty);
        }
        if !validation.errors.is_empty() {
            return Err(SubmitRejection::Invalid(validation.errors.clone()));
        }
        if self.state.is_analyzing() {
            return Err(SubmitRejection::InFlight);
        }

        self.next_id += 1;
        let request_id = self.next_id;
        self.latest = Some(request_id);
        self.state = AnalysisState::Analyzing {
            request_id,
            command: command.to_string(),
        };
        debug!(request_id, command, "analysis started");

        Ok(PendingAnalysis {
            request_id,
            command: command.to_string(),
        })
    }

    /// Apply the outcome of request `request_id`, unless a newer request or a
    /// reset superseded it
    pub fn resolve(
        &mut self,
        request_id: RequestId,
        outcome: Result<AnalysisResult, ApiError>,
    ) -> Resolution {
        let command = match &self.state {
            AnalysisState::Analyzing {
                request_id: current,
                command,
            } if self.latest == Some(request_id) && *current == request_id => command.clone(),
            _ => {
                debug!(request_id, latest = ?self.latest, "discarding stale analysis response");
                return Resolution::Stale;
            }
        };

        self.state = match outcome {
            Ok(AnalysisResult {
                success: true,
                ast: Some(ast),
                ..
            }) => {
                info!(request_id, nodes = ast.node_count(), "analysis succeeded");
                AnalysisState::Success { command, ast }
            }
            Ok(AnalysisResult {
                success: true,
                ast: None,
                ..
            }) => {
                warn!(request_id, "analysis succeeded without an AST");
                AnalysisState::Failed(ParseErrorDescriptor::new(
                    ErrorKind::NetworkError,
                    MISSING_AST_ERROR,
                ))
            }
            Ok(AnalysisResult { error, .. }) => {
                let error = error.unwrap_or_else(|| {
                    ParseErrorDescriptor::new(ErrorKind::SyntaxError, UNKNOWN_FAILURE_ERROR)
                });
                info!(request_id, kind = error.kind.as_str(), "analysis rejected");
                AnalysisState::Failed(error)
            }
            Err(err) => {
                warn!(request_id, error = %err, "analysis request failed");
                AnalysisState::Failed(err.to_descriptor())
            }
        };
        Resolution::Applied
    }

    /// Back to idle; any response still in flight becomes stale
    pub fn reset(&mut self) {
        self.state = AnalysisState::Idle;
        self.latest = None;
    }

    /// Begin, call the analyzer and resolve in one go
    pub async fn run<A: Analyzer + ?Sized>(
        &mut self,
        analyzer: &A,
        text: &str,
        validation: &ValidationState,
        credential: Option<&Credential>,
    ) -> Result<&AnalysisState, SubmitRejection> {
        let pending = self.begin(text, validation)?;
        let outcome = pending.send(analyzer, credential).await;
        self.resolve(pending.request_id, outcome);
        Ok(&self.state)
    }
}
