pub mod actions;
pub mod analysis;
pub mod api;
pub mod ast;
pub mod auth;
pub mod config;
pub mod diagram;
pub mod error;
pub mod form;
pub mod grammar;
pub mod persistence;

// Re-export main types for convenience
pub use actions::{format_date, Action, AgendaListing};
pub use analysis::{
    AnalysisCoordinator, AnalysisResult, AnalysisState, Analyzer, PendingAnalysis, RequestId,
    Resolution, SubmitRejection,
};
pub use api::AgendaClient;
pub use ast::{AstNode, Category, NodeValue};
pub use auth::validate_login;
pub use config::Config;
pub use diagram::{Diagram, DiagramView, NodeStyle, PlacedNode, Tone};
pub use error::{ApiError, ErrorKind, ParseErrorDescriptor};
pub use form::{CommandForm, Example, EXAMPLES};
pub use grammar::{validate, ValidationState};
pub use persistence::{ActionStore, Credential, SaveBlocked, SaveOutcome, SaveRequest};
