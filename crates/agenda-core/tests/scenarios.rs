use agenda_core::analysis::{AnalysisResult, AnalysisState, Analyzer, Resolution, SubmitRejection};
use agenda_core::diagram::{node_size, DiagramView};
use agenda_core::error::{ApiError, ErrorKind, ParseErrorDescriptor};
use agenda_core::grammar::{validate, EMPTY_HINT};
use agenda_core::persistence::{self, ActionStore, Credential, SaveBlocked, SaveOutcome};
use agenda_core::{AnalysisCoordinator, AstNode, CommandForm};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Mutex;

/// Analyzer that records every call and answers with a canned result
struct FakeAnalyzer {
    calls: Mutex<Vec<String>>,
    reply: AnalysisResult,
}

impl FakeAnalyzer {
    fn new(reply: AnalysisResult) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    async fn analyze(
        &self,
        command: &str,
        _credential: Option<&Credential>,
    ) -> Result<AnalysisResult, ApiError> {
        self.calls.lock().unwrap().push(command.to_string());
        Ok(self.reply.clone())
    }
}

struct FakeStore {
    saved: Mutex<Vec<(String, String)>>,
    fail_with: Option<String>,
}

impl FakeStore {
    fn ok() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }
}

#[async_trait]
impl ActionStore for FakeStore {
    async fn create_action(&self, credential: &Credential, command: &str) -> Result<(), ApiError> {
        if let Some(message) = &self.fail_with {
            return Err(ApiError::status(500, message, ""));
        }
        self.saved
            .lock()
            .unwrap()
            .push((credential.as_str().to_string(), command.to_string()));
        Ok(())
    }
}

fn sample_ast() -> AstNode {
    AstNode::new("COMANDO").with_child(AstNode::new("VERBO").with_value("agendá"))
}

#[tokio::test]
async fn complete_command_is_analyzed_trimmed() {
    let text = "  agendá reunión con Juan el viernes a las 15:00 ";
    let validation = validate(text);
    assert!(validation.fields.all());
    assert!(validation.errors.is_empty());
    assert!(validation.can_submit());

    let analyzer = FakeAnalyzer::new(AnalysisResult::parsed(sample_ast()));
    let mut coordinator = AnalysisCoordinator::new();
    let state = coordinator
        .run(&analyzer, text, &validation, None)
        .await
        .unwrap();

    assert_eq!(state.ast(), Some(&sample_ast()));
    assert_eq!(
        analyzer.calls(),
        vec!["agendá reunión con Juan el viernes a las 15:00".to_string()]
    );
}

#[tokio::test]
async fn empty_command_never_calls_the_analyzer() {
    let validation = validate("");
    assert_eq!(validation.hint, EMPTY_HINT);
    assert!(!validation.can_submit());

    let analyzer = FakeAnalyzer::new(AnalysisResult::parsed(sample_ast()));
    let mut coordinator = AnalysisCoordinator::new();
    let result = coordinator.run(&analyzer, "", &validation, None).await;

    assert_eq!(result.err(), Some(SubmitRejection::Empty));
    assert_eq!(SubmitRejection::Empty.descriptor().kind, ErrorKind::EmptyCommand);
    assert!(analyzer.calls().is_empty());
}

#[tokio::test]
async fn invalid_command_never_calls_the_analyzer() {
    let text = "agendá reunión mañana a las 25:00";
    let analyzer = FakeAnalyzer::new(AnalysisResult::parsed(sample_ast()));
    let mut coordinator = AnalysisCoordinator::new();
    let result = coordinator.run(&analyzer, text, &validate(text), None).await;

    assert!(matches!(result, Err(SubmitRejection::Invalid(_))));
    assert!(analyzer.calls().is_empty());
}

#[tokio::test]
async fn reply_for_edited_text_is_discarded() {
    let analyzer = FakeAnalyzer::new(AnalysisResult::parsed(sample_ast()));
    let mut form = CommandForm::new();
    form.set_text("agendá reunión mañana a las 10:00");
    let first = form.submit().unwrap();
    let outcome = first.send(&analyzer, None).await;

    form.set_text("agendá reunión mañana a las 11:00");
    assert_eq!(form.resolve(first.request_id, outcome), Resolution::Stale);
    assert_eq!(form.analysis(), &AnalysisState::Idle);

    let second = form.submit().unwrap();
    let outcome = second.send(&analyzer, None).await;
    assert_eq!(form.resolve(second.request_id, outcome), Resolution::Applied);
    assert_eq!(form.analysis().analyzed_command(), Some("agendá reunión mañana a las 11:00"));
    assert_eq!(analyzer.calls().len(), 2);
}

#[tokio::test]
async fn syntax_error_reply_shows_message_and_no_tree() {
    let text = "recordame pagar la factura mañana";
    let reply = AnalysisResult::rejected(ParseErrorDescriptor::new(
        ErrorKind::SyntaxError,
        "Se esperaba una hora",
    ));
    let analyzer = FakeAnalyzer::new(reply);
    let mut coordinator = AnalysisCoordinator::new();
    let state = coordinator
        .run(&analyzer, text, &validate(text), None)
        .await
        .unwrap();

    assert!(state.ast().is_none());
    let error = state.error().unwrap();
    assert_eq!(error.kind, ErrorKind::SyntaxError);
    assert_eq!(error.message, "Se esperaba una hora");
}

#[test]
fn single_child_tree_renders_two_sized_boxes() {
    let ast = sample_ast();
    let view = DiagramView::new();
    let diagram = view.layout(&ast);

    let nodes = diagram.nodes();
    assert_eq!(nodes.len(), 2);
    assert_eq!((nodes[0].width, nodes[0].height), (120, 50));
    assert_eq!((nodes[1].width, nodes[1].height), (120, 80));
    assert_eq!(node_size(&ast.children[0]), (120, 80));
    assert_eq!(diagram.edges().collect::<Vec<_>>(), vec![(0, 1)]);
}

async fn analyzed_form() -> CommandForm {
    let mut form = CommandForm::new();
    form.load_example(0);
    let pending = form.submit().unwrap();
    let analyzer = FakeAnalyzer::new(AnalysisResult::parsed(sample_ast()));
    let outcome = analyzer.analyze(&pending.command, None).await;
    form.resolve(pending.request_id, outcome);
    form
}

#[tokio::test]
async fn save_without_credential_routes_to_login() {
    let mut form = analyzed_form().await;
    let store = FakeStore::ok();

    let result = persistence::save(&store, &mut form, None).await;
    assert_eq!(result, Err(SaveBlocked::NoCredential));
    assert!(store.saved.lock().unwrap().is_empty());
    assert!(form.analysis().ast().is_some());
}

#[tokio::test]
async fn save_success_clears_form_and_requests_refresh() {
    let mut form = analyzed_form().await;
    let command = form.text().to_string();
    let store = FakeStore::ok();
    let credential = Credential::new("token-123");

    let outcome = persistence::save(&store, &mut form, Some(&credential))
        .await
        .unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(form.text(), "");
    assert_eq!(form.analysis(), &AnalysisState::Idle);
    assert_eq!(
        *store.saved.lock().unwrap(),
        vec![("token-123".to_string(), command)]
    );
}

#[tokio::test]
async fn save_failure_keeps_command() {
    let mut form = analyzed_form().await;
    let command = form.text().to_string();
    let store = FakeStore {
        saved: Mutex::new(Vec::new()),
        fail_with: Some("Error al procesar el comando".to_string()),
    };

    let outcome = persistence::save(&store, &mut form, Some(&Credential::new("t")))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SaveOutcome::Failed { ref message, .. } if message == "Error al procesar el comando"
    ));
    assert_eq!(form.text(), command);
}
