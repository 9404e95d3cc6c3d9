use agenda_core::persistence::{self, SaveBlocked, SaveOutcome};
use agenda_core::{
    validate_login, Action, AgendaClient, AgendaListing, AnalysisResult, AnalysisState, ApiError,
    CommandForm, Config, Credential, DiagramView, RequestId, Resolution,
};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Command,
    Patterns,
    Agenda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message in the footer, gone after a few ticks
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    ticks_left: u8,
}

const NOTICE_TICKS: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    User,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub user_name: String,
    pub password: String,
    pub focus: LoginField,
    /// Creating an account instead of logging in
    pub register: bool,
    pub errors: Vec<String>,
    pub busy: bool,
    /// Retry the save once logged in
    pub resume_save: bool,
}

impl LoginForm {
    pub fn focused_input(&mut self) -> &mut String {
        match self.focus {
            LoginField::User => &mut self.user_name,
            LoginField::Password => &mut self.password,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Command screen
    pub form: CommandForm,
    pub cursor: usize, // char index into the command text
    pub diagram: DiagramView,

    // Agenda screen
    pub listing: AgendaListing,
    pub listing_state: ListState,
    pub event_count: usize,

    // Session
    pub config: Config,
    pub credential: Option<Credential>,
    pub client: AgendaClient,
    pub login: Option<LoginForm>,

    pub notice: Option<Notice>,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, events: UnboundedSender<AppEvent>) -> Self {
        let client = AgendaClient::new(&config.api_url());
        let credential = config.credential();
        let listing = AgendaListing::new(config.page_size);

        Self {
            should_quit: false,
            screen: Screen::Command,
            input_mode: InputMode::Editing,

            form: CommandForm::new(),
            cursor: 0,
            diagram: DiagramView::new(),

            listing,
            listing_state: ListState::default(),
            event_count: 0,

            config,
            credential,
            client,
            login: None,

            notice: None,
            animation_frame: 0,

            events,
        }
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
            ticks_left: NOTICE_TICKS,
        });
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
        if let Some(notice) = &mut self.notice {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.form.analysis().is_analyzing() || self.form.saving || self.listing.loading
    }

    // Command editing

    /// Replace the command text, keeping the cursor inside it
    pub fn set_command_text(&mut self, text: String) {
        let before = self.form.text().to_string();
        self.form.set_text(text);
        if self.form.text() != before {
            self.diagram = DiagramView::new();
        }
        self.cursor = self.cursor.min(self.form.text().chars().count());
    }

    pub fn load_next_example(&mut self) {
        let example = self.form.next_example();
        self.cursor = example.command.chars().count();
        self.diagram = DiagramView::new();
        self.notify(NoticeKind::Success, format!("Ejemplo: {}", example.description));
    }

    pub fn clear_command(&mut self) {
        self.form.clear();
        self.cursor = 0;
        self.diagram = DiagramView::new();
    }

    // Analysis

    pub fn submit_analysis(&mut self) {
        let pending = match self.form.submit() {
            Ok(pending) => pending,
            Err(rejection) => {
                self.notify(NoticeKind::Error, rejection.descriptor().message);
                return;
            }
        };

        let client = self.client.clone();
        let credential = self.credential.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = pending.send(&client, credential.as_ref()).await;
            let _ = tx.send(AppEvent::AnalysisFinished {
                request_id: pending.request_id,
                outcome,
            });
        });
    }

    pub fn on_analysis(
        &mut self,
        request_id: RequestId,
        outcome: Result<AnalysisResult, ApiError>,
    ) {
        if self.form.resolve(request_id, outcome) == Resolution::Stale {
            return;
        }
        match self.form.analysis() {
            AnalysisState::Success { .. } => self.diagram = DiagramView::new(),
            AnalysisState::Failed(error) => {
                let message = error.message.clone();
                self.notify(NoticeKind::Error, message);
            }
            _ => {}
        }
    }

    // Saving

    pub fn save_action(&mut self) {
        let request = match persistence::prepare_save(&mut self.form, self.credential.as_ref()) {
            Ok(request) => request,
            Err(SaveBlocked::NoCredential) => {
                self.notify(NoticeKind::Error, SaveBlocked::NoCredential.descriptor().message);
                self.open_login(true);
                return;
            }
            Err(blocked) => {
                self.notify(NoticeKind::Error, blocked.descriptor().message);
                return;
            }
        };

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = request.send(&client).await;
            let _ = tx.send(AppEvent::ActionSaved(result));
        });
    }

    pub fn on_action_saved(&mut self, result: Result<(), ApiError>) {
        match persistence::finish_save(&mut self.form, result) {
            SaveOutcome::Saved => {
                self.cursor = 0;
                self.diagram = DiagramView::new();
                self.notify(NoticeKind::Success, "Acción guardada en tu agenda");
                self.load_actions();
            }
            SaveOutcome::Failed {
                message,
                unauthorized,
            } => {
                self.notify(NoticeKind::Error, message);
                if unauthorized {
                    self.logout();
                    self.open_login(true);
                }
            }
        }
    }

    // Listing

    pub fn load_actions(&mut self) {
        let Some(credential) = self.credential.clone() else {
            return;
        };
        self.listing.loading = true;

        let client = self.client.clone();
        let tx = self.events.clone();
        let page = self.listing.page();
        let page_size = self.listing.page_size();
        tokio::spawn(async move {
            let result = client.list_actions(&credential, page, page_size).await;
            let _ = tx.send(AppEvent::ActionsLoaded { page, result });
        });
    }

    pub fn on_actions_loaded(&mut self, page: u32, result: Result<Vec<Action>, ApiError>) {
        match result {
            Ok(actions) => {
                self.event_count = self.listing.apply(page, actions);
                let selected = if self.event_count == 0 { None } else { Some(0) };
                self.listing_state.select(selected);
            }
            Err(err) => {
                self.listing.loading = false;
                self.notify(NoticeKind::Error, err.to_string());
                if err.is_unauthorized() {
                    self.logout();
                    self.open_login(false);
                }
            }
        }
    }

    pub fn selected_action(&self) -> Option<&Action> {
        self.listing_state
            .selected()
            .and_then(|i| self.listing.get(i))
    }

    pub fn next_page(&mut self) {
        if !self.listing.loading && self.listing.next_page() {
            self.load_actions();
        }
    }

    pub fn prev_page(&mut self) {
        if !self.listing.loading && self.listing.prev_page() {
            self.load_actions();
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(credential) = self.credential.clone() else {
            self.open_login(false);
            return;
        };
        let Some(id) = self.selected_action().map(|a| a.id) else {
            return;
        };

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.delete_action(&credential, id).await;
            let _ = tx.send(AppEvent::ActionDeleted(result));
        });
    }

    pub fn on_action_deleted(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.notify(NoticeKind::Success, "Acción eliminada correctamente");
                self.load_actions();
            }
            Err(err) => self.notify(NoticeKind::Error, err.to_string()),
        }
    }

    // Session

    pub fn open_login(&mut self, resume_save: bool) {
        self.login = Some(LoginForm {
            resume_save,
            ..LoginForm::default()
        });
    }

    pub fn submit_login(&mut self) {
        let Some(login) = &mut self.login else {
            return;
        };
        if login.busy {
            return;
        }
        login.errors = validate_login(&login.user_name, &login.password);
        if !login.errors.is_empty() {
            return;
        }
        login.busy = true;

        let client = self.client.clone();
        let tx = self.events.clone();
        let user_name = login.user_name.trim().to_string();
        let password = login.password.clone();
        let register = login.register;
        tokio::spawn(async move {
            let event = if register {
                AppEvent::Registered(client.register(&user_name, &password).await)
            } else {
                AppEvent::LoggedIn(client.login(&user_name, &password).await)
            };
            let _ = tx.send(event);
        });
    }

    pub fn on_logged_in(&mut self, result: Result<Credential, ApiError>) {
        match result {
            Ok(credential) => {
                let resume_save = self.login.take().is_some_and(|l| l.resume_save);
                self.config.set_token(Some(credential.as_str().to_string()));
                if let Err(err) = self.config.save() {
                    warn!(error = %err, "could not persist session token");
                }
                self.credential = Some(credential);
                info!("session started");
                self.notify(NoticeKind::Success, "Sesión iniciada");
                self.load_actions();
                if resume_save {
                    self.save_action();
                }
            }
            Err(err) => {
                if let Some(login) = &mut self.login {
                    login.busy = false;
                    login.errors = vec![err.to_string()];
                }
            }
        }
    }

    pub fn on_registered(&mut self, result: Result<(), ApiError>) {
        let Some(login) = &mut self.login else {
            return;
        };
        login.busy = false;
        match result {
            Ok(()) => {
                login.register = false;
                login.password.clear();
                login.focus = LoginField::Password;
                login.errors.clear();
                self.notify(NoticeKind::Success, "Usuario registrado, ahora iniciá sesión");
            }
            Err(err) => login.errors = vec![err.to_string()],
        }
    }

    pub fn logout(&mut self) {
        self.credential = None;
        self.config.set_token(None);
        if let Err(err) = self.config.save() {
            warn!(error = %err, "could not clear session token");
        }
        self.listing = AgendaListing::new(self.config.page_size);
        self.listing_state.select(None);
        self.event_count = 0;
        info!("session closed");
    }
}
