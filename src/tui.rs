use std::io::{self, Stderr};
use std::time::Duration;
use agenda_core::{Action, AnalysisResult, ApiError, Credential, RequestId};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Spinner and notice expiry rate
const TICK_RATE: Duration = Duration::from_millis(300);

/// Everything the main loop reacts to: terminal input, the tick timer and
/// the results of spawned network calls
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    AnalysisFinished {
        request_id: RequestId,
        outcome: Result<AnalysisResult, ApiError>,
    },
    ActionSaved(Result<(), ApiError>),
    ActionsLoaded {
        page: u32,
        result: Result<Vec<Action>, ApiError>,
    },
    ActionDeleted(Result<(), ApiError>),
    LoggedIn(Result<Credential, ApiError>),
    Registered(Result<(), ApiError>),
}

impl AppEvent {
    /// Terminal events worth handling; key releases and mouse input are dropped
    fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Single queue fed by the input reader, the ticker and network tasks
pub struct EventHandler {
    rx: UnboundedReceiver<AppEvent>,
    tx: UnboundedSender<AppEvent>,
    tasks: [JoinHandle<()>; 2],
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let input = tokio::spawn(read_input(tx.clone()));
        let ticker = tokio::spawn(tick(tx.clone()));

        Self {
            rx,
            tx,
            tasks: [input, ticker],
        }
    }

    /// Sender for network tasks to report back on
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn read_input(tx: UnboundedSender<AppEvent>) {
    let mut reader = EventStream::new();
    while let Some(event) = reader.next().await {
        let Some(event) = event.ok().and_then(AppEvent::from_terminal) else {
            continue;
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

async fn tick(tx: UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_RATE);
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stderr))?)
}

pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stderr(), LeaveAlternateScreen)?;
    Ok(())
}

/// Put the terminal back before the default hook prints the panic
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        default_hook(info);
    }));
}
