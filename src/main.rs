use agenda_core::grammar::Field;
use agenda_core::{validate, AgendaClient, Config, ValidationState};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tree_view;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const LOG_ENV: &str = "AGENDA_LOG";

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Write agenda commands in Spanish with live grammar hints")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a command locally and show what is missing
    Check {
        /// The command, e.g. "agendá reunión mañana a las 10:00"
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Validate a command and send it to the analyzer
    Analyze {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging failures never stop the program
    if let Err(err) = init_logging() {
        eprintln!("{}: {}", "Logging disabled".yellow(), err);
    }

    let config = Config::load().unwrap_or_default();

    match cli.command {
        None => run_tui(config).await,
        Some(Commands::Check { command }) => {
            check_command(&command.join(" "));
            Ok(())
        }
        Some(Commands::Analyze { command }) => analyze_command(&config, &command.join(" ")).await,
    }
}

/// Log to `<cache_dir>/agenda/agenda.log`; the terminal belongs to the UI
fn init_logging() -> Result<()> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?
        .join("agenda");
    fs::create_dir_all(&dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("agenda.log"))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))?;
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(config, events.sender());
    tracing::info!(api_url = app.client.base_url(), "agenda started");

    if app.credential.is_some() {
        app.load_actions();
    }

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn print_validation(state: &ValidationState) {
    for field in [Field::Verb, Field::Description, Field::Date, Field::Time] {
        if state.fields.get(field) {
            println!("  {} {}", "✓".green(), field.label());
        } else {
            println!("  {} {}", "·".dimmed(), field.label().dimmed());
        }
    }

    if !state.hint.is_empty() {
        println!("\n{}", state.hint.cyan());
    }

    for error in &state.errors {
        println!("{} {}", "✗".red(), error.red());
    }
}

fn check_command(command: &str) {
    let state = validate(command);
    println!("\n{}", command.bold());
    print_validation(&state);

    if state.can_submit() {
        println!("\n{}", "Listo para analizar".bold().green());
    }
}

async fn analyze_command(config: &Config, command: &str) -> Result<()> {
    let state = validate(command);
    if !state.can_submit() {
        println!("\n{}", command.bold());
        print_validation(&state);
        return Err(anyhow!("El comando no es válido"));
    }

    let client = AgendaClient::new(&config.api_url());
    println!("🔍 Analizando: {}", command.trim().cyan());

    let credential = config.credential();
    let result = client.analyze_command(command.trim(), credential.as_ref()).await;

    match result {
        Ok(analysis) => match (analysis.ast, analysis.error) {
            (Some(ast), _) if analysis.success => {
                println!("\n{}", "Árbol sintáctico:".bold().green());
                print!("{}", ast.outline());
            }
            (_, Some(error)) => {
                println!("{} {}", error.kind.as_str().bold().red(), error.message);
            }
            _ => println!("{}", "El servidor no devolvió un árbol sintáctico".red()),
        },
        Err(err) => {
            println!("{}: {}", "Error al analizar".red(), err);
            println!("Servidor: {}", client.base_url().bold());
        }
    }

    Ok(())
}
