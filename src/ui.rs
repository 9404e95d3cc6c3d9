use agenda_core::grammar::patterns::{PatternRow, COMMAND_PATTERNS, DATE_PATTERNS, TIME_PATTERNS};
use agenda_core::grammar::validator::MAX_LENGTH;
use agenda_core::grammar::Field;
use agenda_core::{AnalysisState, ErrorKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, InputMode, LoginField, NoticeKind, Screen};
use crate::tree_view::TreeView;

const FIELDS: [Field; 4] = [Field::Verb, Field::Description, Field::Date, Field::Time];

const SYNTAX_SUGGESTIONS: [&str; 4] = [
    "Verificá que el verbo sea agendá, anotá o recordame",
    "Incluí una descripción después del verbo",
    "Para fechas usá hoy, mañana, un día de la semana o \"15 de marzo 2024\"",
    "Para horas usá \"a las 15:30\" (formato 24h)",
];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Command => render_command_screen(app, frame, body_area),
        Screen::Patterns => render_patterns_screen(frame, body_area),
        Screen::Agenda => render_agenda_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.login.is_some() {
        render_login(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tab = |screen: Screen, label: &'static str| {
        if app.screen == screen {
            Span::styled(label, Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    };

    let session = match &app.credential {
        Some(_) => format!(" [{} en agenda]", app.event_count),
        None => " [sin sesión]".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" Agenda ", Style::default().fg(Color::Cyan).bold()),
        tab(Screen::Command, " 1 Comando "),
        tab(Screen::Patterns, " 2 Patrones "),
        tab(Screen::Agenda, " 3 Agenda "),
        Span::styled(session, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    // A pending notice replaces the key hints
    if let Some(notice) = &app.notice {
        let style = match notice.kind {
            NoticeKind::Success => Style::default().bg(Color::Green).fg(Color::Black),
            NoticeKind::Error => Style::default().bg(Color::Red).fg(Color::White),
        };
        let footer = Paragraph::new(format!(" {} ", notice.message)).style(style);
        frame.render_widget(footer, area);
        return;
    }

    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Editing if app.screen == Screen::Command => (
            " EDITAR ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        _ => (" NAVEGAR ", Style::default().bg(Color::Blue).fg(Color::White)),
    };

    let pairs: &[(&str, &str)] = if app.login.is_some() {
        &[
            (" Tab ", " campo "),
            (" Enter ", " enviar "),
            (" ^R ", " registro "),
            (" Esc ", " cerrar "),
        ]
    } else {
        match (app.screen, app.input_mode) {
            (Screen::Command, InputMode::Editing) => &[
                (" Enter ", " analizar "),
                (" ^E ", " ejemplo "),
                (" ^U ", " borrar "),
                (" Esc ", " dejar de escribir "),
            ],
            (Screen::Command, InputMode::Normal) => &[
                (" i ", " escribir "),
                (" Enter ", " analizar "),
                (" s ", " guardar "),
                (" e ", " ejemplo "),
                (" j/k ", " nodo "),
                (" Space ", " plegar "),
                (" HJKL ", " mover "),
                (" +/- ", " zoom "),
                (" 0 ", " centrar "),
                (" Tab ", " pantalla "),
                (" q ", " salir "),
            ],
            (Screen::Patterns, _) => &[
                (" Tab ", " pantalla "),
                (" Esc ", " volver "),
                (" q ", " salir "),
            ],
            (Screen::Agenda, _) => &[
                (" j/k ", " mover "),
                (" p/n ", " página "),
                (" d ", " eliminar "),
                (" r ", " recargar "),
                (" l ", " sesión "),
                (" Tab ", " pantalla "),
                (" q ", " salir "),
            ],
        }
    };

    let hints = pairs.iter().flat_map(|(key, label)| {
        [Span::styled(*key, key_style), Span::styled(*label, label_style)]
    });

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_command_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let errors = app.form.validation().errors.len() as u16;
    let [input_area, status_area, errors_area, analysis_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Length(errors),
        Constraint::Min(0),
    ])
    .areas(area);

    render_command_input(app, frame, input_area);
    render_validation(app, frame, status_area, errors_area);
    render_analysis(app, frame, analysis_area);
}

fn render_command_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing && app.login.is_none();
    let border = if editing { Color::Yellow } else { Color::DarkGray };
    let count = app.form.text().chars().count();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Comando ")
        .title_bottom(Line::from(format!(" {}/{} ", count, MAX_LENGTH)).right_aligned());

    let input = if app.form.text().is_empty() && !editing {
        Paragraph::new("Presioná i para escribir, e para cargar un ejemplo")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(app.form.text())
    };

    let inner = block.inner(area);
    let scroll = input_scroll(app.cursor, inner.width);
    frame.render_widget(input.block(block).scroll((0, scroll)), area);

    if editing {
        let cursor_x = (app.cursor - scroll as usize) as u16;
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

/// First visible column of the input, keeping the cursor on screen
fn input_scroll(cursor: usize, width: u16) -> u16 {
    let last_column = width.saturating_sub(1) as usize;
    cursor.saturating_sub(last_column) as u16
}

fn render_validation(app: &App, frame: &mut Frame, status_area: Rect, errors_area: Rect) {
    let validation = app.form.validation();

    let mut fields = vec![Span::raw(" ")];
    for field in FIELDS {
        let (mark, style) = if validation.fields.get(field) {
            ("✓ ", Style::default().fg(Color::Green))
        } else {
            ("· ", Style::default().fg(Color::DarkGray))
        };
        fields.push(Span::styled(format!("{}{}  ", mark, field.label()), style));
    }

    let hint = if validation.hint.is_empty() {
        Line::from(Span::styled(
            " Comando completo",
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            format!(" {}", validation.hint),
            Style::default().fg(Color::Cyan),
        ))
    };
    frame.render_widget(Paragraph::new(vec![Line::from(fields), hint]), status_area);

    let errors: Vec<Line> = validation
        .errors
        .iter()
        .map(|e| Line::from(Span::styled(format!(" ✗ {}", e), Style::default().fg(Color::Red))))
        .collect();
    frame.render_widget(Paragraph::new(errors), errors_area);
}

fn render_analysis(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Árbol sintáctico ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.form.analysis() {
        AnalysisState::Idle => {
            let text = if app.form.can_submit() {
                "Presioná Enter para analizar el comando"
            } else {
                "Completá un comando válido para analizarlo"
            };
            let idle = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(idle, inner);
        }
        AnalysisState::Analyzing { .. } => {
            let dots = ".".repeat(app.animation_frame as usize + 1);
            let analyzing = Paragraph::new(format!("Analizando{}", dots))
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(analyzing, inner);
        }
        AnalysisState::Failed(error) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    error.kind.as_str(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(error.message.as_str()),
            ];
            if error.kind == ErrorKind::SyntaxError {
                lines.push(Line::default());
                lines.push(Line::from("Sugerencias:".bold()));
                let tip_style = Style::default().fg(Color::Gray);
                lines.extend(
                    SYNTAX_SUGGESTIONS
                        .iter()
                        .map(|tip| Line::from(Span::styled(format!(" • {}", tip), tip_style))),
                );
            }
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        }
        AnalysisState::Success { ast, .. } => {
            let diagram = app.diagram.layout(ast);
            let [tree_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
            frame.render_widget(TreeView::new(&diagram, &app.diagram), tree_area);

            let status = format!(
                " {} nodos · zoom {:.0}% · s para guardar",
                diagram.nodes().len(),
                app.diagram.zoom() * 100.0
            );
            frame.render_widget(
                Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
                status_area,
            );
        }
    }
}

fn pattern_items(rows: &[PatternRow]) -> Vec<ListItem<'static>> {
    rows.iter()
        .map(|row| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:<14}", row.kind),
                        Style::default().fg(Color::Cyan).bold(),
                    ),
                    Span::raw(row.pattern),
                ]),
                Line::from(Span::styled(
                    format!("{:<14}{}", "", row.example),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect()
}

fn render_patterns_screen(frame: &mut Frame, area: Rect) {
    let [commands_area, dates_area, times_area] = Layout::vertical([
        Constraint::Length(COMMAND_PATTERNS.len() as u16 * 2 + 2),
        Constraint::Length(DATE_PATTERNS.len() as u16 * 2 + 2),
        Constraint::Min(0),
    ])
    .areas(area);

    let sections: [(&str, &[PatternRow], Rect); 3] = [
        (" Comandos ", &COMMAND_PATTERNS, commands_area),
        (" Fechas ", &DATE_PATTERNS, dates_area),
        (" Horas ", &TIME_PATTERNS, times_area),
    ];
    for (title, rows, rect) in sections {
        let list = List::new(pattern_items(rows)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        );
        frame.render_widget(list, rect);
    }
}

fn render_agenda_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, pager_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Mis eventos y recordatorios ");

    if app.credential.is_none() {
        let message = Paragraph::new("Iniciá sesión para ver tu agenda (l)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(message, list_area);
        return;
    }

    if app.listing.loading {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        frame.render_widget(Paragraph::new(format!("Cargando{}", dots)).block(block), list_area);
    } else if app.listing.actions().is_empty() {
        let empty = Paragraph::new("No hay acciones en tu agenda")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, list_area);
    } else {
        let items: Vec<ListItem> = app
            .listing
            .actions()
            .iter()
            .map(|action| {
                let badge_color = if action.kind_label() == "Evento" {
                    Color::Blue
                } else {
                    Color::Magenta
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            format!(" {} ", action.kind_label()),
                            Style::default().fg(Color::Black).bg(badge_color),
                        ),
                        Span::raw(" "),
                        Span::styled(action.description.clone(), Style::default().bold()),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", action.display_date()),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut app.listing_state);
    }

    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);
    let pager = Line::from(vec![
        Span::styled(
            " ← Anterior ",
            if app.listing.has_prev() { enabled } else { disabled },
        ),
        Span::raw(format!(" Página {} ", app.listing.page())),
        Span::styled(
            " Siguiente → ",
            if app.listing.has_next() { enabled } else { disabled },
        ),
    ]);
    frame.render_widget(Paragraph::new(pager).centered(), pager_area);
}

/// A `width` x `height` rectangle in the middle of `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_login(app: &App, frame: &mut Frame, area: Rect) {
    let Some(login) = &app.login else {
        return;
    };

    let popup_area = centered(area, 50, 9 + login.errors.len() as u16);
    frame.render_widget(Clear, popup_area);

    let title = if login.register { " Registrarse " } else { " Iniciar sesión " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let field_style = |field: LoginField| {
        if login.focus == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        }
    };

    let mut lines = vec![
        Line::from(Span::styled("Usuario", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(login.user_name.clone(), field_style(LoginField::User))),
        Line::from(Span::styled("Contraseña", Style::default().fg(Color::DarkGray))),
        // Mask the password
        Line::from(Span::styled(
            "*".repeat(login.password.chars().count()),
            field_style(LoginField::Password),
        )),
        Line::default(),
    ];
    for error in &login.errors {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }
    if login.busy {
        lines.push(Line::from(Span::styled("Enviando...", Style::default().fg(Color::Yellow))));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    let (row, len) = match login.focus {
        LoginField::User => (1, login.user_name.chars().count()),
        LoginField::Password => (3, login.password.chars().count()),
    };
    let cursor_x = len.min(inner.width.saturating_sub(1) as usize) as u16;
    frame.set_cursor_position((inner.x + cursor_x, inner.y + row));
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::{AnalysisResult, Config, ParseErrorDescriptor};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Config::default(), tx)
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer.cell((x, y)).map_or(" ", |cell| cell.symbol()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn reject(app: &mut App, kind: ErrorKind, message: &str) {
        app.set_command_text("agendá reunión mañana a las 10:00".to_string());
        let pending = app.form.submit().unwrap();
        let reply = AnalysisResult::rejected(ParseErrorDescriptor::new(kind, message));
        app.form.resolve(pending.request_id, Ok(reply));
    }

    #[test]
    fn test_every_validation_error_is_shown() {
        let mut app = test_app();
        let text = format!("agendá reunión #1 12 de foo a las 25:00 {}", "palabra ".repeat(25));
        app.set_command_text(text);
        let errors = app.form.validation().errors.clone();
        assert_eq!(errors.len(), 5);

        let screen = draw(&mut app, 120, 40);
        for error in &errors {
            assert!(screen.contains(error.as_str()), "missing {:?}", error);
        }
    }

    #[test]
    fn test_syntax_error_lists_suggestions() {
        let mut app = test_app();
        reject(&mut app, ErrorKind::SyntaxError, "Se esperaba una hora");

        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("SYNTAX_ERROR"));
        assert!(screen.contains("Se esperaba una hora"));
        assert!(screen.contains("Sugerencias:"));
        for tip in SYNTAX_SUGGESTIONS {
            assert!(screen.contains(tip), "missing {:?}", tip);
        }
    }

    #[test]
    fn test_network_error_has_no_suggestions() {
        let mut app = test_app();
        reject(&mut app, ErrorKind::NetworkError, "Error de conexión");

        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("NETWORK_ERROR"));
        assert!(!screen.contains("Sugerencias:"));
    }

    #[test]
    fn test_input_scroll_follows_cursor() {
        assert_eq!(input_scroll(0, 20), 0);
        assert_eq!(input_scroll(19, 20), 0);
        assert_eq!(input_scroll(20, 20), 1);
        assert_eq!(input_scroll(150, 20), 131);
        assert_eq!(input_scroll(5, 0), 5);
    }

    #[test]
    fn test_long_command_shows_its_end_while_editing() {
        let mut app = test_app();
        let text = format!("agendá {}final", "palabra ".repeat(20));
        app.cursor = text.chars().count();
        app.set_command_text(text);
        app.input_mode = InputMode::Editing;

        let screen = draw(&mut app, 60, 30);
        assert!(screen.contains("final"));
    }
}
