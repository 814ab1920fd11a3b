//! Layout components (header, status bar)

use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into header, content, and status bar
pub fn create_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1], chunks[2])
}

/// Draw the header with the current screen name
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let screen = match &app.state.form {
        Some(form) if app.state.current_view.is_form_view() => form.kind.title(),
        _ => "Início",
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Signup ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(screen, Style::default().fg(Color::Cyan)),
    ]));
    frame.render_widget(header, area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(" ")];

    spans.push(Span::styled(
        view_hints(&app.state.current_view),
        Style::default().fg(Color::Gray),
    ));

    if app.lookup_in_flight() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            "Buscando CEP…",
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let quit_hint = " ^C:sair ";
    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    let hint_width = quit_hint.chars().count() as u16;
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(hint_width),
        width: hint_width.min(area.width),
        ..area
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn view_hints(view: &View) -> String {
    match view {
        View::Home => "j/k:navegar  Enter:abrir  q:sair".to_string(),
        View::ClubForm | View::SponsorForm => format!(
            "Tab:próximo  Espaço:marcar  ←/→:opção  {SUBMIT_SHORTCUT}:cadastrar  Esc:voltar"
        ),
    }
}
