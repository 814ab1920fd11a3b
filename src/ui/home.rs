//! Form picker shown at startup

use super::components::{render_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::state::forms::FormKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

const PICKER_WIDTH: u16 = 36;

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![Constraint::Min(0), Constraint::Length(2)];
    constraints.extend(FormKind::ALL.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new("Cadastro de Clubes e Patrocinadores")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(title, rows[1]);

    for (idx, kind) in FormKind::ALL.iter().enumerate() {
        let row = rows[idx + 2];
        let width = PICKER_WIDTH.min(row.width);
        let button_area = Rect {
            x: row.x + (row.width - width) / 2,
            width,
            ..row
        };
        render_button(
            frame,
            button_area,
            kind.title(),
            app.state.home_index == idx,
        );
    }

    let store = Paragraph::new(format!("Destino: {}", app.store_description()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    let last = rows[rows.len() - 1];
    if last.height > 1 {
        frame.render_widget(
            store,
            Rect {
                y: last.y + 1,
                height: 1,
                ..last
            },
        );
    }
}
