//! Club and sponsor registration form rendering

use super::field_renderer::{draw_field, field_height};
use crate::app::App;
use crate::state::forms::RegistrationForm;
use crate::ui::components::{render_action_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};
use std::ops::Range;

/// Draw the open registration form with its action panel
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.state.form.as_ref() else {
        return;
    };

    // Split into form (left) and action panel (right)
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Form area
            Constraint::Length(20), // Action panel
        ])
        .split(area);

    draw_fields(frame, chunks[0], form);
    draw_action_panel(frame, chunks[1], form);
}

fn draw_fields(frame: &mut Frame, area: Rect, form: &RegistrationForm) {
    let border_color = if form.is_buttons_row_active() {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .title(format!(" {} ", form.kind.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area).inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    frame.render_widget(block, area);

    let heights: Vec<u16> = form.fields.iter().map(field_height).collect();
    // Keep the last field on screen while the buttons are focused
    let anchor = form
        .active_field_index
        .min(form.fields.len().saturating_sub(1));

    let mut y = inner.y;
    for index in visible_range(&heights, anchor, inner.height) {
        let Some(field) = form.fields.get(index) else {
            break;
        };
        let height = heights[index].min(inner.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }
        let field_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height,
        };
        draw_field(frame, field_area, field, index == form.active_field_index);
        y += heights[index];
    }
}

/// Draw the action panel sidebar
fn draw_action_panel(frame: &mut Frame, area: Rect, form: &RegistrationForm) {
    let is_focused = form.is_buttons_row_active();
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(" Ações ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let button_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BUTTON_HEIGHT), // Cadastrar
            Constraint::Length(BUTTON_HEIGHT), // Cancelar
            Constraint::Min(0),
        ])
        .split(inner_area);

    render_action_button(
        frame,
        button_chunks[0],
        "Cadastrar",
        is_focused && form.selected_button == 0,
        Color::Green,
    );
    render_action_button(
        frame,
        button_chunks[1],
        "Cancelar",
        is_focused && form.selected_button == 1,
        Color::Gray,
    );
}

/// Range of fields to draw so that `active` fits in `available` rows.
///
/// Starts at the top when possible, otherwise scrolls just enough to show
/// the active field at the bottom.
fn visible_range(heights: &[u16], active: usize, available: u16) -> Range<usize> {
    if heights.is_empty() {
        return 0..0;
    }
    let active = active.min(heights.len() - 1);

    let mut start = 0;
    let mut used: u16 = heights[..=active].iter().sum();
    while used > available && start < active {
        used -= heights[start];
        start += 1;
    }

    let mut end = active + 1;
    while end < heights.len() && used + heights[end] <= available {
        used += heights[end];
        end += 1;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_everything_fits() {
        assert_eq!(visible_range(&[3, 3, 3], 0, 20), 0..3);
    }

    #[test]
    fn test_fills_below_active_from_top() {
        assert_eq!(visible_range(&[3, 3, 3, 3], 1, 9), 0..3);
    }

    #[test]
    fn test_scrolls_to_keep_active_visible() {
        assert_eq!(visible_range(&[3, 3, 3, 3, 3], 4, 9), 2..5);
    }

    #[test]
    fn test_error_rows_count() {
        assert_eq!(visible_range(&[4, 3, 4, 3], 2, 8), 1..3);
    }

    #[test]
    fn test_active_taller_than_area_still_shown() {
        assert_eq!(visible_range(&[3, 4], 1, 2), 1..2);
    }

    #[test]
    fn test_empty() {
        assert_eq!(visible_range(&[], 0, 10), 0..0);
    }
}
