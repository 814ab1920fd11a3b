//! Field rendering utilities for forms

use crate::state::forms::{FieldValue, FormField};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by the bordered input box
const INPUT_HEIGHT: u16 = 3;

/// Rows a field needs, including its validation message
pub fn field_height(field: &FormField) -> u16 {
    if field.error.is_some() {
        INPUT_HEIGHT + 1
    } else {
        INPUT_HEIGHT
    }
}

/// Draw a form field with its validation message underneath
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let has_error = field.error.is_some();
    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else if has_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = match &field.value {
        FieldValue::Choices(options) => {
            let mut spans = Vec::with_capacity(options.len() * 2);
            for (idx, option) in options.iter().enumerate() {
                let mark = if option.selected { "[x]" } else { "[ ]" };
                let style = if is_active && idx == field.choice_cursor {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(format!("{mark} {}", option.label), style));
                spans.push(Span::raw("  "));
            }
            Line::from(spans)
        }
        FieldValue::Toggle(_) => Line::from(Span::styled(
            field.display_value(),
            if is_active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            },
        )),
        FieldValue::Text(_) | FieldValue::Secret(_) => {
            let value_style = if is_active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(field.display_value(), value_style)];
            if is_active {
                spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
            }
            Line::from(spans)
        }
    };

    let block = Block::default()
        .title(format!(" {} ", field.label))
        .borders(Borders::ALL)
        .border_style(border_style);

    let input_area = Rect {
        height: area.height.min(INPUT_HEIGHT),
        ..area
    };
    frame.render_widget(Paragraph::new(content).block(block), input_area);

    if let Some(error) = &field.error {
        if area.height > INPUT_HEIGHT {
            let error_area = Rect {
                y: area.y + INPUT_HEIGHT,
                height: 1,
                ..area
            };
            frame.render_widget(
                Paragraph::new(format!(" {error}")).style(Style::default().fg(Color::Red)),
                error_area,
            );
        }
    }
}
