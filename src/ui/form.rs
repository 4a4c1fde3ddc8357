//! Recipe editor overlay (create and edit).

use crate::app::{App, PASSWORD_FORM_FIELDS, RECIPE_FORM_FIELDS};
use crate::util::{single_line, truncate_to_width};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the recipe editor centered over the current view.
pub(super) fn render(f: &mut Frame, app: &App) {
    let Some(form) = app.recipe_form.as_ref() else {
        return;
    };
    let area = f.area();

    let title = if form.id.is_some() {
        "Edit recipe"
    } else {
        "New recipe"
    };

    let width = area.width.saturating_sub(8).min(80).max(40);
    // One line per field plus borders and the hint row
    let height = (RECIPE_FORM_FIELDS.len() as u16 + 4).min(area.height.saturating_sub(2));
    let dialog = super::render::centered_rect(area, width, height);

    let inner_width = usize::from(width.saturating_sub(16));
    let mut lines = Vec::with_capacity(RECIPE_FORM_FIELDS.len() + 2);
    for (i, label) in RECIPE_FORM_FIELDS.iter().enumerate() {
        let style = if i == form.focus {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        // Multi-line fields render flattened in the overview row
        let value = single_line(&form.fields[i]);
        let shown = truncate_to_width(&value, inner_width);
        let cursor = if i == form.focus { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:>13}: "), style),
            Span::raw(format!("{shown}{cursor}")),
        ]));
    }
    lines.push(Line::default());
    let hint = if form.submitting {
        "Saving..."
    } else {
        "[Ctrl+S] save  [Tab] next field  [Enter] newline in text  [Esc] cancel"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, dialog);
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, dialog);
}

/// Render the change-password overlay. All three fields are masked.
pub(super) fn render_password(f: &mut Frame, app: &App) {
    let Some(form) = app.password_form.as_ref() else {
        return;
    };
    let area = f.area();

    let width = 50.min(area.width.saturating_sub(4));
    let height = (PASSWORD_FORM_FIELDS.len() as u16 + 4).min(area.height.saturating_sub(2));
    let dialog = super::render::centered_rect(area, width, height);

    let mut lines = Vec::with_capacity(PASSWORD_FORM_FIELDS.len() + 2);
    for (i, label) in PASSWORD_FORM_FIELDS.iter().enumerate() {
        let style = if i == form.focus {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let value = "•".repeat(form.fields[i].chars().count());
        let cursor = if i == form.focus { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:>13}: "), style),
            Span::raw(format!("{value}{cursor}")),
        ]));
    }
    lines.push(Line::default());
    let hint = if form.submitting {
        "Changing..."
    } else {
        "[Enter] submit  [Tab] next field  [Esc] cancel"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, dialog);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Change password"),
    );
    f.render_widget(paragraph, dialog);
}
