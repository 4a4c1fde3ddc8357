//! Login/register gate widget.
//!
//! Rendered whenever the session is not authenticated: a splash while the
//! startup check runs, the credentials form once the backend has answered.

use crate::api::AuthState;
use crate::app::{App, AuthMode};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered_rect;

/// Render the auth gate: splash or credentials form.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if matches!(app.auth, AuthState::Unknown | AuthState::Checking) {
        let splash = Paragraph::new("Checking session...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("ladle"));
        f.render_widget(splash, centered_rect(area, 40, 5));
        return;
    }

    let form = &app.auth_form;
    let (title, field_labels): (&str, &[&str]) = match form.mode {
        AuthMode::Login => ("Log in", &["Username", "Password"]),
        AuthMode::Register => ("Register", &["Username", "Email", "Password", "Confirm"]),
        AuthMode::ResetRequest => ("Reset password", &["Email"]),
        AuthMode::ResetConfirm => (
            "Reset password",
            &["Reset UID", "Token", "Password", "Confirm"],
        ),
    };

    let mut lines = Vec::new();
    for (i, label) in field_labels.iter().enumerate() {
        let value = field_value(app, i);
        let style = if i == form.focus {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if i == form.focus { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:>9}: "), style),
            Span::raw(format!("{value}{cursor}")),
        ]));
    }
    lines.push(Line::default());
    let hint = if form.submitting {
        "Working..."
    } else {
        match form.mode {
            AuthMode::Login => {
                "[Enter] submit  [Tab] next  [Ctrl+R] register  [Ctrl+F] forgot password  [Esc] quit"
            }
            AuthMode::Register => "[Enter] submit  [Tab] next  [Ctrl+R] log in  [Esc] quit",
            AuthMode::ResetRequest | AuthMode::ResetConfirm => {
                "[Enter] submit  [Tab] next  [Esc] back to log in"
            }
        }
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));
    if let Some((msg, _)) = &app.status_message {
        lines.push(Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let height = (lines.len() as u16).saturating_add(2);
    let dialog = centered_rect(area, 70.min(area.width.saturating_sub(2)), height);
    f.render_widget(Clear, dialog);
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, dialog);
}

/// Field text by index, with passwords masked. The reset-confirm step
/// stores the uid in `username` and the token in `email`.
fn field_value(app: &App, index: usize) -> String {
    let form = &app.auth_form;
    match (form.mode, index) {
        (AuthMode::ResetRequest, _) => form.email.clone(),
        (_, 0) => form.username.clone(),
        (AuthMode::Login, _) => mask(&form.password),
        (AuthMode::Register, 1) | (AuthMode::ResetConfirm, 1) => form.email.clone(),
        (AuthMode::Register, 2) | (AuthMode::ResetConfirm, 2) => mask(&form.password),
        _ => mask(&form.password2),
    }
}

fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}
