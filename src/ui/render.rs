//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state. The recipe screens only render for an
//! authenticated session; everything else falls through to the login gate.

use crate::app::{App, ConfirmAction, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{browse, detail, form, login, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer based on current application
/// state. Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Minimum terminal size check for usable UI
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    // The auth gate wins over whatever view was last active: an anonymous
    // or still-checking session never sees a recipe screen.
    if !app.auth.is_authenticated() {
        login::render(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.view {
        View::Login => login::render(f, app),
        View::Browse => browse::render(f, app, chunks[0]),
        View::Detail => detail::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    // Render the recipe editor on top of any view when open
    if app.recipe_form.is_some() {
        form::render(f, app);
    }

    // Change-password overlay sits above the recipe screens
    if app.password_form.is_some() {
        form::render_password(f, app);
    }

    // Render confirmation dialog on top of everything when active
    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, confirm);
    }
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, confirm: &ConfirmAction) {
    let area = f.area();

    let text = match confirm {
        ConfirmAction::DeleteRecipe { title, .. } => {
            format!("Delete \"{}\"?\n\n(y) Confirm  (n/Esc) Cancel", title)
        }
    };

    let width = 44.min(area.width.saturating_sub(4));
    let height = 6.min(area.height.saturating_sub(2));
    let dialog = centered_rect(area, width, height);

    f.render_widget(Clear, dialog);
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Confirm"));
    f.render_widget(paragraph, dialog);
}

/// Center a fixed-size rect inside `area`.
pub(super) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
