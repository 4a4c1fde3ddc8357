//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on current view and mode. Overlays (confirmation, recipe
//! editor) capture all keys while visible.

use crate::api::AuthState;
use crate::app::{App, AppEvent, AuthMode, ConfirmAction, PasswordForm, RecipeForm, View};
use crate::util::{validate_link_for_open, MAX_SEARCH_LENGTH};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use secrecy::SecretString;
use tokio::sync::mpsc;

use super::events::{
    spawn_change_password, spawn_delete_recipe, spawn_fetch_recipes, spawn_load_recipe,
    spawn_login, spawn_logout, spawn_password_reset_confirm, spawn_password_reset_request,
    spawn_register, spawn_save_recipe,
};
use super::Action;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current mode and view.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Confirmation dialog captures all keys when visible
    if app.pending_confirm.is_some() {
        return Ok(handle_confirm_input(app, code, event_tx));
    }

    // Change-password overlay captures all keys when open
    if app.password_form.is_some() {
        return Ok(handle_password_input(app, code, modifiers, event_tx));
    }

    // Recipe editor captures all keys when open
    if app.recipe_form.is_some() {
        return Ok(handle_form_input(app, code, modifiers, event_tx));
    }

    // Search mode input
    if app.search_mode {
        return Ok(handle_search_input(app, code));
    }

    match app.view {
        View::Login => Ok(handle_login_input(app, code, modifiers, event_tx)),
        View::Browse => Ok(handle_browse_input(app, code, event_tx)),
        View::Detail => Ok(handle_detail_input(app, code, event_tx)),
    }
}

/// Handle input while the delete confirmation is visible.
fn handle_confirm_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(ConfirmAction::DeleteRecipe { recipe_id, title }) =
                app.pending_confirm.take()
            {
                spawn_delete_recipe(app, event_tx, recipe_id, title);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Delete cancelled");
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input on the login/register gate.
///
/// The gate is inert while the startup session check is still running;
/// only quitting works until the backend has answered.
fn handle_login_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if code == KeyCode::Esc {
        // From a reset step Esc backs out to the login form; from the
        // login/register form it quits.
        if matches!(
            app.auth_form.mode,
            AuthMode::ResetRequest | AuthMode::ResetConfirm
        ) {
            app.auth_form.enter_mode(AuthMode::Login);
            return Action::Continue;
        }
        return Action::Quit;
    }
    if !matches!(app.auth, AuthState::Anonymous) {
        return Action::Continue;
    }

    // Ctrl+R flips between login and register; Ctrl+F starts the
    // forgot-password flow
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('r') => app.auth_form.toggle_mode(),
            KeyCode::Char('f') => app.auth_form.enter_mode(AuthMode::ResetRequest),
            _ => {}
        }
        return Action::Continue;
    }

    match code {
        KeyCode::Tab | KeyCode::Down => app.auth_form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.auth_form.prev_field(),
        KeyCode::Enter => submit_auth_form(app, event_tx),
        KeyCode::Backspace => {
            app.auth_form.focused_field_mut().pop();
        }
        KeyCode::Char(c) => {
            app.auth_form.focused_field_mut().push(c);
        }
        _ => {}
    }
    Action::Continue
}

/// Validate and submit the current auth-gate form.
fn submit_auth_form(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.auth_form.submitting {
        return;
    }
    let form = &app.auth_form;

    match form.mode {
        AuthMode::Login => {
            if form.username.trim().is_empty() || form.password.is_empty() {
                app.set_status("Username and password are required");
                return;
            }
            let username = form.username.clone();
            let password = SecretString::from(form.password.clone());
            app.auth_form.submitting = true;
            app.set_status("Logging in...");
            spawn_login(app.client.clone(), event_tx.clone(), username, password);
        }
        AuthMode::Register => {
            if form.username.trim().is_empty() || form.password.is_empty() {
                app.set_status("Username and password are required");
                return;
            }
            if form.email.trim().is_empty() {
                app.set_status("Email is required");
                return;
            }
            if form.password != form.password2 {
                app.set_status("Passwords do not match");
                return;
            }
            let username = form.username.clone();
            let email = form.email.clone();
            let password = SecretString::from(form.password.clone());
            let password2 = SecretString::from(form.password2.clone());
            app.auth_form.submitting = true;
            app.set_status("Creating account...");
            spawn_register(
                app.client.clone(),
                event_tx.clone(),
                username,
                email,
                password,
                password2,
            );
        }
        AuthMode::ResetRequest => {
            if form.email.trim().is_empty() {
                app.set_status("Email is required");
                return;
            }
            let email = form.email.clone();
            app.auth_form.submitting = true;
            app.set_status("Requesting reset email...");
            spawn_password_reset_request(app.client.clone(), event_tx.clone(), email);
        }
        AuthMode::ResetConfirm => {
            // username holds the uid, email holds the token in this mode
            if form.username.trim().is_empty() || form.email.trim().is_empty() {
                app.set_status("Reset UID and token are required");
                return;
            }
            if form.password.is_empty() {
                app.set_status("New password is required");
                return;
            }
            if form.password != form.password2 {
                app.set_status("Passwords do not match");
                return;
            }
            let uidb64 = form.username.trim().to_string();
            let token = form.email.trim().to_string();
            let password = SecretString::from(form.password.clone());
            let password2 = SecretString::from(form.password2.clone());
            app.auth_form.submitting = true;
            app.set_status("Resetting password...");
            spawn_password_reset_confirm(
                app.client.clone(),
                event_tx.clone(),
                uidb64,
                token,
                password,
                password2,
            );
        }
    }
}

/// Handle input while typing a search term.
///
/// Keystrokes update the visible input immediately but the filter only
/// recomputes after the debounce window (see `App::poll_search_debounce`).
/// Enter applies the term at once; Esc drops it and restores the full list.
fn handle_search_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc => {
            app.reset_search();
            app.recompute_filtered();
        }
        KeyCode::Enter => {
            app.search_mode = false;
            app.search_debounce = None;
            app.pending_search = None;
            app.debounced_search = app.search_input.clone();
            app.recompute_filtered();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.note_search_input();
        }
        KeyCode::Char(c) => {
            if app.search_input.chars().count() >= MAX_SEARCH_LENGTH {
                app.set_status(format!("Search term too long (max {MAX_SEARCH_LENGTH} chars)"));
            } else {
                app.search_input.push(c);
                app.note_search_input();
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input in the browse view (filterable recipe list).
fn handle_browse_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter => {
            if let Some(recipe) = app.selected_recipe() {
                spawn_load_recipe(app, event_tx, recipe.id);
            }
        }
        KeyCode::Char('/') => {
            app.search_mode = true;
            // Re-editing starts from the active term
            app.search_input = app.debounced_search.clone();
        }
        KeyCode::Char('c') => app.cycle_cuisine(),
        KeyCode::Char('p') => app.pick_random(),
        KeyCode::Char('r') => {
            app.set_status("Refreshing...");
            spawn_fetch_recipes(app, event_tx);
        }
        KeyCode::Char('n') => {
            app.recipe_form = Some(RecipeForm::default());
        }
        KeyCode::Char('e') => {
            if let Some(recipe) = app.selected_recipe() {
                app.recipe_form = Some(RecipeForm::for_edit(recipe));
            }
        }
        KeyCode::Char('d') => {
            if let Some(ConfirmAction::DeleteRecipe { recipe_id, title }) = app.request_delete() {
                spawn_delete_recipe(app, event_tx, recipe_id, title);
            }
        }
        KeyCode::Char('o') => open_external_link(app),
        KeyCode::Char('a') => {
            app.password_form = Some(PasswordForm::default());
        }
        KeyCode::Char('x') => {
            app.clear_session();
            spawn_logout(app.client.clone(), event_tx.clone());
        }
        KeyCode::Esc => {
            // Drop all active filters
            app.reset_search();
            app.cuisine_index = 0;
            app.recompute_filtered();
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input in the detail view.
fn handle_detail_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Esc | KeyCode::Char('b') => {
            app.view = View::Browse;
            app.detail = None;
        }
        KeyCode::Char('e') => {
            if let Some(recipe) = app.detail.as_ref() {
                app.recipe_form = Some(RecipeForm::for_edit(recipe));
            }
        }
        KeyCode::Char('d') => {
            if let Some(ConfirmAction::DeleteRecipe { recipe_id, title }) = app.request_delete() {
                spawn_delete_recipe(app, event_tx, recipe_id, title);
            }
        }
        KeyCode::Char('o') => open_external_link(app),
        _ => {}
    }
    Action::Continue
}

/// Handle input while the recipe editor overlay is open.
///
/// Enter inserts a newline in the multi-line fields (ingredients and
/// instructions) and advances focus elsewhere; Ctrl+S submits.
fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('s') = code {
            submit_recipe_form(app, event_tx);
        }
        return Action::Continue;
    }

    if code == KeyCode::Esc {
        if app.recipe_form.as_ref().is_some_and(|f| !f.submitting) {
            app.recipe_form = None;
            app.set_status("Edit cancelled");
        }
        return Action::Continue;
    }

    let Some(form) = app.recipe_form.as_mut() else {
        return Action::Continue;
    };
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Enter => {
            // Ingredients and instructions are multi-line
            if form.focus == 3 || form.focus == 4 {
                form.focused_field_mut().push('\n');
            } else {
                form.next_field();
            }
        }
        KeyCode::Backspace => {
            form.focused_field_mut().pop();
        }
        KeyCode::Char(c) => {
            form.focused_field_mut().push(c);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while the change-password overlay is open.
fn handle_password_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('s') = code {
            submit_password_form(app, event_tx);
        }
        return Action::Continue;
    }

    if code == KeyCode::Esc {
        if app.password_form.as_ref().is_some_and(|f| !f.submitting) {
            app.password_form = None;
            app.set_status("Password change cancelled");
        }
        return Action::Continue;
    }
    if code == KeyCode::Enter {
        submit_password_form(app, event_tx);
        return Action::Continue;
    }

    let Some(form) = app.password_form.as_mut() else {
        return Action::Continue;
    };
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Backspace => {
            form.focused_field_mut().pop();
        }
        KeyCode::Char(c) => {
            form.focused_field_mut().push(c);
        }
        _ => {}
    }
    Action::Continue
}

/// Validate and submit the change-password overlay.
fn submit_password_form(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(form) = app.password_form.as_mut() else {
        return;
    };
    if form.submitting {
        return;
    }
    if let Some(problem) = form.validation_error() {
        app.set_status(problem);
        return;
    }
    form.submitting = true;
    let old = SecretString::from(form.fields[0].clone());
    let new = SecretString::from(form.fields[1].clone());
    let new2 = SecretString::from(form.fields[2].clone());
    app.set_status("Changing password...");
    spawn_change_password(app.client.clone(), event_tx.clone(), old, new, new2);
}

/// Validate and submit the recipe editor.
fn submit_recipe_form(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(form) = app.recipe_form.as_mut() else {
        return;
    };
    if form.submitting {
        return;
    }
    if let Some(problem) = form.validation_error() {
        app.set_status(problem);
        return;
    }
    form.submitting = true;
    let id = form.id;
    let draft = form.draft();
    app.set_status("Saving...");
    spawn_save_recipe(app, event_tx, id, draft);
}

/// Open the current recipe's external link in the system browser.
/// The URL is validated first so only http/https ever reaches the shell.
fn open_external_link(app: &mut App) {
    let Some(recipe) = app.current_recipe() else {
        return;
    };
    let Some(link) = recipe.external_link.clone() else {
        app.set_status("No external link for this recipe");
        return;
    };
    match validate_link_for_open(&link) {
        Ok(_) => {
            if let Err(e) = open::that(&link) {
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opening link...");
            }
        }
        Err(e) => app.set_status(e.to_string()),
    }
}
