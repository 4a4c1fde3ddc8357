//! Background task spawning and event processing.
//!
//! Every API call runs in a spawned task that reports back through the
//! `AppEvent` channel. State transitions themselves happen in
//! [`App::apply_event`] on the main task; this module only does the
//! spawning and routes follow-up work.

use crate::api::{ApiClient, RecipeDraft};
use crate::app::{App, AppEvent, FollowUp};
use secrecy::SecretString;
use tokio::sync::mpsc;

/// Handle an application event from a background task.
///
/// Applies the event to the state machine and spawns whatever follow-up
/// work the transition requested.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match app.apply_event(event) {
        Some(FollowUp::RefreshCollection) => spawn_fetch_recipes(app, event_tx),
        None => {}
    }
}

async fn send(tx: mpsc::Sender<AppEvent>, event: AppEvent) {
    if tx.send(event).await.is_err() {
        tracing::warn!("Failed to send app event (receiver dropped)");
    }
}

/// Spawn the startup session check against `/api/users/me/`.
pub fn spawn_session_check(client: ApiClient, event_tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let result = client.current_user().await;
        send(event_tx, AppEvent::SessionChecked(result)).await;
    });
}

/// Spawn a login attempt (login request plus session re-verification).
pub(super) fn spawn_login(
    client: ApiClient,
    event_tx: mpsc::Sender<AppEvent>,
    username: String,
    password: SecretString,
) {
    tokio::spawn(async move {
        let result = client.login(&username, &password).await;
        send(event_tx, AppEvent::LoginCompleted(result)).await;
    });
}

/// Spawn a registration attempt (register request plus session
/// re-verification).
pub(super) fn spawn_register(
    client: ApiClient,
    event_tx: mpsc::Sender<AppEvent>,
    username: String,
    email: String,
    password: SecretString,
    password2: SecretString,
) {
    tokio::spawn(async move {
        let result = client
            .register(&username, &email, &password, &password2)
            .await;
        send(event_tx, AppEvent::RegisterCompleted(result)).await;
    });
}

/// Spawn the best-effort server-side logout. Local state is already
/// cleared by the time this runs.
pub(super) fn spawn_logout(client: ApiClient, event_tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let result = client.logout().await;
        send(event_tx, AppEvent::LogoutCompleted(result)).await;
    });
}

/// Spawn a full collection fetch unless one is already in flight.
pub(super) fn spawn_fetch_recipes(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.fetch_in_flight {
        tracing::debug!("Collection fetch already in flight, skipping");
        return;
    }
    app.fetch_in_flight = true;

    let client = app.client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let result = client.list_recipes().await;
        send(tx, AppEvent::RecipesLoaded(result)).await;
    });
}

/// Spawn a single-recipe fetch for the detail view.
pub(super) fn spawn_load_recipe(app: &App, event_tx: &mpsc::Sender<AppEvent>, id: i64) {
    let client = app.client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let result = client.get_recipe(id).await;
        send(tx, AppEvent::RecipeLoaded(result)).await;
    });
}

/// Spawn a create (`id` = None) or update (`id` = Some) request.
pub(super) fn spawn_save_recipe(
    app: &App,
    event_tx: &mpsc::Sender<AppEvent>,
    id: Option<i64>,
    draft: RecipeDraft,
) {
    let client = app.client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let (editing, result) = match id {
            Some(id) => (true, client.update_recipe(id, &draft).await),
            None => (false, client.create_recipe(&draft).await),
        };
        send(tx, AppEvent::RecipeSaved { editing, result }).await;
    });
}

/// Spawn a change-password request for the logged-in user.
pub(super) fn spawn_change_password(
    client: ApiClient,
    event_tx: mpsc::Sender<AppEvent>,
    old: SecretString,
    new: SecretString,
    new2: SecretString,
) {
    tokio::spawn(async move {
        let result = client.change_password(&old, &new, &new2).await;
        send(event_tx, AppEvent::PasswordChanged(result)).await;
    });
}

/// Spawn a password-reset email request.
pub(super) fn spawn_password_reset_request(
    client: ApiClient,
    event_tx: mpsc::Sender<AppEvent>,
    email: String,
) {
    tokio::spawn(async move {
        let result = client.request_password_reset(&email).await;
        send(event_tx, AppEvent::PasswordResetRequested(result)).await;
    });
}

/// Spawn a password-reset confirmation with the uid/token pair from the
/// reset email.
pub(super) fn spawn_password_reset_confirm(
    client: ApiClient,
    event_tx: mpsc::Sender<AppEvent>,
    uidb64: String,
    token: String,
    new: SecretString,
    new2: SecretString,
) {
    tokio::spawn(async move {
        let result = client
            .confirm_password_reset(&uidb64, &token, &new, &new2)
            .await;
        send(event_tx, AppEvent::PasswordResetConfirmed(result)).await;
    });
}

/// Spawn a delete request.
pub(super) fn spawn_delete_recipe(
    app: &App,
    event_tx: &mpsc::Sender<AppEvent>,
    recipe_id: i64,
    title: String,
) {
    let client = app.client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let result = client.delete_recipe(recipe_id).await;
        send(tx, AppEvent::RecipeDeleted { title, result }).await;
    });
}
