use crate::api::{ApiClient, ApiError, AuthState, CurrentUser, Recipe};
use crate::collection::{self, RecipeCollection};
use crate::config::Config;
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(4);

// ============================================================================
// Views
// ============================================================================

/// Current view mode.
///
/// `Browse` and `Detail` require an authenticated session; the event loop
/// forces `Login` whenever the session is anonymous or expires, so a recipe
/// screen can never render for a logged-out user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,  // Login/register gate
    Browse, // Filterable recipe list
    Detail, // Full-screen single recipe
}

// ============================================================================
// Auth Form
// ============================================================================

/// Which credentials form the login gate shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
    /// Forgot-password step 1: ask the backend to send a reset email.
    ResetRequest,
    /// Forgot-password step 2: enter the uid/token pair from the email
    /// plus the new password.
    ResetConfirm,
}

/// Input state for the login/register gate.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    /// Index of the focused field (0 = username).
    pub focus: usize,
    /// True while a login/register request is in flight.
    pub submitting: bool,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            password2: String::new(),
            focus: 0,
            submitting: false,
        }
    }
}

impl AuthForm {
    /// Number of input fields in the current mode.
    pub fn field_count(&self) -> usize {
        match self.mode {
            AuthMode::Login => 2,        // username, password
            AuthMode::Register => 4,     // username, email, password, password2
            AuthMode::ResetRequest => 1, // email
            AuthMode::ResetConfirm => 4, // uid, token, password, password2
        }
    }

    /// Mutable handle to the focused field's text.
    ///
    /// The reset-confirm step reuses `username` for the uid and `email`
    /// for the token; the gate renders them under their own labels.
    pub fn focused_field_mut(&mut self) -> &mut String {
        match (self.mode, self.focus) {
            (AuthMode::ResetRequest, _) => &mut self.email,
            (_, 0) => &mut self.username,
            (AuthMode::Login, _) => &mut self.password,
            (AuthMode::Register, 1) | (AuthMode::ResetConfirm, 1) => &mut self.email,
            (AuthMode::Register, 2) | (AuthMode::ResetConfirm, 2) => &mut self.password,
            _ => &mut self.password2,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.field_count();
    }

    pub fn prev_field(&mut self) {
        let count = self.field_count();
        self.focus = (self.focus + count - 1) % count;
    }

    /// Switch between login and register, wiping credentials. From either
    /// reset step this returns to the login form.
    pub fn toggle_mode(&mut self) {
        let mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            _ => AuthMode::Login,
        };
        *self = Self {
            mode,
            ..Self::default()
        };
    }

    /// Switches the gate to a fresh form in the given mode.
    pub fn enter_mode(&mut self, mode: AuthMode) {
        *self = Self {
            mode,
            ..Self::default()
        };
    }
}

// ============================================================================
// Password Form
// ============================================================================

/// Labels for the change-password overlay fields, in focus order.
pub const PASSWORD_FORM_FIELDS: &[&str] = &["Current", "New password", "Confirm"];

/// Input state for the change-password overlay.
#[derive(Debug, Clone, Default)]
pub struct PasswordForm {
    pub fields: [String; 3],
    pub focus: usize,
    /// True while the change request is in flight.
    pub submitting: bool,
}

impl PasswordForm {
    pub fn focused_field_mut(&mut self) -> &mut String {
        &mut self.fields[self.focus]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// First validation problem, or None when the form can be submitted.
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.fields[0].is_empty() {
            Some("Current password is required")
        } else if self.fields[1].is_empty() {
            Some("New password is required")
        } else if self.fields[1] != self.fields[2] {
            Some("Passwords do not match")
        } else {
            None
        }
    }
}

// ============================================================================
// Recipe Form
// ============================================================================

/// Labels for the recipe editor fields, in focus order.
pub const RECIPE_FORM_FIELDS: &[&str] = &[
    "Title",
    "Description",
    "Cuisine",
    "Ingredients",
    "Instructions",
    "Image URL",
    "External link",
];

/// Input state for the recipe create/edit overlay.
#[derive(Debug, Clone, Default)]
pub struct RecipeForm {
    /// Recipe being edited, or None when creating.
    pub id: Option<i64>,
    pub fields: [String; 7],
    pub focus: usize,
    /// True while a save request is in flight.
    pub submitting: bool,
}

impl RecipeForm {
    /// Pre-fills the form from an existing recipe for editing.
    pub fn for_edit(recipe: &Recipe) -> Self {
        Self {
            id: Some(recipe.id),
            fields: [
                recipe.title.clone(),
                recipe.description.clone().unwrap_or_default(),
                recipe.cuisine_type.clone().unwrap_or_default(),
                recipe.ingredients.clone(),
                recipe.instructions.clone(),
                recipe.image_url.clone().unwrap_or_default(),
                recipe.external_link.clone().unwrap_or_default(),
            ],
            focus: 0,
            submitting: false,
        }
    }

    pub fn focused_field_mut(&mut self) -> &mut String {
        &mut self.fields[self.focus]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// First validation problem, or None when the form can be submitted.
    /// Title, ingredients and instructions are required; the rest optional.
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.fields[0].trim().is_empty() {
            Some("Title is required")
        } else if self.fields[3].trim().is_empty() {
            Some("Ingredients are required")
        } else if self.fields[4].trim().is_empty() {
            Some("Instructions are required")
        } else {
            None
        }
    }

    /// Builds the request body. Empty optional fields are omitted rather
    /// than sent as empty strings.
    pub fn draft(&self) -> crate::api::RecipeDraft {
        let optional = |s: &String| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        crate::api::RecipeDraft {
            title: self.fields[0].trim().to_string(),
            description: optional(&self.fields[1]),
            cuisine_type: optional(&self.fields[2]),
            ingredients: self.fields[3].trim().to_string(),
            instructions: self.fields[4].trim().to_string(),
            image_url: optional(&self.fields[5]),
            external_link: optional(&self.fields[6]),
        }
    }
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation action for destructive operations.
pub enum ConfirmAction {
    /// Delete a recipe on the backend.
    DeleteRecipe { recipe_id: i64, title: String },
}

// ============================================================================
// Events and Follow-ups
// ============================================================================

/// Events from background tasks.
///
/// Every API call runs in a spawned task and reports back through one of
/// these; the event loop applies them to [`App`] on the main task, so all
/// state transitions are single-threaded and unit-testable.
pub enum AppEvent {
    /// Startup session check finished.
    SessionChecked(Result<CurrentUser, ApiError>),
    /// Login (including post-login verification) finished.
    LoginCompleted(Result<CurrentUser, ApiError>),
    /// Registration (including post-register verification) finished.
    RegisterCompleted(Result<CurrentUser, ApiError>),
    /// Server-side logout finished. The outcome is informational only —
    /// local state is cleared either way.
    LogoutCompleted(Result<(), ApiError>),
    /// Collection fetch finished.
    RecipesLoaded(Result<Vec<Recipe>, ApiError>),
    /// Single recipe fetch for the detail view finished.
    RecipeLoaded(Result<Recipe, ApiError>),
    /// Create or update finished.
    RecipeSaved {
        editing: bool,
        result: Result<Recipe, ApiError>,
    },
    /// Delete finished.
    RecipeDeleted {
        title: String,
        result: Result<(), ApiError>,
    },
    /// Change-password request finished; Ok carries the backend message.
    PasswordChanged(Result<String, ApiError>),
    /// Reset-email request finished; Ok carries the backend message.
    PasswordResetRequested(Result<String, ApiError>),
    /// Reset confirmation finished; Ok carries the backend message.
    PasswordResetConfirmed(Result<String, ApiError>),
}

/// Async work that a state transition requests from the event loop.
#[derive(Debug, PartialEq, Eq)]
pub enum FollowUp {
    /// Re-fetch the recipe collection from the backend.
    RefreshCollection,
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    pub client: ApiClient,

    // Session
    pub auth: AuthState,
    pub view: View,
    pub auth_form: AuthForm,

    // Data
    pub collection: RecipeCollection,
    /// Current filtered view of the collection, recomputed from
    /// `(collection, debounced_search, cuisine filter)` only.
    pub filtered: Vec<Recipe>,
    pub selected: usize,
    /// True while a collection fetch is in flight (suppresses duplicates).
    pub fetch_in_flight: bool,

    // Search
    pub search_mode: bool,
    pub search_input: String,
    /// The term the filter actually uses. Trails `search_input` by the
    /// debounce window.
    pub debounced_search: String,
    /// Debounce timer; reset on every keystroke.
    pub search_debounce: Option<Instant>,
    /// Pending search query awaiting quiescence.
    pub pending_search: Option<String>,
    search_debounce_window: Duration,

    // Cuisine filter: 0 = All, i>0 = collection.cuisines()[i-1]
    pub cuisine_index: usize,

    // Detail view
    pub detail: Option<Recipe>,

    // Overlays
    pub recipe_form: Option<RecipeForm>,
    pub password_form: Option<PasswordForm>,
    pub pending_confirm: Option<ConfirmAction>,
    confirm_delete: bool,

    // Status message with expiry — Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(client: ApiClient, config: &Config) -> Self {
        Self {
            client,
            auth: AuthState::Unknown,
            view: View::Login,
            auth_form: AuthForm::default(),
            collection: RecipeCollection::new(),
            filtered: Vec::new(),
            selected: 0,
            fetch_in_flight: false,
            search_mode: false,
            search_input: String::new(),
            debounced_search: String::new(),
            search_debounce: None,
            pending_search: None,
            search_debounce_window: Duration::from_millis(config.search_debounce_ms),
            cuisine_index: 0,
            detail: None,
            recipe_form: None,
            password_form: None,
            pending_confirm: None,
            confirm_delete: config.confirm_delete,
            status_message: None,
            needs_redraw: true,
        }
    }

    // ------------------------------------------------------------------
    // Event application
    // ------------------------------------------------------------------

    /// Applies a background-task event to the state machine.
    ///
    /// Pure with respect to I/O: the returned [`FollowUp`] tells the event
    /// loop what to spawn next.
    pub fn apply_event(&mut self, event: AppEvent) -> Option<FollowUp> {
        self.needs_redraw = true;
        match event {
            AppEvent::SessionChecked(Ok(user)) => {
                tracing::info!(username = %user.username, "Existing session verified");
                self.auth = AuthState::Authenticated(user.username);
                self.view = View::Browse;
                Some(FollowUp::RefreshCollection)
            }
            AppEvent::SessionChecked(Err(e)) => {
                // An anonymous session at startup is the normal case, not an
                // error worth surfacing.
                if !e.is_session_expired() {
                    tracing::warn!(error = %e, "Session check failed");
                    self.set_status(format!("Could not reach server: {e}"));
                }
                self.auth = AuthState::Anonymous;
                self.view = View::Login;
                None
            }
            AppEvent::LoginCompleted(result) | AppEvent::RegisterCompleted(result) => {
                self.auth_form.submitting = false;
                match result {
                    Ok(user) => {
                        self.set_status(format!("Welcome, {}", user.username));
                        self.auth = AuthState::Authenticated(user.username);
                        self.view = View::Browse;
                        self.auth_form = AuthForm::default();
                        Some(FollowUp::RefreshCollection)
                    }
                    Err(e) => {
                        self.auth = AuthState::Anonymous;
                        self.set_status(auth_failure_message(&e));
                        None
                    }
                }
            }
            AppEvent::LogoutCompleted(result) => {
                // Local state is already gone by the time this arrives; the
                // server outcome only decides the log line.
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Server-side logout failed");
                }
                None
            }
            AppEvent::RecipesLoaded(result) => {
                self.fetch_in_flight = false;
                match result {
                    Ok(recipes) => {
                        tracing::debug!(count = recipes.len(), "Recipe collection replaced");
                        self.collection.replace_all(recipes);
                        self.recompute_filtered();
                    }
                    Err(e) => {
                        // Never keep a stale collection around after a failed
                        // fetch — it may belong to a dead session.
                        self.collection.clear();
                        self.recompute_filtered();
                        self.handle_api_error(e, "Failed to load recipes");
                    }
                }
                None
            }
            AppEvent::RecipeLoaded(result) => {
                match result {
                    Ok(recipe) => {
                        self.detail = Some(recipe);
                        self.view = View::Detail;
                    }
                    Err(e) => self.handle_api_error(e, "Failed to load recipe"),
                }
                None
            }
            AppEvent::RecipeSaved { editing, result } => {
                match result {
                    Ok(recipe) => {
                        self.set_status(if editing {
                            Cow::Owned(format!("Updated \"{}\"", recipe.title))
                        } else {
                            Cow::Owned(format!("Created \"{}\"", recipe.title))
                        });
                        if editing && self.view == View::Detail {
                            self.detail = Some(recipe);
                        }
                        self.recipe_form = None;
                        return Some(FollowUp::RefreshCollection);
                    }
                    Err(e) => {
                        // Keep the form open so the user can correct and retry
                        if let Some(form) = self.recipe_form.as_mut() {
                            form.submitting = false;
                        }
                        self.handle_api_error(e, "Save failed");
                    }
                }
                None
            }
            AppEvent::RecipeDeleted { title, result } => match result {
                Ok(()) => {
                    self.set_status(format!("Deleted \"{title}\""));
                    if self.view == View::Detail {
                        self.view = View::Browse;
                        self.detail = None;
                    }
                    Some(FollowUp::RefreshCollection)
                }
                Err(e) => {
                    self.handle_api_error(e, "Delete failed");
                    None
                }
            },
            AppEvent::PasswordChanged(result) => {
                match result {
                    Ok(message) => {
                        // The backend invalidates the session on success
                        self.clear_session();
                        self.set_status(format!("{message}. Log in with your new password."));
                    }
                    Err(e) => {
                        // Keep the form open so the user can correct and retry
                        if let Some(form) = self.password_form.as_mut() {
                            form.submitting = false;
                        }
                        self.handle_api_error(e, "Password change failed");
                    }
                }
                None
            }
            AppEvent::PasswordResetRequested(result) => {
                self.auth_form.submitting = false;
                match result {
                    Ok(message) => {
                        self.auth_form.enter_mode(AuthMode::ResetConfirm);
                        self.set_status(message);
                    }
                    Err(e) => self.set_status(format!("Reset request failed: {e}")),
                }
                None
            }
            AppEvent::PasswordResetConfirmed(result) => {
                self.auth_form.submitting = false;
                match result {
                    Ok(message) => {
                        self.auth_form.enter_mode(AuthMode::Login);
                        self.set_status(format!("{message}. Log in with your new password."));
                    }
                    Err(e) => self.set_status(format!("Password reset failed: {e}")),
                }
                None
            }
        }
    }

    /// Routes an API failure: session expiry resets to the login gate,
    /// anything else becomes a status message.
    fn handle_api_error(&mut self, error: ApiError, context: &str) {
        if error.is_session_expired() {
            self.session_expired();
        } else {
            tracing::warn!(error = %error, "{context}");
            self.set_status(format!("{context}: {error}"));
        }
    }

    /// Tears down the session after the backend rejected a request.
    /// Everything session-scoped is dropped before the login gate shows.
    pub fn session_expired(&mut self) {
        tracing::info!("Session expired, returning to login");
        self.auth = AuthState::Anonymous;
        self.view = View::Login;
        self.collection.clear();
        self.filtered.clear();
        self.selected = 0;
        self.detail = None;
        self.recipe_form = None;
        self.password_form = None;
        self.pending_confirm = None;
        self.auth_form = AuthForm::default();
        self.set_status("Your session has expired. Please log in again.");
        self.needs_redraw = true;
    }

    /// Clears all session-scoped state for logout. Runs before (and
    /// independently of) the server-side logout request.
    pub fn clear_session(&mut self) {
        self.auth = AuthState::Anonymous;
        self.view = View::Login;
        self.collection.clear();
        self.filtered.clear();
        self.selected = 0;
        self.detail = None;
        self.recipe_form = None;
        self.password_form = None;
        self.pending_confirm = None;
        self.auth_form = AuthForm::default();
        self.reset_search();
        self.cuisine_index = 0;
        self.set_status("Logged out");
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Rebuilds the filtered view from the collection and current filters.
    pub fn recompute_filtered(&mut self) {
        // Cuisine set may have shrunk under the filter index
        if self.cuisine_index > self.collection.cuisines().len() {
            self.cuisine_index = 0;
        }
        let cuisine = self.cuisine_filter().to_owned();
        self.filtered =
            collection::filter_recipes(self.collection.recipes(), &self.debounced_search, &cuisine)
                .into_iter()
                .cloned()
                .collect();
        self.clamp_selection();
        self.needs_redraw = true;
    }

    /// Active cuisine filter label; empty string means "All".
    pub fn cuisine_filter(&self) -> &str {
        if self.cuisine_index == 0 {
            ""
        } else {
            self.collection
                .cuisines()
                .get(self.cuisine_index - 1)
                .map(String::as_str)
                .unwrap_or("")
        }
    }

    /// Advances the cuisine filter through All → each cuisine → All.
    /// Takes effect immediately, unlike the debounced search term.
    pub fn cycle_cuisine(&mut self) {
        let options = self.collection.cuisines().len() + 1;
        self.cuisine_index = (self.cuisine_index + 1) % options;
        self.recompute_filtered();
    }

    /// Records a search keystroke: the input updates now, the filter later.
    /// Each keystroke restarts the quiescence window.
    pub fn note_search_input(&mut self) {
        self.pending_search = Some(self.search_input.clone());
        self.search_debounce = Some(Instant::now());
        self.needs_redraw = true;
    }

    /// Applies the pending search term once the debounce window has
    /// elapsed. Called from the tick handler; returns true if the filter
    /// was recomputed.
    pub fn poll_search_debounce(&mut self) -> bool {
        let elapsed = match self.search_debounce {
            Some(started) => started.elapsed() >= self.search_debounce_window,
            None => false,
        };
        if !elapsed {
            return false;
        }
        self.search_debounce = None;
        if let Some(term) = self.pending_search.take() {
            self.debounced_search = term;
            self.recompute_filtered();
            return true;
        }
        false
    }

    /// Drops the search term and timer and restores the unfiltered term.
    pub fn reset_search(&mut self) {
        self.search_mode = false;
        self.search_input.clear();
        self.debounced_search.clear();
        self.search_debounce = None;
        self.pending_search = None;
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Clamp the selection after any operation that may shrink the list.
    pub fn clamp_selection(&mut self) {
        self.selected = if self.filtered.is_empty() {
            0
        } else {
            self.selected.min(self.filtered.len() - 1)
        };
    }

    /// Currently selected recipe in the filtered list (bounds-checked).
    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.filtered.get(self.selected)
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.needs_redraw = true;
    }

    pub fn nav_down(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1).min(self.filtered.len() - 1);
        }
        self.needs_redraw = true;
    }

    /// Selects one recipe from the filtered view uniformly at random.
    /// An empty view yields a status message, never a failure.
    pub fn pick_random(&mut self) {
        match collection::pick_random(&self.filtered) {
            Some(picked) => {
                let id = picked.id;
                let title = picked.title.clone();
                if let Some(idx) = self.filtered.iter().position(|r| r.id == id) {
                    self.selected = idx;
                }
                self.set_status(format!("Picked: {title}"));
            }
            None => self.set_status("Nothing to pick from"),
        }
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    /// Requests deletion of the selected recipe. Depending on config this
    /// arms a confirmation prompt or deletes immediately; the caller gets
    /// the action to execute in the immediate case.
    pub fn request_delete(&mut self) -> Option<ConfirmAction> {
        let recipe = self.current_recipe()?;
        let action = ConfirmAction::DeleteRecipe {
            recipe_id: recipe.id,
            title: recipe.title.clone(),
        };
        if self.confirm_delete {
            self.pending_confirm = Some(action);
            self.needs_redraw = true;
            None
        } else {
            Some(action)
        }
    }

    /// The recipe current for mutation: the detail view's recipe when open,
    /// otherwise the browse selection.
    pub fn current_recipe(&self) -> Option<&Recipe> {
        if self.view == View::Detail {
            self.detail.as_ref()
        } else {
            self.selected_recipe()
        }
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    /// Set status message (auto-expires).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Human-readable failure line for the login gate.
fn auth_failure_message(error: &ApiError) -> Cow<'static, str> {
    match error {
        ApiError::Validation(_) => Cow::Owned(error.to_string()),
        ApiError::SessionUnverified => {
            Cow::Borrowed("Login succeeded but the session could not be verified")
        }
        ApiError::Auth(_) => Cow::Borrowed("Invalid username or password"),
        other => Cow::Owned(format!("Login failed: {other}")),
    }
}
